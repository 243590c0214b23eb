//! The six-step `mutation()` pipeline and the `synchronize()` pass, as
//! free functions over [`super::Engine`].

use super::Engine;
use crate::collaborators::TreeAccess;
use crate::handle::{Dimension, Handle, Side, Sibling};
use crate::position::Position;

/// One item of the point-in-time walk `prev, removed[0..], next` that
/// the first pipeline step resolves promises against.
#[derive(Clone)]
enum Walk<H> {
    Boundary,
    Node(H),
}

impl<H: Clone> Walk<H> {
    fn as_sibling(&self) -> Sibling<H> {
        match self {
            Walk::Boundary => Sibling::None,
            Walk::Node(h) => Sibling::Node(h.clone()),
        }
    }
}

pub(super) fn mutation<H: Handle>(
    engine: &mut Engine<H>,
    parent: H,
    removed: Vec<H>,
    added: Vec<H>,
    prev: Option<H>,
    next: Option<H>,
) {
    let mut walk: Vec<Walk<H>> = Vec::with_capacity(removed.len() + 2);
    walk.push(prev.clone().map(Walk::Node).unwrap_or(Walk::Boundary));
    walk.extend(removed.iter().cloned().map(Walk::Node));
    walk.push(next.clone().map(Walk::Node).unwrap_or(Walk::Boundary));

    // Step 1: resolve promises visible in this report's neighborhood,
    // before Step 2 overwrites the positions the walk just revealed.
    let mut resolved: Vec<H> = Vec::new();
    for i in 0..walk.len() {
        if let Walk::Node(h) = &walk[i] {
            if let Some(mn) = engine.get(h) {
                if let Some(Sibling::Promise(id)) = mn.mutated.prev() {
                    if i > 0 {
                        let value = walk[i - 1].as_sibling();
                        resolved.extend(resolve_promise(engine, *id, value));
                    }
                }
            }
            if let Some(mn) = engine.get(h) {
                if let Some(Sibling::Promise(id)) = mn.mutated.next() {
                    if i + 1 < walk.len() {
                        let value = walk[i + 1].as_sibling();
                        resolved.extend(resolve_promise(engine, *id, value));
                    }
                }
            }
        }
    }

    // Step 2: process removals.
    let mut revert_possible = false;
    let mut fixed_new: Vec<H> = Vec::new();
    for h in &removed {
        if engine.contains(h) {
            clear_mutated_side(engine, h);
            let mn = engine.get(h).unwrap();
            if mn.original.is_absent() {
                engine.destroy(h); // add+remove cancels out
            } else {
                let same_parent = mn.original.parent() == Some(&parent);
                engine.records.get_mut(h).unwrap().mutated = Position::Absent;
                if same_parent {
                    revert_possible = true;
                }
            }
        } else {
            engine.ensure(h.clone());
            engine.set_parent(Dimension::Original, h, parent.clone());
            engine.records.get_mut(h).unwrap().mutated = Position::Absent;
            fixed_new.push(h.clone());
            revert_possible = true;
        }
    }

    // Step 3: link original siblings for the newly-fixed run.
    link_fixed_new(engine, &fixed_new, &prev, &next, &removed);

    // Step 4: process additions.
    let mut candidates: Vec<H> = Vec::new();
    if let Some(p) = &prev {
        if engine.contains(p) {
            let value = added
                .first()
                .cloned()
                .map(Sibling::Node)
                .unwrap_or_else(|| Sibling::from(next.clone()));
            engine.set_side(Dimension::Mutated, p, Side::Next, value);
        }
    }
    if let Some(n) = &next {
        if engine.contains(n) {
            let value = added
                .last()
                .cloned()
                .map(Sibling::Node)
                .unwrap_or_else(|| Sibling::from(prev.clone()));
            engine.set_side(Dimension::Mutated, n, Side::Prev, value);
        }
    }
    for (i, h) in added.iter().enumerate() {
        if !engine.contains(h) {
            engine.ensure(h.clone());
            // original stays Absent: untracked/never-seen node.
        } else if engine.get(h).unwrap().original.parent() == Some(&parent) {
            candidates.push(h.clone());
        }
        engine.set_parent(Dimension::Mutated, h, parent.clone());
        let left = if i > 0 {
            Sibling::Node(added[i - 1].clone())
        } else {
            Sibling::from(prev.clone())
        };
        let right = if i + 1 < added.len() {
            Sibling::Node(added[i + 1].clone())
        } else {
            Sibling::from(next.clone())
        };
        engine.set_side(Dimension::Mutated, h, Side::Prev, left);
        engine.set_side(Dimension::Mutated, h, Side::Next, right);
    }

    // Step 5: reversion propagation.
    let mut worklist = candidates;
    if revert_possible {
        if let Some(p) = &prev {
            if engine.contains(p) {
                worklist.push(p.clone());
            }
        }
        if let Some(n) = &next {
            if engine.contains(n) {
                worklist.push(n.clone());
            }
        }
    }
    for h in resolved {
        if engine
            .get(&h)
            .map(|mn| mn.mutated.parent() == Some(&parent))
            .unwrap_or(false)
        {
            worklist.push(h);
        }
    }
    super::reversion::run(engine, worklist);
}

/// Resolve a parked promise to `value`: write `origin.original[dir]`, then
/// drop the table entry. The `ptr`'s own slot is left untouched — every
/// call site that reaches a promise is about to overwrite that slot
/// itself with fresher information (the walk's adjacency, or a later
/// addition). Returns the resolved origin, if the id was still live.
fn resolve_promise<H: Handle>(
    engine: &mut Engine<H>,
    id: crate::promise::PromiseId,
    value: Sibling<H>,
) -> Option<H> {
    let p = engine.promises.discard(id)?;
    log::trace!("resolved sibling promise on side {:?}", p.dir);
    engine.set_side(Dimension::Original, &p.origin, p.dir, value);
    Some(p.origin)
}

/// Before a floating node's `mutated` position is discarded (removal, or
/// add+remove cancellation), drop its index entries and discard any
/// promise it was parking on behalf of another origin. The origin's
/// `original` side simply stays `Unknown`; a later report or
/// `synchronize()` will pick the search back up.
fn clear_mutated_side<H: Handle>(engine: &mut Engine<H>, h: &H) {
    for side in [Side::Prev, Side::Next] {
        if let Some(mn) = engine.get(h) {
            match mn.mutated.side(side) {
                Some(Sibling::Node(_)) => {
                    engine.set_side(Dimension::Mutated, h, side, Sibling::Unknown);
                }
                Some(Sibling::Promise(id)) => {
                    let id = *id;
                    engine.promises.discard(id);
                    if let Some(mn) = engine.records.get_mut(h) {
                        mn.mutated.set_side(side, Sibling::Unknown);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Give every newly-fixed-turned-floating node (first time ever observed
/// moving) its `original` position, using the walk for the
/// interior links and, for the two open ends, either a fixed neighbor
/// (trustworthy directly), an already-linked original-side neighbor (via
/// the index), or a deferred [`crate::promise::Promise`].
fn link_fixed_new<H: Handle>(
    engine: &mut Engine<H>,
    fixed_new: &[H],
    prev: &Option<H>,
    next: &Option<H>,
    removed: &[H],
) {
    if fixed_new.is_empty() {
        return;
    }
    for pair in fixed_new.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        engine.set_side(Dimension::Original, a, Side::Next, Sibling::Node(b.clone()));
        engine.set_side(Dimension::Original, b, Side::Prev, Sibling::Node(a.clone()));
    }

    let first = &fixed_new[0];
    let first_pos = removed.iter().position(|h| h == first).unwrap();
    let left_walk = if first_pos == 0 {
        prev.clone()
    } else {
        Some(removed[first_pos - 1].clone())
    };
    link_open_end(engine, first, Side::Prev, left_walk);

    let last = fixed_new.last().unwrap();
    let last_pos = removed.iter().position(|h| h == last).unwrap();
    let right_walk = if last_pos + 1 == removed.len() {
        next.clone()
    } else {
        Some(removed[last_pos + 1].clone())
    };
    link_open_end(engine, last, Side::Next, right_walk);
}

/// Resolve (or promise-defer) one open end of a newly-fixed run.
/// `neighbor` is the walk item immediately outside the run on side `dir`.
fn link_open_end<H: Handle>(
    engine: &mut Engine<H>,
    node: &H,
    dir: Side,
    neighbor: Option<H>,
) {
    let Some(neighbor) = neighbor else {
        // List boundary: truthful for `node` since it has never moved.
        engine.set_side(Dimension::Original, node, dir, Sibling::None);
        return;
    };
    if !engine.contains(&neighbor) {
        // Neighbor is itself fixed: both sides have never moved, so their
        // current adjacency is their original adjacency.
        engine.set_side(Dimension::Original, node, dir, Sibling::Node(neighbor));
        return;
    }
    // Neighbor has moved before; consult whether some other tracked node
    // already claims `node` as its original `dir`-sibling.
    if let Some(owner) = engine.index.owner_of(Dimension::Original, dir.opposite(), node) {
        let owner = owner.clone();
        engine.set_side(Dimension::Original, node, dir, Sibling::Node(owner));
        return;
    }
    // Eager one-hop check: maybe the neighbor's own original[dir] is
    // already concrete.
    if let Some(mn) = engine.get(&neighbor) {
        if let Some(side_val) = mn.original.side(dir) {
            if side_val.is_node() || matches!(side_val, Sibling::None) {
                let resolved = side_val.clone();
                engine.set_side(Dimension::Original, node, dir, resolved);
                return;
            }
        }
    }
    let id = engine.promises.place(node.clone(), dir, neighbor.clone());
    engine.set_side(Dimension::Mutated, &neighbor, dir, Sibling::Promise(id));
}

/// Finalize every outstanding unknown/promise by consulting the live
/// tree, then resolve any remaining original-side promises and run a
/// reversion sweep over whatever they newly exposed.
pub(super) fn synchronize<H: Handle, T: TreeAccess<Handle = H>>(engine: &mut Engine<H>, tree: &T) {
    let handles: Vec<H> = engine.records.keys().cloned().collect();
    let mut resumed: Vec<(H, Side, crate::promise::Promise<H>)> = Vec::new();

    for h in &handles {
        let mn = engine.records.get(h).unwrap();
        if mn.mutated.is_absent() {
            if let Some(parent) = tree.parent(h) {
                engine.set_parent(Dimension::Mutated, h, parent);
                let p = Sibling::from(tree.prev_sibling(h));
                let n = Sibling::from(tree.next_sibling(h));
                engine.set_side(Dimension::Mutated, h, Side::Prev, p);
                engine.set_side(Dimension::Mutated, h, Side::Next, n);
            }
            continue;
        }
        for side in [Side::Prev, Side::Next] {
            let current = engine.records.get(h).unwrap().mutated.side(side).cloned();
            match current {
                Some(Sibling::Unknown) => {
                    let live = match side {
                        Side::Prev => tree.prev_sibling(h),
                        Side::Next => tree.next_sibling(h),
                    };
                    engine.set_side(Dimension::Mutated, h, side, Sibling::from(live));
                }
                Some(Sibling::Promise(id)) => {
                    let live = match side {
                        Side::Prev => tree.prev_sibling(h),
                        Side::Next => tree.next_sibling(h),
                    };
                    engine.set_side(Dimension::Mutated, h, side, Sibling::from(live));
                    if let Some(p) = engine.promises.discard(id) {
                        resumed.push((h.clone(), side, p));
                    }
                }
                _ => {}
            }
        }
    }

    // Resolve remaining next-promises first, then prev-promises (no
    // double-promise meeting can remain once the mutated dimension is
    // fully concrete).
    resumed.sort_by_key(|(_, side, _)| matches!(side, Side::Prev));

    let mut candidates: Vec<H> = Vec::new();
    for (ptr, dir, promise) in resumed {
        let anchor = chain_anchor(engine, &ptr, dir);
        let origin = &promise.origin;
        engine.set_side(Dimension::Original, origin, dir, anchor);
        if engine
            .get(origin)
            .map(|mn| mn.original.parent() == mn.mutated.parent() && mn.mutated.parent().is_some())
            .unwrap_or(false)
        {
            candidates.push(origin.clone());
        }
    }

    log::debug!(
        "synchronize: finalized {} record(s), {} now fully known",
        handles.len(),
        handles
            .iter()
            .filter(|h| engine.get(h).map(|mn| mn.mutated.is_fully_known()).unwrap_or(true))
            .count()
    );

    super::reversion::run(engine, candidates);
}

/// Walk `ptr.mutated[dir]`, then each subsequent floating node's
/// `mutated[dir]`, until a fixed node or the list boundary is reached.
fn chain_anchor<H: Handle>(engine: &Engine<H>, ptr: &H, dir: Side) -> Sibling<H> {
    let mut cur = match engine.get(ptr).and_then(|mn| mn.mutated.side(dir)).cloned() {
        Some(s) => s,
        None => return Sibling::None,
    };
    loop {
        match cur {
            Sibling::Node(h) => match engine.get(&h) {
                Some(mn) => match mn.mutated.side(dir).cloned() {
                    Some(next) => cur = next,
                    None => return Sibling::None,
                },
                None => return Sibling::Node(h),
            },
            Sibling::None => return Sibling::None,
            Sibling::Unknown | Sibling::Promise(_) => return Sibling::None,
        }
    }
}
