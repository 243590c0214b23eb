//! Grouping floating nodes into contiguous runs for patch/revert.
//!
//! The natural shape here is a generator over records with a visited set;
//! we materialize that eagerly into a
//! `Vec<Group<H>>` instead of a true coroutine, since the engine has no
//! async machinery and the record count is already fully resident in
//! memory (the same simplification the teacher's own iterator-returning
//! methods make when the underlying collection isn't itself lazy).

use crate::collaborators::TreeAccess;
use crate::engine::Engine;
use crate::handle::{Dimension, Handle, Side, Sibling};
use crate::position::Position;
use crate::record::MutatedNode;
use rustc_hash::FxHashSet;

/// One end of a [`Group`]'s span: a concrete fixed neighbor, the list
/// boundary, or a still-unresolved frontier (`Unknown`/a placed promise).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupBoundary<H> {
    Node(H),
    End,
    Unset,
}

/// A maximal run of floating nodes that are each other's neighbors in
/// `mode`, plus the fixed (or boundary) node just outside each end.
#[derive(Debug, Clone)]
pub struct Group<H> {
    pub nodes: Vec<H>,
    /// `None` only for the trailing "detached" group (`mode` position
    /// absent) produced when `include_removed` is set.
    pub parent: Option<H>,
    pub prev: GroupBoundary<H>,
    pub next: GroupBoundary<H>,
}

fn position_of<H>(mn: &MutatedNode<H>, mode: Dimension) -> &Position<H> {
    match mode {
        Dimension::Original => &mn.original,
        Dimension::Mutated => &mn.mutated,
    }
}

pub fn diff_grouped_children<H: Handle>(
    engine: &Engine<H>,
    mode: Dimension,
    include_removed: bool,
) -> Vec<Group<H>> {
    let mut visited: FxHashSet<H> = FxHashSet::default();
    let mut groups = Vec::new();
    let mut detached = Vec::new();

    for mn in engine.iter() {
        let h = &mn.handle;
        if visited.contains(h) {
            continue;
        }
        let pos = position_of(mn, mode);
        if pos.is_absent() {
            if include_removed {
                visited.insert(h.clone());
                detached.push(h.clone());
            }
            continue;
        }
        let parent = pos.parent().cloned();
        visited.insert(h.clone());
        let mut nodes = vec![h.clone()];

        let prev_start = pos.prev().cloned();
        let next_start = pos.next().cloned();
        let prev = walk_run(engine, mode, &parent, prev_start, &mut nodes, &mut visited, true);
        let next = walk_run(engine, mode, &parent, next_start, &mut nodes, &mut visited, false);

        groups.push(Group {
            nodes,
            parent,
            prev,
            next,
        });
    }

    if include_removed && !detached.is_empty() {
        groups.push(Group {
            nodes: detached,
            parent: None,
            prev: GroupBoundary::Unset,
            next: GroupBoundary::Unset,
        });
    }
    groups
}

/// Extend `nodes` outward (prepending if `front`, else appending) through
/// contiguous floating neighbors sharing `parent` in `mode`, stopping at a
/// fixed sibling, the list boundary, or an unresolved frontier.
fn walk_run<H: Handle>(
    engine: &Engine<H>,
    mode: Dimension,
    parent: &Option<H>,
    mut side: Option<Sibling<H>>,
    nodes: &mut Vec<H>,
    visited: &mut FxHashSet<H>,
    front: bool,
) -> GroupBoundary<H> {
    loop {
        match side {
            None => return GroupBoundary::Unset,
            Some(Sibling::None) => return GroupBoundary::End,
            Some(Sibling::Unknown) | Some(Sibling::Promise(_)) => return GroupBoundary::Unset,
            Some(Sibling::Node(h)) => {
                let Some(mn) = engine.get(&h) else {
                    return GroupBoundary::Node(h);
                };
                let neighbor_pos = position_of(mn, mode);
                if neighbor_pos.parent() != parent.as_ref() || visited.contains(&h) {
                    return GroupBoundary::Node(h);
                }
                let next_side = if front { neighbor_pos.prev() } else { neighbor_pos.next() }.cloned();
                visited.insert(h.clone());
                if front {
                    nodes.insert(0, h);
                } else {
                    nodes.push(h);
                }
                side = next_side;
            }
        }
    }
}

/// `patch_grouped_children`: a pure function over the caller's live
/// tree. Detaches every node first (avoids ordering hazards when a node
/// has migrated between ancestor and descendant), then re-inserts each
/// group at its resolved boundary.
pub fn patch_grouped_children<T: TreeAccess>(tree: &mut T, groups: &[Group<T::Handle>]) {
    for group in groups {
        for node in &group.nodes {
            tree.remove(node);
        }
    }
    for group in groups {
        if group.nodes.is_empty() || group.parent.is_none() {
            continue;
        }
        patch_one(tree, group);
    }
}

fn patch_one<T: TreeAccess>(tree: &mut T, group: &Group<T::Handle>) {
    if let GroupBoundary::Node(next) = &group.next {
        tree.insert_before(next, &group.nodes);
        return;
    }
    if let GroupBoundary::Node(prev) = &group.prev {
        match tree.next_sibling(prev) {
            Some(after) => tree.insert_before(&after, &group.nodes),
            None => {
                if let Some(parent) = &group.parent {
                    tree.append(parent, &group.nodes);
                }
            }
        }
        return;
    }
    if group.next == GroupBoundary::End {
        if let Some(parent) = &group.parent {
            tree.append(parent, &group.nodes);
            return;
        }
    }
    if group.prev == GroupBoundary::End {
        if let Some(parent) = &group.parent {
            tree.prepend(parent, &group.nodes);
            return;
        }
    }
    log::warn!(
        "skipping unpatchable group of {} node(s) under {:?}: no resolved boundary",
        group.nodes.len(),
        group.parent
    );
}
