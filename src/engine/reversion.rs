//! Reversion propagation.
//!
//! A floating node whose `mutated` position has become structurally equal
//! to its `original` position is sitting back where it started; it is
//! pruned and its original neighbors are re-checked, since fixing one node
//! can expose that the next one over has also returned home.
//!
//! The general form of this problem is anchor-matching propagation through
//! candidate spans with per-side "dead" bits (an incremental algorithm for
//! a streaming setting with partially-known positions). Since a
//! [`crate::record::MutatedNode`] only ever carries a worklist entry once
//! both its `original` and `mutated` sides are fully resolved (everything
//! upstream either skips unresolved nodes or defers them via a promise),
//! direct structural equality between the two positions is an equivalent,
//! simpler test here — see DESIGN.md for the worked trace this was checked
//! against (the intermediary-reversion scenario).

use super::Engine;
use crate::handle::{Handle, Sibling};
use crate::record::MutatedNode;
use rustc_hash::FxHashSet;

pub(super) fn run<H: Handle>(engine: &mut Engine<H>, mut worklist: Vec<H>) {
    let mut seen: FxHashSet<H> = FxHashSet::default();
    while let Some(h) = worklist.pop() {
        if !seen.insert(h.clone()) {
            continue;
        }
        let Some(mn) = engine.get(&h) else { continue };
        if !is_reverted(mn) {
            continue;
        }
        log::trace!("reversion: node returned to its original position");
        let neighbors = original_neighbors(mn);
        engine.destroy(&h);
        for n in neighbors {
            if engine.contains(&n) {
                seen.remove(&n);
                worklist.push(n);
            }
        }
    }
}

fn is_reverted<H: Handle>(mn: &MutatedNode<H>) -> bool {
    !mn.original.is_absent() && mn.original == mn.mutated
}

/// The original-side neighbors of a node about to be pruned: fixing it may
/// let a neighbor's own candidacy now match and propagate outward.
fn original_neighbors<H: Handle>(mn: &MutatedNode<H>) -> Vec<H> {
    let mut out = Vec::new();
    if let Some(Sibling::Node(h)) = mn.original.prev() {
        out.push(h.clone());
    }
    if let Some(Sibling::Node(h)) = mn.original.next() {
        out.push(h.clone());
    }
    out
}

/// The debug-only cross-validation of the sibling graph's invariants,
/// restricted to what is checkable from the engine's own state without an
/// external tree oracle — the coordinator's test suite additionally checks
/// the floating-iff-recorded invariant itself against a cached tree
/// snapshot.
pub(super) mod integrity {
    use super::*;
    use crate::error::{Error, Result};
    use crate::handle::Dimension;

    pub fn check<H: Handle>(engine: &Engine<H>) -> Result<()> {
        for mn in engine.iter() {
            // A tracked record must actually be floating.
            if !mn.original.is_absent() && mn.original == mn.mutated {
                return Err(Error::InvariantViolation(format!(
                    "record for {:?} is not floating (original == mutated)",
                    mn.handle
                )));
            }
            // Every Node-valued side must round-trip through the index.
            for (dim, pos) in [
                (Dimension::Original, &mn.original),
                (Dimension::Mutated, &mn.mutated),
            ] {
                for side in [crate::handle::Side::Prev, crate::handle::Side::Next] {
                    if let Some(Sibling::Node(x)) = pos.side(side) {
                        match engine.index.owner_of(dim, side, x) {
                            Some(owner) if *owner == mn.handle => {}
                            _ => {
                                return Err(Error::InvariantViolation(format!(
                                    "index missing/incorrect entry for {:?}.{:?}.{:?} == {:?}",
                                    mn.handle, dim, side, x
                                )))
                            }
                        }
                    }
                }
            }
        }

        // Every placed promise's ptr really is parking it, and the
        // origin is still floating.
        for (_id, promise) in engine.promises.iter() {
            let ptr_mn = engine.get(&promise.ptr).ok_or_else(|| {
                Error::InvariantViolation(format!("promise ptr {:?} has no record", promise.ptr))
            })?;
            match ptr_mn.mutated.side(promise.dir) {
                Some(Sibling::Promise(_)) => {}
                other => {
                    return Err(Error::InvariantViolation(format!(
                        "promise ptr {:?} does not carry its placement (found {:?})",
                        promise.ptr, other
                    )))
                }
            }
            if !engine.contains(&promise.origin) {
                return Err(Error::InvariantViolation(format!(
                    "promise origin {:?} is not floating",
                    promise.origin
                )));
            }
        }
        Ok(())
    }
}
