//! The tree-mutation engine: the graph of [`MutatedNode`] records plus
//! the [`SiblingIndex`]/[`PromiseTable`] that keep it consistent across
//! out-of-order, batched child-list reports.
//!
//! `mutation()` is split into six numbered steps, each a free function in
//! [`steps`] operating on `&mut Engine`; `synchronize()` lives here
//! directly since it is one cohesive pass, not a pipeline. Reversion
//! propagation (reused by `synchronize`) lives in [`reversion`].

mod reversion;
mod steps;

use crate::collaborators::TreeAccess;
use crate::handle::{Dimension, Handle, Side, Sibling};
use crate::position::Position;
use crate::promise::PromiseTable;
use crate::record::MutatedNode;
use indexmap::IndexMap;

/// The child-list half of the ledger: every currently-floating node's
/// original/mutated position, indexed for O(1) sibling lookup.
#[derive(Debug)]
pub struct Engine<H: Handle> {
    records: IndexMap<H, MutatedNode<H>>,
    index: crate::index::SiblingIndex<H>,
    promises: PromiseTable<H>,
}

impl<H: Handle> Default for Engine<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Handle> Engine<H> {
    pub fn new() -> Self {
        Self {
            records: IndexMap::new(),
            index: crate::index::SiblingIndex::new(),
            promises: PromiseTable::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn get(&self, h: &H) -> Option<&MutatedNode<H>> {
        self.records.get(h)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MutatedNode<H>> {
        self.records.values()
    }

    pub fn contains(&self, h: &H) -> bool {
        self.records.contains_key(h)
    }

    /// Clear every record, index entry, and parked promise.
    pub fn clear(&mut self) {
        self.records.clear();
        self.index = crate::index::SiblingIndex::new();
        self.promises = PromiseTable::new();
    }

    /// Get-or-insert a floating record, both sides absent.
    fn ensure(&mut self, h: H) -> &mut MutatedNode<H> {
        self.records
            .entry(h.clone())
            .or_insert_with(|| MutatedNode::new(h, Position::Absent, Position::Absent))
    }

    /// Delete a record entirely: both sibling indices, any promise it still
    /// holds via a `mutated` slot, and the record itself. Used both for
    /// add+remove cancellation and for fixed-node pruning.
    fn destroy(&mut self, h: &H) {
        if let Some(mn) = self.records.get(h) {
            for (dim, pos) in [
                (Dimension::Original, &mn.original),
                (Dimension::Mutated, &mn.mutated),
            ] {
                for side in [Side::Prev, Side::Next] {
                    match pos.side(side) {
                        Some(Sibling::Node(x)) => {
                            let x = x.clone();
                            self.index.remove(dim, side, &x, h);
                        }
                        Some(Sibling::Promise(id)) => {
                            self.promises.discard(*id);
                        }
                        _ => {}
                    }
                }
            }
        }
        self.records.swap_remove(h);
    }

    /// Write `owner.dim.side := value`, maintaining the sibling index via
    /// disconnect-by-overwrite: the prior `Node`
    /// entry under this key is removed before the new one (if any) is
    /// inserted. Does not touch the promise table; callers that overwrite
    /// a `Promise` slot are responsible for discarding it (see
    /// `steps::clear_mutated_side`), since only the caller knows whether
    /// that promise should resolve, be re-parked, or simply vanish.
    fn set_side(&mut self, dim: Dimension, owner: &H, side: Side, value: Sibling<H>) {
        if let Some(mn) = self.records.get(owner) {
            let pos = match dim {
                Dimension::Original => &mn.original,
                Dimension::Mutated => &mn.mutated,
            };
            if let Some(Sibling::Node(old)) = pos.side(side) {
                let old = old.clone();
                self.index.remove(dim, side, &old, owner);
            }
        }
        if let Some(mn) = self.records.get_mut(owner) {
            match dim {
                Dimension::Original => mn.original.set_side(side, value.clone()),
                Dimension::Mutated => mn.mutated.set_side(side, value.clone()),
            }
        }
        if let Sibling::Node(x) = &value {
            self.index.insert(dim, side, x.clone(), owner.clone());
        }
    }

    /// Reset `owner.dim` to `At { parent, Unknown, Unknown }`, clearing any
    /// index entries the previous position held. Used when a record first
    /// gains a position in a dimension.
    fn set_parent(&mut self, dim: Dimension, owner: &H, parent: H) {
        self.set_side(dim, owner, Side::Prev, Sibling::Unknown);
        self.set_side(dim, owner, Side::Next, Sibling::Unknown);
        if let Some(mn) = self.records.get_mut(owner) {
            let pos = Position::known(parent, Sibling::Unknown, Sibling::Unknown);
            match dim {
                Dimension::Original => mn.original = pos,
                Dimension::Mutated => mn.mutated = pos,
            }
        }
    }

    /// Cross-validate the sibling graph's invariants against the engine's
    /// own state. Exposed directly so tests can assert on it without tripping the
    /// `debug_assertions`/`integrity-checks` gate below.
    pub fn debug_assert_invariants(&self) -> crate::error::Result<()> {
        reversion::integrity::check(self)
    }

    /// Accept one batched child-list report. `prev`/`next` are the
    /// point-in-time boundary siblings of the replaced run; `None` means
    /// the list boundary.
    pub fn mutation(
        &mut self,
        parent: H,
        removed: Vec<H>,
        added: Vec<H>,
        prev: Option<H>,
        next: Option<H>,
    ) {
        steps::mutation(self, parent, removed, added, prev, next);
        #[cfg(any(debug_assertions, feature = "integrity-checks"))]
        self.debug_assert_invariants()
            .expect("sibling graph invariant violated");
    }

    /// Finalize every outstanding unknown/promise by consulting the live
    /// tree. After this call no position contains `Unknown` or a placed
    /// promise.
    pub fn synchronize<T: TreeAccess<Handle = H>>(&mut self, tree: &T) {
        steps::synchronize(self, tree);
        #[cfg(any(debug_assertions, feature = "integrity-checks"))]
        self.debug_assert_invariants()
            .expect("sibling graph invariant violated");
    }
}
