//! [`SiblingIndex`]: the two (original/mutated) x (prev/next) reverse maps.
//!
//! Per DESIGN.md's "cyclic reference graph" note, the index never stores a
//! reference to a [`crate::record::MutatedNode`] — only the owner's handle.
//! The `records: IndexMap<H, MutatedNode<H>>` in `engine::Engine` is the
//! single owner; this index is a secondary, rebuildable lookup: "a node's
//! sibling in dimension D equals X" -> the handle of the MN recording that.

use crate::handle::{Dimension, Handle, Side};
use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
pub struct SiblingIndex<H> {
    // prev_of[dim][X] == owner  <=>  owner.D.prev == Node(X)
    prev_of: [FxHashMap<H, H>; 2],
    // next_of[dim][X] == owner  <=>  owner.D.next == Node(X)
    next_of: [FxHashMap<H, H>; 2],
}

impl<H: Handle> SiblingIndex<H> {
    pub fn new() -> Self {
        Self {
            prev_of: [FxHashMap::default(), FxHashMap::default()],
            next_of: [FxHashMap::default(), FxHashMap::default()],
        }
    }

    fn map(&self, dim: Dimension, side: Side) -> &FxHashMap<H, H> {
        match side {
            Side::Prev => &self.prev_of[dim.index()],
            Side::Next => &self.next_of[dim.index()],
        }
    }

    fn map_mut(&mut self, dim: Dimension, side: Side) -> &mut FxHashMap<H, H> {
        match side {
            Side::Prev => &mut self.prev_of[dim.index()],
            Side::Next => &mut self.next_of[dim.index()],
        }
    }

    /// The MN recording `X` as its `dim.side` sibling, if any.
    pub fn owner_of(&self, dim: Dimension, side: Side, x: &H) -> Option<&H> {
        self.map(dim, side).get(x)
    }

    /// Record `owner.dim.side == Node(x)`. Disconnect-by-overwrite: any
    /// prior entry under this `(dim, side, x)` key is silently replaced —
    /// the new claim on `x` wins, the old owner's link to it is simply gone.
    pub fn insert(&mut self, dim: Dimension, side: Side, x: H, owner: H) {
        self.map_mut(dim, side).insert(x, owner);
    }

    /// Remove the entry recording `owner.dim.side == Node(x)`, if it still
    /// points at `owner` (a stale overwrite must not be clobbered here).
    pub fn remove(&mut self, dim: Dimension, side: Side, x: &H, owner: &H) {
        let map = self.map_mut(dim, side);
        if map.get(x) == Some(owner) {
            map.remove(x);
        }
    }

    /// Remove every entry (both sides, one dimension) that points at
    /// `owner`, used when a record is destroyed or a dimension is reset.
    pub fn remove_owner(&mut self, dim: Dimension, owner: &H) {
        self.prev_of[dim.index()].retain(|_, v| v != owner);
        self.next_of[dim.index()].retain(|_, v| v != owner);
    }

    pub fn iter(&self, dim: Dimension, side: Side) -> impl Iterator<Item = (&H, &H)> {
        self.map(dim, side).iter()
    }
}
