//! The [`PromiseTable`]: the side-table backing every [`Sibling::Promise`].
//!
//! A `SiblingPromise` is a deferred search: "origin node O is still looking
//! for its original sibling in direction `dir`; the search currently sits
//! at `ptr`". We never give a promise an address inside another record —
//! per DESIGN.md's "no global state" / "promise as tagged union" notes, the
//! sibling slot only ever holds a small `Copy` [`PromiseId`], and this table
//! is the one place that owns the `(origin, dir, ptr)` triple. Placement
//! writes `ptr`'s `mutated[dir]` slot to `Sibling::Promise(id)`; resolution
//! or discard removes the table entry and clears that slot.

use crate::handle::{Handle, Side};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PromiseId(u64);

/// One parked search for an original sibling: `origin`'s `original[dir]`
/// is still unresolved; the search currently sits at `ptr`.
#[derive(Debug, Clone)]
pub struct Promise<H> {
    pub origin: H,
    /// Which side of `origin` we're searching for.
    pub dir: Side,
    /// The node currently holding this promise in its `mutated[dir]` slot.
    pub ptr: H,
}

#[derive(Debug, Default)]
pub struct PromiseTable<H> {
    promises: FxHashMap<PromiseId, Promise<H>>,
    next_id: u64,
}

impl<H: Handle> PromiseTable<H> {
    pub fn new() -> Self {
        Self {
            promises: FxHashMap::default(),
            next_id: 0,
        }
    }

    /// Park a new promise and return its id. Does not write the `ptr`'s
    /// sibling slot; the caller does that with the returned id.
    pub fn place(&mut self, origin: H, dir: Side, ptr: H) -> PromiseId {
        let id = PromiseId(self.next_id);
        self.next_id += 1;
        self.promises.insert(id, Promise { origin, dir, ptr });
        id
    }

    /// Remove a promise unconditionally, whether it resolved or its origin
    /// was fixed. Does not touch the `ptr`'s sibling slot; the caller is
    /// expected to overwrite that slot itself (resolution writes a real
    /// value there; a fixed origin simply drops the whole record).
    pub fn discard(&mut self, id: PromiseId) -> Option<Promise<H>> {
        self.promises.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PromiseId, &Promise<H>)> {
        self.promises.iter()
    }
}
