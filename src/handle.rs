//! The tree-node handle bound and the `Sibling` tagged union.
//!
//! A [`Sibling`] is one of the four things a child-list position can point
//! at: a concrete node, the boundary of the list, an as-yet-unreported
//! neighbor, or a deferred search for one (a [`PromiseId`]). Keeping the
//! promise variant a plain id rather than a pointer is what lets the whole
//! position graph stay `Copy`-ish and free of reference cycles (see
//! DESIGN.md, "promise as tagged union").

use crate::promise::PromiseId;
use std::fmt::Debug;
use std::hash::Hash;

/// Marker trait for anything usable as an opaque tree-node identity.
///
/// The ledger never dereferences `H`; it only ever compares, hashes, and
/// clones it, then hands it back to the caller's [`crate::TreeAccess`].
pub trait Handle: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> Handle for T {}

/// One child-list neighbor, in a given dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sibling<H> {
    /// A concrete neighboring node.
    Node(H),
    /// The boundary of the child list (no neighbor on this side).
    None,
    /// We have never been told what this neighbor is.
    Unknown,
    /// A deferred search for the neighbor, parked in the promise table.
    Promise(PromiseId),
}

impl<H> Sibling<H> {
    pub fn is_node(&self) -> bool {
        matches!(self, Sibling::Node(_))
    }

    pub fn is_promise(&self) -> bool {
        matches!(self, Sibling::Promise(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Sibling::Unknown)
    }

    pub fn as_node(&self) -> Option<&H> {
        match self {
            Sibling::Node(h) => Some(h),
            _ => None,
        }
    }

    pub fn promise_id(&self) -> Option<PromiseId> {
        match self {
            Sibling::Promise(id) => Some(*id),
            _ => None,
        }
    }
}

impl<H> From<Option<H>> for Sibling<H> {
    fn from(value: Option<H>) -> Self {
        match value {
            Some(h) => Sibling::Node(h),
            None => Sibling::None,
        }
    }
}

/// Which side of a node a sibling sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Prev,
    Next,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Prev => Side::Next,
            Side::Next => Side::Prev,
        }
    }
}

/// Which dimension a position belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Original,
    Mutated,
}

impl Dimension {
    pub(crate) fn index(self) -> usize {
        match self {
            Dimension::Original => 0,
            Dimension::Mutated => 1,
        }
    }
}
