//! An incremental child-list and property diff tracker for observer-style
//! tree mutation reports (DOM `MutationRecord`s and the like).
//!
//! A [`Ledger`] accumulates batched `record_children`/`record_attribute`/
//! `record_data`/`record_custom` reports against an opaque tree of `H`
//! handles, without itself walking the live tree on every call. Each
//! floating node's original and current position is kept in a small
//! sibling-promise graph (`engine`) that only resolves deferred lookups
//! lazily, either when a later report's own neighborhood happens to reveal
//! them or explicitly via [`Ledger::synchronize`]. See `DESIGN.md` for how
//! each part of the crate is grounded.
//!
//! ```ignore
//! use mutation_ledger::Ledger;
//! let tree = build_tree(); // anything implementing `TreeAccess`
//! let mut ledger = Ledger::new(tree);
//! ledger.record_children(1, vec![2], vec![3], None, None);
//! assert!(ledger.mutated(None));
//! ```

#[cfg(feature = "init_env_logger")]
pub fn init_logger() {
    let _ = env_logger::try_init();
}

pub mod collaborators;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod filter;
pub mod grouped;
pub mod handle;
pub mod index;
pub mod position;
pub mod promise;
pub mod property;
pub mod range;
pub mod record;

pub use collaborators::TreeAccess;
pub use coordinator::{ChildDelta, Delta, Ledger};
pub use error::{Error, Result};
pub use filter::DiffFilter;
pub use handle::{Dimension, Handle, Side, Sibling};
pub use position::Position;
pub use property::{OldValue, PropertyKey};
pub use range::{Boundary, BoundaryFlag, Range};
pub use record::MutatedNode;
