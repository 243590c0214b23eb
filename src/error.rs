//! The error taxonomy, as a single `thiserror` enum.
//!
//! Only two of the four recoverable-error conditions are typed `Error`s;
//! *Unpatchable group* is a logged warning (see `grouped::patch_grouped_children`)
//! and *missing old value* is a silent no-op (see `property::Cache::mark`).

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `range()` was called with no root and the accumulated changes span
    /// more than one disconnected tree.
    #[error("range() requires an explicit root: mutations span disconnected trees")]
    AmbiguousRange,

    /// Raised only by the debug-only self-check (`engine::integrity`); a
    /// violation here is a bug in the engine, not caller misuse.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
