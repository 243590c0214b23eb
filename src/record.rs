//! [`MutatedNode`]: the per-handle ledger entry.

use crate::position::Position;

/// A record for one floating handle.
///
/// A record exists iff the node's current position differs from its
/// original one. The coordinator never constructs a `MutatedNode` whose
/// `original == mutated`; `engine::reversion` is exactly the code that
/// deletes a record the moment that becomes true again.
///
/// §4.3 Step 5 describes per-side "dead" skip bits for candidates that
/// survive a failed reversion attempt; this port's reversion check is a
/// direct `original == mutated` structural-equality test on records that
/// are always fully resolved by the time they reach the worklist (see
/// `engine::reversion`), so there is no partial-candidate state for such
/// bits to skip re-checking and they are omitted here.
#[derive(Debug, Clone)]
pub struct MutatedNode<H> {
    pub handle: H,
    pub original: Position<H>,
    pub mutated: Position<H>,
}

impl<H: Clone> MutatedNode<H> {
    pub fn new(handle: H, original: Position<H>, mutated: Position<H>) -> Self {
        Self {
            handle,
            original,
            mutated,
        }
    }
}
