//! The external interface the ledger consumes but does not implement: the
//! live-tree collaborator. (The observed-tree *driver* that turns raw
//! mutation records into `record_children`/`record_attribute` calls is
//! out of scope and not modeled here at all — callers own that adapter.)

use crate::handle::Handle;
use std::fmt::Debug;

/// Everything the ledger needs to read and write the live tree: sibling
/// navigation (for `synchronize`), attribute/data reads (for
/// `record_attribute`/`record_data`'s current-value lookup), and the
/// mutation primitives `remove`/`insertBefore`/`append`/`prepend`/
/// `setAttribute`/`removeAttribute`/character-data assignment (used only
/// by `patch_grouped_children`/`revert`).
pub trait TreeAccess {
    type Handle: Handle;
    type Value: Clone + PartialEq + Debug;

    fn parent(&self, node: &Self::Handle) -> Option<Self::Handle>;
    fn prev_sibling(&self, node: &Self::Handle) -> Option<Self::Handle>;
    fn next_sibling(&self, node: &Self::Handle) -> Option<Self::Handle>;

    /// Is `node` equal to or a descendant of `ancestor`? Used to scope
    /// `mutated(root)`/`range(root)` queries to a subtree.
    fn is_ancestor_or_self(&self, ancestor: &Self::Handle, node: &Self::Handle) -> bool;

    /// The root tree `node` currently belongs to, used to detect when a
    /// no-root `range()` call's contributions span more than one tree.
    fn root_of(&self, node: &Self::Handle) -> Self::Handle;

    fn attribute(&self, node: &Self::Handle, key: &str) -> Option<Self::Value>;
    fn data(&self, node: &Self::Handle) -> Option<Self::Value>;

    fn set_attribute(&mut self, node: &Self::Handle, key: &str, value: Option<Self::Value>);
    fn set_data(&mut self, node: &Self::Handle, value: Option<Self::Value>);

    fn remove(&mut self, node: &Self::Handle);
    /// `next.before(...nodes)`.
    fn insert_before(&mut self, next: &Self::Handle, nodes: &[Self::Handle]);
    fn append(&mut self, parent: &Self::Handle, nodes: &[Self::Handle]);
    fn prepend(&mut self, parent: &Self::Handle, nodes: &[Self::Handle]);
}
