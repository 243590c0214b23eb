//! The property cache: a value cache with dirty bits for attributes,
//! character data, and caller-defined custom properties.
//!
//! Grounded on the same "cache entry carries its own dirty bit" shape the
//! teacher uses for its page cache (`data_management`), just keyed by
//! `(node, key)` instead of by disk offset, and with no eviction.

use crate::handle::Handle;
use indexmap::IndexMap;
use std::fmt::Debug;
use std::hash::Hash;

/// The logical namespace a property belongs to. Attribute keys are
/// namespace-qualified `"ns:name"` strings; `Data` is the sentinel
/// for character data; `Custom` keys are opaque caller-supplied strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Attribute(String),
    Data,
    Custom(String),
}

/// What the observer reported as the value immediately before a change.
///
/// Distinguishing `Absent` (the attribute genuinely didn't exist) from
/// `Unknown` (the observer report carried no old value at all) is what lets
/// [`Cache::mark`] silently ignore the latter on
/// first sight without mistaking it for "the attribute was absent".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OldValue<V> {
    Absent,
    Present(V),
    Unknown,
}

#[derive(Debug, Clone)]
struct Entry<V> {
    /// The value captured the first time this (node, key) was seen. Never
    /// changed after that.
    value: Option<V>,
    dirty: bool,
}

/// The attribute/character/custom property cache for one [`crate::Ledger`].
#[derive(Debug)]
pub struct Cache<H, V> {
    entries: IndexMap<(H, PropertyKey), Entry<V>>,
    dirty_count: usize,
}

impl<H: Handle, V: Clone + PartialEq + Debug> Cache<H, V> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            dirty_count: 0,
        }
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty_count
    }

    pub fn is_empty(&self) -> bool {
        self.dirty_count == 0
    }

    /// Record an observation: `key` on `node` changed from `old_value` to
    /// `new_value` (current, as read from the live tree or supplied by the
    /// caller for custom properties).
    pub fn mark(&mut self, node: H, key: PropertyKey, new_value: Option<V>, old_value: OldValue<V>) {
        let map_key = (node, key);
        if let Some(entry) = self.entries.get_mut(&map_key) {
            let was_dirty = entry.dirty;
            entry.dirty = new_value != entry.value;
            if entry.dirty != was_dirty {
                self.dirty_count = self
                    .dirty_count
                    .wrapping_add(entry.dirty as usize)
                    .wrapping_sub(was_dirty as usize);
            }
            return;
        }

        let original = match old_value {
            OldValue::Unknown => return, // nothing to anchor a dirty flag to
            OldValue::Absent => None,
            OldValue::Present(v) => Some(v),
        };
        let dirty = new_value != original;
        if dirty {
            self.dirty_count += 1;
        }
        self.entries.insert(map_key, Entry {
            value: original,
            dirty,
        });
    }

    pub fn is_dirty(&self, node: &H, key: &PropertyKey) -> bool {
        self.entries
            .get(&(node.clone(), key.clone()))
            .map(|e| e.dirty)
            .unwrap_or(false)
    }

    /// Iterate over every dirty `(node, key, original_value)` triple.
    pub fn dirty_iter(&self) -> impl Iterator<Item = (&H, &PropertyKey, &Option<V>)> {
        self.entries
            .iter()
            .filter(|(_, e)| e.dirty)
            .map(|((node, key), e)| (node, key, &e.value))
    }

    /// Drop every non-dirty entry; return the number remaining dirty.
    pub fn synchronize(&mut self) -> usize {
        self.entries.retain(|_, e| e.dirty);
        debug_assert_eq!(self.entries.len(), self.dirty_count);
        self.dirty_count
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.dirty_count = 0;
    }

    /// True if any dirty entry exists for `node`.
    pub fn node_is_dirty(&self, node: &H) -> bool {
        self.entries
            .iter()
            .any(|((n, _), e)| n == node && e.dirty)
    }
}

impl<H: Handle, V: Clone + PartialEq + Debug> Default for Cache<H, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sight_without_old_value_is_ignored() {
        let mut cache: Cache<u32, String> = Cache::new();
        cache.mark(1, PropertyKey::Data, Some("x".into()), OldValue::Unknown);
        assert_eq!(cache.dirty_count(), 0);
        assert!(!cache.node_is_dirty(&1));
    }

    #[test]
    fn revert_to_original_clears_dirty_without_forgetting() {
        let mut cache: Cache<u32, String> = Cache::new();
        cache.mark(
            1,
            PropertyKey::Attribute("id".into()),
            Some("B_modified".into()),
            OldValue::Present("B".into()),
        );
        assert!(cache.node_is_dirty(&1));
        cache.mark(
            1,
            PropertyKey::Attribute("id".into()),
            Some("B".into()),
            OldValue::Present("B_modified".into()),
        );
        assert!(!cache.node_is_dirty(&1));
        assert_eq!(cache.synchronize(), 0);
    }
}
