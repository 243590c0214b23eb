//! [`Ledger`]: the top-level coordinator, wiring the tree-mutation
//! engine and the property cache together behind the public query surface.

use crate::collaborators::TreeAccess;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::filter::DiffFilter;
use crate::grouped::{self, Group};
use crate::handle::{Dimension, Sibling};
use crate::position::Position;
use crate::property::{Cache, OldValue, PropertyKey};
use crate::range::{document_order, Range};
use indexmap::IndexMap;

/// The per-node delta [`Ledger::diff`] materializes: which children-list
/// position(s) a node carries (gated by the `ORIGINAL`/`MUTATED` filter
/// bits) and which properties are dirty, each holding the *original*
/// value the property would be restored to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildDelta<H> {
    pub original: Option<Position<H>>,
    pub mutated: Option<Position<H>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta<H, V> {
    pub children: Option<ChildDelta<H>>,
    pub data: Option<Option<V>>,
    pub attributes: Vec<(String, Option<V>)>,
    pub custom: Vec<(String, Option<V>)>,
}

impl<H, V> Delta<H, V> {
    fn empty() -> Self {
        Self {
            children: None,
            data: None,
            attributes: Vec::new(),
            custom: Vec::new(),
        }
    }
}

/// The top-level coordinator: one tracked tree's worth of child-list and
/// property deltas, plus the collaborator used to patch/revert/synchronize
/// against the live tree.
#[derive(Debug)]
pub struct Ledger<T: TreeAccess> {
    engine: Engine<T::Handle>,
    properties: Cache<T::Handle, T::Value>,
    tree: T,
}

impl<T: TreeAccess> Ledger<T> {
    pub fn new(tree: T) -> Self {
        Self {
            engine: Engine::new(),
            properties: Cache::new(),
            tree,
        }
    }

    /// Swap in a different tree collaborator, keeping all recorded
    /// deltas, and return the one it replaces.
    pub fn with_tree(&mut self, tree: T) -> T {
        std::mem::replace(&mut self.tree, tree)
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    /// Record one batched child-list report.
    pub fn record_children(
        &mut self,
        parent: T::Handle,
        removed: Vec<T::Handle>,
        added: Vec<T::Handle>,
        prev: Option<T::Handle>,
        next: Option<T::Handle>,
    ) {
        self.engine.mutation(parent, removed, added, prev, next);
    }

    /// Record a namespace-qualified attribute change. The current value
    /// is read from the live tree, since reports only ever carry the *old*
    /// value.
    pub fn record_attribute(&mut self, node: T::Handle, key: impl Into<String>, old_value: OldValue<T::Value>) {
        let key = key.into();
        let current = self.tree.attribute(&node, &key);
        self.properties.mark(node, PropertyKey::Attribute(key), current, old_value);
    }

    pub fn record_data(&mut self, node: T::Handle, old_value: OldValue<T::Value>) {
        let current = self.tree.data(&node);
        self.properties.mark(node, PropertyKey::Data, current, old_value);
    }

    /// Custom properties have no native storage, so the caller
    /// supplies the current value directly rather than it being read back
    /// from the tree.
    pub fn record_custom(
        &mut self,
        node: T::Handle,
        key: impl Into<String>,
        new_value: Option<T::Value>,
        old_value: OldValue<T::Value>,
    ) {
        self.properties
            .mark(node, PropertyKey::Custom(key.into()), new_value, old_value);
    }

    fn inside(&self, root: Option<&T::Handle>, node: &T::Handle) -> bool {
        match root {
            None => true,
            Some(r) => self.tree.is_ancestor_or_self(r, node),
        }
    }

    /// True iff anything tracked falls inside `root` (or, with no
    /// root, iff anything is tracked at all).
    pub fn mutated(&self, root: Option<&T::Handle>) -> bool {
        match root {
            None => !self.engine.is_empty() || !self.properties.is_empty(),
            Some(r) => {
                self.engine.iter().any(|mn| {
                    mn.original
                        .parent()
                        .map(|p| self.tree.is_ancestor_or_self(r, p))
                        .unwrap_or(false)
                        || mn
                            .mutated
                            .parent()
                            .map(|p| self.tree.is_ancestor_or_self(r, p))
                            .unwrap_or(false)
                }) || self
                    .properties
                    .dirty_iter()
                    .any(|(node, _, _)| self.tree.is_ancestor_or_self(r, node))
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.mutated(None)
    }

    /// Cross-validate the sibling graph's consistency against the engine's
    /// own state. Runs unconditionally regardless of `debug_assertions`/
    /// `integrity-checks`, so property tests can assert on it directly.
    pub fn debug_assert_invariants(&self) -> Result<()> {
        self.engine.debug_assert_invariants()
    }

    /// The inclusive outer bounds of every tracked change.
    pub fn range(&self, root: Option<&T::Handle>) -> Result<Option<Range<T::Handle>>> {
        let order = |a: &crate::range::Boundary<T::Handle>, b: &crate::range::Boundary<T::Handle>| {
            document_order(&self.tree, a, b)
        };
        let mut fr = Range::empty();
        let mut seen_root: Option<T::Handle> = None;
        let mut note_root = |node: &T::Handle, seen_root: &mut Option<T::Handle>| -> Result<()> {
            if root.is_none() {
                let r = self.tree.root_of(node);
                match seen_root {
                    Some(existing) if *existing != r => return Err(Error::AmbiguousRange),
                    _ => *seen_root = Some(r),
                }
            }
            Ok(())
        };

        for (node, _key, _original) in self.properties.dirty_iter() {
            if !self.inside(root, node) {
                continue;
            }
            note_root(node, &mut seen_root)?;
            let sr = Range::select_node(node.clone(), true);
            fr.extend(&sr, &order);
        }

        for mn in self.engine.iter() {
            let is_dirty_property = self.properties.node_is_dirty(&mn.handle);
            if let Some(parent) = self.tree.parent(&mn.handle) {
                if self.inside(root, &parent) && !is_dirty_property {
                    note_root(&mn.handle, &mut seen_root)?;
                    fr.extend(&Range::select_node(mn.handle.clone(), true), &order);
                }
            }
            if let Position::At { parent, prev, next } = &mn.original {
                if !self.inside(root, parent) {
                    continue;
                }
                let prev_fixed = matches!(prev, Sibling::None)
                    || matches!(prev, Sibling::Node(x) if !self.engine.contains(x));
                let next_fixed = matches!(next, Sibling::None)
                    || matches!(next, Sibling::Node(x) if !self.engine.contains(x));
                if !prev_fixed && !next_fixed {
                    continue; // covered by whichever neighbor's own fixed chain reaches here
                }
                note_root(parent, &mut seen_root)?;
                let mut sr = Range::empty();
                if prev_fixed {
                    match prev {
                        Sibling::None => sr.set_start(parent.clone(), crate::range::BoundaryFlag::AfterOpen),
                        Sibling::Node(x) => sr.set_start(x.clone(), crate::range::BoundaryFlag::AfterClose),
                        _ => unreachable!(),
                    }
                }
                if next_fixed {
                    match next {
                        Sibling::None => sr.set_end(parent.clone(), crate::range::BoundaryFlag::BeforeClose),
                        Sibling::Node(x) => sr.set_end(x.clone(), crate::range::BoundaryFlag::BeforeOpen),
                        _ => unreachable!(),
                    }
                }
                if prev_fixed && !next_fixed {
                    sr.collapse(true);
                } else if next_fixed && !prev_fixed {
                    sr.collapse(false);
                }
                fr.extend(&sr, &order);
            }
        }

        if fr.is_null() {
            Ok(None)
        } else {
            fr.normalize(&self.tree, &|h| self.engine.contains(h));
            Ok(Some(fr))
        }
    }

    /// Materialize a copy of the current delta.
    pub fn diff(&self, filter: DiffFilter) -> IndexMap<T::Handle, Delta<T::Handle, T::Value>> {
        let mut out: IndexMap<T::Handle, Delta<T::Handle, T::Value>> = IndexMap::new();
        if filter.contains(DiffFilter::CHILDREN) {
            for mn in self.engine.iter() {
                let entry = out.entry(mn.handle.clone()).or_insert_with(Delta::empty);
                entry.children = Some(ChildDelta {
                    original: filter.contains(DiffFilter::ORIGINAL).then(|| mn.original.clone()),
                    mutated: filter.contains(DiffFilter::MUTATED).then(|| mn.mutated.clone()),
                });
            }
        }
        for (node, key, value) in self.properties.dirty_iter() {
            let relevant = match key {
                PropertyKey::Data => filter.contains(DiffFilter::DATA),
                PropertyKey::Attribute(_) => filter.contains(DiffFilter::ATTRIBUTE),
                PropertyKey::Custom(_) => filter.contains(DiffFilter::CUSTOM),
            };
            if !relevant {
                continue;
            }
            let entry = out.entry(node.clone()).or_insert_with(Delta::empty);
            match key {
                PropertyKey::Data => entry.data = Some(value.clone()),
                PropertyKey::Attribute(name) => entry.attributes.push((name.clone(), value.clone())),
                PropertyKey::Custom(name) => entry.custom.push((name.clone(), value.clone())),
            }
        }
        out
    }

    /// The grouped view of `mode`'s child-list deltas.
    pub fn diff_grouped_children(&self, mode: Dimension, include_removed: bool) -> Vec<Group<T::Handle>> {
        grouped::diff_grouped_children(&self.engine, mode, include_removed)
    }

    /// Patch `self.tree` to match `groups` (a pure function over the
    /// caller's tree; `groups` need not have come from `self`).
    pub fn patch_grouped_children(&mut self, groups: &[Group<T::Handle>]) {
        grouped::patch_grouped_children(&mut self.tree, groups);
    }

    /// Resolve every outstanding unknown/promise by consulting the
    /// live tree, and drop property entries that turned out not to be
    /// dirty after all.
    pub fn synchronize(&mut self) {
        self.engine.synchronize(&self.tree);
        let remaining = self.properties.synchronize();
        log::debug!("synchronize: {remaining} dirty propert(y/ies) remain");
    }

    /// Restore properties, then physically restore the tree via
    /// `patch_grouped_children(diff_grouped_children(ORIGINAL, true))`,
    /// then clear unconditionally.
    pub fn revert(&mut self, custom_set: Option<&dyn Fn(&T::Handle, &str, &Option<T::Value>)>) {
        let dirty: Vec<(T::Handle, PropertyKey, Option<T::Value>)> = self
            .properties
            .dirty_iter()
            .map(|(n, k, v)| (n.clone(), k.clone(), v.clone()))
            .collect();
        for (node, key, value) in dirty {
            match key {
                PropertyKey::Attribute(name) => self.tree.set_attribute(&node, &name, value),
                PropertyKey::Data => self.tree.set_data(&node, value),
                PropertyKey::Custom(name) => {
                    if let Some(setter) = custom_set {
                        setter(&node, &name, &value);
                    }
                }
            }
        }
        let groups = grouped::diff_grouped_children(&self.engine, Dimension::Original, true);
        grouped::patch_grouped_children(&mut self.tree, &groups);
        self.clear();
    }

    /// Drop every record and dirty property, unconditionally.
    pub fn clear(&mut self) {
        self.engine.clear();
        self.properties.clear();
    }
}
