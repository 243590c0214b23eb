//! A plain in-memory tree used as the `TreeAccess` oracle for the
//! scenario and property tests. Handles are `u32`s chosen by each test.

use mutation_ledger::TreeAccess;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct VecTree {
    parent: HashMap<u32, u32>,
    children: HashMap<u32, Vec<u32>>,
    attrs: HashMap<(u32, String), String>,
    data: HashMap<u32, String>,
}

impl VecTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set up `parent`'s initial children, in order, for test fixtures.
    pub fn seed(&mut self, parent: u32, children: &[u32]) {
        for c in children {
            self.parent.insert(*c, parent);
        }
        self.children.insert(parent, children.to_vec());
    }

    pub fn children_of(&self, parent: u32) -> Vec<u32> {
        self.children.get(&parent).cloned().unwrap_or_default()
    }

    pub fn set_attr(&mut self, node: u32, key: &str, value: &str) {
        self.attrs.insert((node, key.to_string()), value.to_string());
    }
}

impl TreeAccess for VecTree {
    type Handle = u32;
    type Value = String;

    fn parent(&self, node: &u32) -> Option<u32> {
        self.parent.get(node).copied()
    }

    fn prev_sibling(&self, node: &u32) -> Option<u32> {
        let parent = self.parent(node)?;
        let siblings = self.children.get(&parent)?;
        let idx = siblings.iter().position(|n| n == node)?;
        idx.checked_sub(1).map(|i| siblings[i])
    }

    fn next_sibling(&self, node: &u32) -> Option<u32> {
        let parent = self.parent(node)?;
        let siblings = self.children.get(&parent)?;
        let idx = siblings.iter().position(|n| n == node)?;
        siblings.get(idx + 1).copied()
    }

    fn is_ancestor_or_self(&self, ancestor: &u32, node: &u32) -> bool {
        let mut cur = *node;
        loop {
            if cur == *ancestor {
                return true;
            }
            match self.parent(&cur) {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }

    fn root_of(&self, node: &u32) -> u32 {
        let mut cur = *node;
        while let Some(p) = self.parent(&cur) {
            cur = p;
        }
        cur
    }

    fn attribute(&self, node: &u32, key: &str) -> Option<String> {
        self.attrs.get(&(*node, key.to_string())).cloned()
    }

    fn data(&self, node: &u32) -> Option<String> {
        self.data.get(node).cloned()
    }

    fn set_attribute(&mut self, node: &u32, key: &str, value: Option<String>) {
        match value {
            Some(v) => {
                self.attrs.insert((*node, key.to_string()), v);
            }
            None => {
                self.attrs.remove(&(*node, key.to_string()));
            }
        }
    }

    fn set_data(&mut self, node: &u32, value: Option<String>) {
        match value {
            Some(v) => {
                self.data.insert(*node, v);
            }
            None => {
                self.data.remove(node);
            }
        }
    }

    fn remove(&mut self, node: &u32) {
        if let Some(parent) = self.parent.remove(node) {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.retain(|n| n != node);
            }
        }
    }

    fn insert_before(&mut self, next: &u32, nodes: &[u32]) {
        let parent = match self.parent(next) {
            Some(p) => p,
            None => return,
        };
        let siblings = self.children.entry(parent).or_default();
        let idx = siblings.iter().position(|n| n == next).unwrap_or(siblings.len());
        for (i, n) in nodes.iter().enumerate() {
            siblings.insert(idx + i, *n);
            self.parent.insert(*n, parent);
        }
    }

    fn append(&mut self, parent: &u32, nodes: &[u32]) {
        let siblings = self.children.entry(*parent).or_default();
        for n in nodes {
            siblings.push(*n);
            self.parent.insert(*n, *parent);
        }
    }

    fn prepend(&mut self, parent: &u32, nodes: &[u32]) {
        let siblings = self.children.entry(*parent).or_default();
        for (i, n) in nodes.iter().enumerate() {
            siblings.insert(i, *n);
            self.parent.insert(*n, *parent);
        }
    }
}
