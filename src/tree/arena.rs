//! Flat, index-addressed view of a scanned tree

use std::collections::HashMap;

use super::node::{Node, NodeId};

/// One node in a [`FlatTree`], with its parent and children as indices.
#[derive(Debug, Clone)]
pub struct FlatEntry<'a> {
    pub node: &'a Node,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

/// Pre-order arena over a borrowed [`Node`] tree.
///
/// Layout strategies that need parent lookups or dense per-node arrays (the
/// force simulation in particular) work on indices instead of walking the
/// nested tree. Index 0 is the root when the tree is non-empty.
#[derive(Debug, Clone, Default)]
pub struct FlatTree<'a> {
    entries: Vec<FlatEntry<'a>>,
    index: HashMap<&'a NodeId, usize>,
}

impl<'a> FlatTree<'a> {
    pub fn new(root: &'a Node) -> Self {
        let mut tree = FlatTree {
            entries: Vec::with_capacity(root.node_count()),
            index: HashMap::new(),
        };
        tree.push(root, None);
        tree
    }

    fn push(&mut self, node: &'a Node, parent: Option<usize>) -> usize {
        let idx = self.entries.len();
        self.entries.push(FlatEntry {
            node,
            parent,
            children: Vec::with_capacity(node.children().len()),
        });
        // First occurrence wins; duplicates are reported by the layout engine
        self.index.entry(&node.id).or_insert(idx);
        if let Some(p) = parent {
            self.entries[p].children.push(idx);
        }
        for child in node.children() {
            self.push(child, Some(idx));
        }
        idx
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&FlatEntry<'a>> {
        self.entries.get(idx)
    }

    pub fn node(&self, idx: usize) -> &'a Node {
        self.entries[idx].node
    }

    pub fn parent(&self, idx: usize) -> Option<usize> {
        self.entries.get(idx).and_then(|e| e.parent)
    }

    pub fn children(&self, idx: usize) -> &[usize] {
        self.entries.get(idx).map_or(&[][..], |e| e.children.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlatEntry<'a>> {
        self.entries.iter()
    }

    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Whether every node id in the tree is distinct.
    pub fn has_unique_ids(&self) -> bool {
        self.index.len() == self.entries.len()
    }

    /// First id that occurs more than once, in pre-order.
    pub fn duplicate_id(&self) -> Option<&'a NodeId> {
        self.entries
            .iter()
            .enumerate()
            .find(|(i, e)| self.index.get(&e.node.id) != Some(i))
            .map(|(_, e)| {
                let node: &'a Node = e.node;
                &node.id
            })
    }

    /// Parent-child index pairs in pre-order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.parent.map(|p| (p, i)))
    }
}
