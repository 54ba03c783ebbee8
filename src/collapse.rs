//! View-state for expanding and collapsing directory subtrees
//!
//! The controller is a per-directory two-state machine driven by discrete
//! [`ToggleMessage`]s. It never touches the tree or its geometry: renderers
//! ask it which subtrees are collapsed and which nodes are hidden.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tree::{Node, NodeId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollapseState {
    #[default]
    Expanded,
    Collapsed,
}

impl CollapseState {
    pub fn toggled(self) -> Self {
        match self {
            CollapseState::Expanded => CollapseState::Collapsed,
            CollapseState::Collapsed => CollapseState::Expanded,
        }
    }
}

/// A user action addressed to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "id", rename_all = "snake_case")]
pub enum ToggleMessage {
    Toggle(NodeId),
    Expand(NodeId),
    Collapse(NodeId),
    ExpandAll,
    CollapseAll,
}

#[derive(Debug, Clone, Copy)]
struct DirInfo {
    depth: usize,
    child_count: usize,
}

/// Collapse state for every directory of one scanned tree.
///
/// State is recorded per id and survives ancestor toggles: collapsing a
/// directory and expanding it again leaves every descendant exactly as it was.
#[derive(Debug, Clone, Default)]
pub struct CollapseController {
    directories: HashMap<NodeId, DirInfo>,
    parents: HashMap<NodeId, NodeId>,
    collapsed: HashSet<NodeId>,
}

impl CollapseController {
    /// Controller for `root` with every directory expanded.
    pub fn new(root: &Node) -> Self {
        let mut controller = Self::default();
        controller.index(root);
        controller
    }

    fn index(&mut self, root: &Node) {
        for node in root.walk() {
            if node.is_dir() {
                self.directories.insert(
                    node.id.clone(),
                    DirInfo {
                        depth: node.depth,
                        child_count: node.child_count,
                    },
                );
            }
            for child in node.children() {
                self.parents.insert(child.id.clone(), node.id.clone());
            }
        }
    }

    /// Drop all state and track a freshly scanned tree instead.
    pub fn reset(&mut self, root: &Node) {
        self.directories.clear();
        self.parents.clear();
        self.collapsed.clear();
        self.index(root);
    }

    /// State of a directory, or `None` for files and unknown ids.
    pub fn state(&self, id: &NodeId) -> Option<CollapseState> {
        self.directories.contains_key(id).then(|| {
            if self.collapsed.contains(id) {
                CollapseState::Collapsed
            } else {
                CollapseState::Expanded
            }
        })
    }

    pub fn is_collapsed(&self, id: &NodeId) -> bool {
        self.collapsed.contains(id)
    }

    /// Flip a directory's state. Returns the new state, or `None` (and does
    /// nothing) when `id` is not a directory.
    pub fn toggle(&mut self, id: &NodeId) -> Option<CollapseState> {
        let next = self.state(id)?.toggled();
        self.set(id, next);
        Some(next)
    }

    /// Set a directory's state; returns whether anything changed.
    pub fn set(&mut self, id: &NodeId, state: CollapseState) -> bool {
        if !self.directories.contains_key(id) {
            return false;
        }
        let changed = match state {
            CollapseState::Collapsed => self.collapsed.insert(id.clone()),
            CollapseState::Expanded => self.collapsed.remove(id),
        };
        if changed {
            debug!(id = %id, ?state, "collapse state changed");
        }
        changed
    }

    /// Apply one message; returns whether any state changed.
    pub fn apply(&mut self, message: &ToggleMessage) -> bool {
        match message {
            ToggleMessage::Toggle(id) => self.toggle(id).is_some(),
            ToggleMessage::Expand(id) => self.set(id, CollapseState::Expanded),
            ToggleMessage::Collapse(id) => self.set(id, CollapseState::Collapsed),
            ToggleMessage::ExpandAll => {
                let changed = !self.collapsed.is_empty();
                self.collapsed.clear();
                changed
            }
            ToggleMessage::CollapseAll => {
                let before = self.collapsed.len();
                self.collapsed.extend(self.directories.keys().cloned());
                self.collapsed.len() != before
            }
        }
    }

    /// A node is visible when none of its ancestors is collapsed. The node's
    /// own state only affects its descendants.
    pub fn is_visible(&self, id: &NodeId) -> bool {
        let mut current = self.parents.get(id);
        while let Some(parent) = current {
            if self.collapsed.contains(parent) {
                return false;
            }
            current = self.parents.get(parent);
        }
        true
    }

    /// Every node currently hidden by a collapsed ancestor, sorted.
    pub fn hidden_ids(&self) -> Vec<NodeId> {
        let mut hidden: Vec<NodeId> = self
            .parents
            .keys()
            .filter(|id| !self.is_visible(id))
            .cloned()
            .collect();
        hidden.sort();
        hidden
    }

    pub fn collapsed_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.collapsed.iter()
    }

    /// Collapse every non-empty directory at `depth` or deeper, so nothing
    /// below `depth` is shown. Returns how many directories changed.
    pub fn collapse_beyond_depth(&mut self, depth: usize) -> usize {
        let targets: Vec<NodeId> = self
            .directories
            .iter()
            .filter(|(_, info)| info.depth >= depth && info.child_count > 0)
            .map(|(id, _)| id.clone())
            .collect();
        self.collapse_all_of(targets)
    }

    /// Collapse every directory with more than `threshold` direct children.
    pub fn collapse_large(&mut self, threshold: usize) -> usize {
        let targets: Vec<NodeId> = self
            .directories
            .iter()
            .filter(|(_, info)| info.child_count > threshold)
            .map(|(id, _)| id.clone())
            .collect();
        self.collapse_all_of(targets)
    }

    fn collapse_all_of(&mut self, ids: Vec<NodeId>) -> usize {
        ids.into_iter()
            .filter(|id| self.set(id, CollapseState::Collapsed))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::tree::NodeStatus;

    fn dir(abs: &str, depth: usize, children: Vec<Node>) -> Node {
        let name = Path::new(abs).file_name().unwrap().to_string_lossy().into_owned();
        Node::directory(
            Path::new(abs),
            PathBuf::from(&name),
            name,
            depth,
            children,
            NodeStatus::Complete,
        )
    }

    fn file(abs: &str, depth: usize) -> Node {
        let name = Path::new(abs).file_name().unwrap().to_string_lossy().into_owned();
        Node::file(Path::new(abs), PathBuf::from(&name), name, 1, depth)
    }

    /// `A > {B > {b.txt}, C > {c.txt}, a.txt}`
    fn tree() -> Node {
        dir(
            "/A",
            0,
            vec![
                dir("/A/B", 1, vec![file("/A/B/b.txt", 2)]),
                dir("/A/C", 1, vec![file("/A/C/c.txt", 2)]),
                file("/A/a.txt", 1),
            ],
        )
    }

    fn id(s: &str) -> NodeId {
        NodeId::from(s)
    }

    #[test]
    fn test_default_is_expanded() {
        let c = CollapseController::new(&tree());
        assert_eq!(c.state(&id("/A")), Some(CollapseState::Expanded));
        assert_eq!(c.state(&id("/A/a.txt")), None);
        assert!(c.hidden_ids().is_empty());
    }

    #[test]
    fn test_toggle_on_file_is_noop() {
        let mut c = CollapseController::new(&tree());
        assert_eq!(c.toggle(&id("/A/a.txt")), None);
        assert!(!c.apply(&ToggleMessage::Collapse(id("/A/a.txt"))));
        assert_eq!(c.collapsed_ids().count(), 0);
    }

    #[test]
    fn test_collapse_hides_whole_subtree() {
        let mut c = CollapseController::new(&tree());
        c.toggle(&id("/A"));
        assert!(c.is_visible(&id("/A")));
        for hidden in ["/A/B", "/A/C", "/A/a.txt", "/A/B/b.txt", "/A/C/c.txt"] {
            assert!(!c.is_visible(&id(hidden)), "{hidden}");
        }
        assert_eq!(c.hidden_ids().len(), 5);
    }

    #[test]
    fn test_descendant_state_survives_ancestor_toggle() {
        let mut c = CollapseController::new(&tree());
        c.apply(&ToggleMessage::Collapse(id("/A/C")));
        c.apply(&ToggleMessage::Collapse(id("/A")));
        c.apply(&ToggleMessage::Expand(id("/A")));

        assert!(c.is_visible(&id("/A/B")));
        assert!(c.is_visible(&id("/A/C")));
        assert!(c.is_visible(&id("/A/B/b.txt")));
        assert!(!c.is_visible(&id("/A/C/c.txt")));
        assert_eq!(c.state(&id("/A/C")), Some(CollapseState::Collapsed));
    }

    #[test]
    fn test_siblings_are_independent() {
        let mut c = CollapseController::new(&tree());
        c.toggle(&id("/A/B"));
        assert_eq!(c.state(&id("/A/C")), Some(CollapseState::Expanded));
        assert!(c.is_visible(&id("/A/C/c.txt")));
        assert!(!c.is_visible(&id("/A/B/b.txt")));
    }

    #[test]
    fn test_bulk_helpers() {
        let mut c = CollapseController::new(&tree());
        assert_eq!(c.collapse_beyond_depth(1), 2);
        assert!(c.is_visible(&id("/A/B")));
        assert!(!c.is_visible(&id("/A/B/b.txt")));

        assert!(c.apply(&ToggleMessage::ExpandAll));
        assert_eq!(c.collapse_large(2), 1);
        assert!(c.is_collapsed(&id("/A")));

        assert!(c.apply(&ToggleMessage::CollapseAll));
        assert_eq!(c.collapsed_ids().count(), 3);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut c = CollapseController::new(&tree());
        c.toggle(&id("/A"));
        c.reset(&tree());
        assert_eq!(c.state(&id("/A")), Some(CollapseState::Expanded));
    }

    #[test]
    fn test_messages_deserialize() {
        let msg: ToggleMessage = serde_json::from_str(r#"{"action":"toggle","id":"/A/B"}"#).unwrap();
        assert_eq!(msg, ToggleMessage::Toggle(id("/A/B")));
        let all: ToggleMessage = serde_json::from_str(r#"{"action":"expand_all"}"#).unwrap();
        assert_eq!(all, ToggleMessage::ExpandAll);
    }
}
