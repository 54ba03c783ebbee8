//! In-memory tree model produced by the scanner

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Stable node identifier derived from the entry's absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn from_path(absolute: &Path) -> Self {
        Self(absolute.to_string_lossy().into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

/// How completely a directory's contents were enumerated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    #[default]
    Complete,
    /// Depth limit reached; contents were not listed.
    Truncated,
    /// Resolves to a directory already on the current path; not descended.
    CycleDetected,
    /// Listing the directory failed mid-scan.
    Unreadable,
}

impl NodeStatus {
    fn is_complete(&self) -> bool {
        matches!(self, NodeStatus::Complete)
    }
}

/// One filesystem entry with aggregate statistics over its subtree.
///
/// Directories are built through [`Node::directory`], which sorts the
/// children and computes `size`, `file_count` and `dir_count` from them, so a
/// `Node` always satisfies the aggregate invariants. File nodes never carry
/// children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    /// Path relative to the scan root (empty for the root itself).
    pub path: PathBuf,
    pub size: u64,
    pub depth: usize,
    pub child_count: usize,
    pub file_count: u64,
    pub dir_count: u64,
    #[serde(default, skip_serializing_if = "NodeStatus::is_complete")]
    pub status: NodeStatus,
    #[serde(default)]
    children: Vec<Node>,
}

impl Node {
    pub fn file(absolute: &Path, path: PathBuf, name: String, size: u64, depth: usize) -> Self {
        Self {
            id: NodeId::from_path(absolute),
            name,
            kind: NodeKind::File,
            path,
            size,
            depth,
            child_count: 0,
            file_count: 0,
            dir_count: 0,
            status: NodeStatus::Complete,
            children: Vec::new(),
        }
    }

    /// Build a directory node. Children are sorted and aggregates computed
    /// from them exactly once, after the full child list is known.
    pub fn directory(
        absolute: &Path,
        path: PathBuf,
        name: String,
        depth: usize,
        mut children: Vec<Node>,
        status: NodeStatus,
    ) -> Self {
        children.sort_by(entry_order);

        let mut size = 0u64;
        let mut file_count = 0u64;
        let mut dir_count = 0u64;
        for child in &children {
            size += child.size;
            match child.kind {
                NodeKind::File => file_count += 1,
                NodeKind::Directory => {
                    file_count += child.file_count;
                    dir_count += 1 + child.dir_count;
                }
            }
        }

        Self {
            id: NodeId::from_path(absolute),
            name,
            kind: NodeKind::Directory,
            path,
            size,
            depth,
            child_count: children.len(),
            file_count,
            dir_count,
            status,
            children,
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory)
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self.status, NodeStatus::Truncated)
    }

    pub fn is_cycle(&self) -> bool {
        matches!(self.status, NodeStatus::CycleDetected)
    }

    /// Pre-order iterator over this node and all descendants.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Number of nodes in the subtree rooted here, including this one.
    pub fn node_count(&self) -> usize {
        self.walk().count()
    }

    pub fn max_depth(&self) -> usize {
        self.walk().map(|n| n.depth).max().unwrap_or(self.depth)
    }

    pub fn find(&self, id: &NodeId) -> Option<&Node> {
        self.walk().find(|n| &n.id == id)
    }

    /// Whether any node in the subtree was truncated, cycle-cut or unreadable.
    pub fn is_partial(&self) -> bool {
        self.walk().any(|n| !n.status.is_complete())
    }
}

pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Directories first, then case-insensitive name, then exact name so the
/// order is total and identical across scans.
pub fn entry_order(a: &Node, b: &Node) -> Ordering {
    match (a.kind, b.kind) {
        (NodeKind::Directory, NodeKind::File) => Ordering::Less,
        (NodeKind::File, NodeKind::Directory) => Ordering::Greater,
        _ => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(parent: &str, name: &str, size: u64, depth: usize) -> Node {
        let abs = Path::new(parent).join(name);
        Node::file(&abs, PathBuf::from(name), name.to_string(), size, depth)
    }

    #[test]
    fn test_directory_aggregates_from_children() {
        let src = Node::directory(
            Path::new("/r/src"),
            PathBuf::from("src"),
            "src".to_string(),
            1,
            vec![file("/r/src", "main.rs", 100, 2)],
            NodeStatus::Complete,
        );
        let root = Node::directory(
            Path::new("/r"),
            PathBuf::new(),
            "r".to_string(),
            0,
            vec![file("/r", "README.md", 50, 1), src],
            NodeStatus::Complete,
        );

        assert_eq!(root.size, 150);
        assert_eq!(root.file_count, 2);
        assert_eq!(root.dir_count, 1);
        assert_eq!(root.child_count, 2);
        assert_eq!(root.node_count(), 4);
        assert_eq!(root.max_depth(), 2);
    }

    #[test]
    fn test_directories_sort_before_files_case_insensitive() {
        let children = vec![
            file("/r", "b.txt", 1, 1),
            file("/r", "A.txt", 1, 1),
            Node::directory(
                Path::new("/r/zeta"),
                PathBuf::from("zeta"),
                "zeta".to_string(),
                1,
                Vec::new(),
                NodeStatus::Complete,
            ),
            file("/r", "a.txt", 1, 1),
        ];
        let root = Node::directory(
            Path::new("/r"),
            PathBuf::new(),
            "r".to_string(),
            0,
            children,
            NodeStatus::Complete,
        );
        let names: Vec<&str> = root.children().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "A.txt", "a.txt", "b.txt"]);
    }

    #[test]
    fn test_walk_is_preorder() {
        let inner = Node::directory(
            Path::new("/r/d"),
            PathBuf::from("d"),
            "d".to_string(),
            1,
            vec![file("/r/d", "x", 1, 2)],
            NodeStatus::Complete,
        );
        let root = Node::directory(
            Path::new("/r"),
            PathBuf::new(),
            "r".to_string(),
            0,
            vec![file("/r", "y", 1, 1), inner],
            NodeStatus::Complete,
        );
        let order: Vec<&str> = root.walk().map(|n| n.name.as_str()).collect();
        assert_eq!(order, vec!["r", "d", "x", "y"]);
    }

    #[test]
    fn test_serde_skips_complete_status() {
        let node = file("/r", "a.txt", 3, 1);
        let json = serde_json::to_value(&node).unwrap();
        assert!(json.get("status").is_none());
        assert_eq!(json["fileCount"], 0);

        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }
}
