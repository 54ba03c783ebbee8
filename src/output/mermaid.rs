//! Mermaid flowchart output
//!
//! Produces a `graph LR` flowchart with one node per entry: directories as
//! `id["name/"]:::directory`, files as `id("name"):::file`, linked with
//! undirected `---` edges. Directories that could not be listed get a
//! "Permission Denied" child in the `error` class.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::tree::{Node, NodeStatus};

use super::Scene;
use super::utils::label;

static ID_UNSAFE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("ID_UNSAFE regex is invalid"));

const CLASS_DEFS: [&str; 4] = [
    "classDef default stroke:#333,stroke-width:1px",
    "classDef directory fill:#e3f2fd,stroke:#1565c0,stroke-width:2px",
    "classDef file fill:#f5f5f5,stroke:#616161,stroke-width:1px",
    "classDef error fill:#fee,stroke:#c00,stroke-width:1px",
];

/// Flowchart keywords that cannot stand alone as node ids.
const RESERVED_IDS: [&str; 12] = [
    "end", "graph", "flowchart", "subgraph", "direction", "style", "linkstyle", "class",
    "classdef", "click", "call", "href",
];

/// Turn an entry name into a Mermaid node id.
pub fn sanitize_id(name: &str) -> String {
    let id = ID_UNSAFE.replace_all(&name.replace('@', "at"), "_").into_owned();
    match id.chars().next() {
        None => "root".to_string(),
        Some(c) if c.is_ascii_digit() => format!("n{id}"),
        Some(_) if RESERVED_IDS.contains(&id.to_ascii_lowercase().as_str()) => format!("n{id}"),
        Some(_) => id,
    }
}

/// Quote a label; Mermaid has no backslash escapes inside strings.
fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "#quot;"))
}

/// Mermaid formatter - walks the tree in pre-order, one line per node and edge.
pub struct MermaidFormatter {
    show_sizes: bool,
    used: HashSet<String>,
    counter: usize,
    output: String,
}

impl MermaidFormatter {
    pub fn new(show_sizes: bool) -> Self {
        Self {
            show_sizes,
            used: HashSet::new(),
            counter: 0,
            output: "graph LR\n".to_string(),
        }
    }

    fn unique_id(&mut self, name: &str) -> String {
        let base = sanitize_id(name);
        let mut id = base.clone();
        while self.used.contains(&id) {
            id = format!("{base}_{}", self.counter);
            self.counter += 1;
        }
        self.counter += 1;
        self.used.insert(id.clone());
        id
    }

    fn line(&mut self, text: &str) {
        self.output.push_str("    ");
        self.output.push_str(text);
        self.output.push('\n');
    }

    pub fn format_node(&mut self, node: &Node, parent: Option<&str>) {
        let id = self.unique_id(&node.name);
        let text = label(node, self.show_sizes);
        if node.is_dir() {
            self.line(&format!("{id}[{}]:::directory", quote(&format!("{text}/"))));
        } else {
            self.line(&format!("{id}({}):::file", quote(&text)));
        }
        if let Some(parent) = parent {
            self.line(&format!("{parent} --- {id}"));
        }

        if node.status == NodeStatus::Unreadable {
            let denied = self.unique_id(&format!("{id}_denied"));
            self.line(&format!("{denied}[\"Permission Denied\"]:::error"));
            self.line(&format!("{id} --- {denied}"));
        }

        for child in node.children() {
            self.format_node(child, Some(&id));
        }
    }

    /// Append the class definitions and return the diagram.
    pub fn into_output(mut self) -> String {
        self.line("%% Styling");
        for def in CLASS_DEFS {
            self.line(def);
        }
        self.output
    }
}

pub(super) fn render(scene: &Scene<'_>) -> String {
    let mut formatter = MermaidFormatter::new(scene.config.show_sizes);
    formatter.format_node(scene.root, None);
    formatter.into_output()
}
