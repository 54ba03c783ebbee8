//! Graphviz DOT output
//!
//! Nodes are pinned to their layout positions with `pos="x,y!"` so that
//! `neato -n` reproduces the computed layout; `dot` ignores the pins and uses
//! `rankdir=LR`.

use std::collections::HashMap;

use crate::error::RenderError;
use crate::tree::{NodeId, NodeStatus};

use super::Scene;
use super::utils::{label, num};

/// Escape a string for a double-quoted DOT attribute.
fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

pub(super) fn render(scene: &Scene<'_>) -> Result<String, RenderError> {
    let theme = &scene.config.theme;
    let height = scene.geometry.viewport.height;

    let mut out = format!("digraph \"{}\" {{\n", escape(scene.title()));
    out.push_str(&format!(
        "    graph [rankdir=LR, bgcolor=\"{}\"];\n",
        theme.background
    ));
    out.push_str(&format!(
        "    node [fontname=\"{}\", fontsize={}, fontcolor=\"{}\"];\n",
        escape(&theme.font_family),
        theme.font_size,
        theme.text
    ));
    out.push_str(&format!(
        "    edge [color=\"{}\", arrowhead=none];\n",
        theme.edge
    ));

    let mut ids: HashMap<&NodeId, String> = HashMap::new();
    for (index, node) in scene.root.walk().enumerate() {
        let id = format!("n{index}");
        let geometry = scene.geometry_of(node)?;
        // DOT's y axis points up
        let pos = format!(
            "{},{}!",
            num(geometry.position.x),
            num(height - geometry.position.y)
        );
        let attrs = if node.is_dir() {
            let (fill, stroke, style) = match node.status {
                NodeStatus::Complete => (&theme.directory_fill, &theme.directory_stroke, "filled,rounded"),
                _ => (&theme.partial_fill, &theme.partial_stroke, "filled,rounded,dashed"),
            };
            format!("shape=box, style=\"{style}\", fillcolor=\"{fill}\", color=\"{stroke}\"")
        } else {
            format!(
                "shape=ellipse, style=filled, fillcolor=\"{}\", color=\"{}\"",
                theme.file_fill, theme.file_stroke
            )
        };
        out.push_str(&format!(
            "    {id} [label=\"{}\", tooltip=\"{}\", {attrs}, pos=\"{pos}\"];\n",
            escape(&label(node, scene.config.show_sizes)),
            escape(node.id.as_str()),
        ));
        ids.insert(&node.id, id);
    }

    for node in scene.root.walk() {
        for child in node.children() {
            if let (Some(p), Some(c)) = (ids.get(&node.id), ids.get(&child.id)) {
                out.push_str(&format!("    {p} -> {c};\n"));
            }
        }
    }

    out.push_str("}\n");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_support::{dir, file, sample_tree};
    use crate::layout::{LayoutStrategy, Viewport, layout};
    use crate::output::OutputConfig;
    use crate::tree::Node;

    fn dot(root: &Node, strategy: LayoutStrategy) -> String {
        let geometry = layout(root, strategy, Viewport::new(400.0, 300.0)).unwrap();
        let config = OutputConfig::default();
        let scene = Scene {
            root,
            geometry: &geometry,
            config: &config,
            collapse: None,
        };
        render(&scene).unwrap()
    }

    #[test]
    fn test_digraph_structure() {
        let text = dot(&sample_tree(), LayoutStrategy::Tree);
        assert!(text.starts_with("digraph \"r\" {\n"));
        assert!(text.contains("rankdir=LR"));
        assert!(text.ends_with("}\n"));
        assert_eq!(text.matches(" -> ").count(), 7);
        assert_eq!(text.matches("shape=box").count(), 4);
        assert_eq!(text.matches("shape=ellipse").count(), 4);
        assert!(text.contains("    n0 -> n1;\n"));
    }

    #[test]
    fn test_root_pinned_at_flipped_position() {
        let root = sample_tree();
        let geometry = layout(&root, LayoutStrategy::Radial, Viewport::new(400.0, 300.0)).unwrap();
        let text = dot(&root, LayoutStrategy::Radial);
        let g = geometry.get(&root.id).unwrap();
        let expected = format!("pos=\"{},{}!\"", num(g.position.x), num(300.0 - g.position.y));
        assert!(text.contains(&expected), "{expected} not in\n{text}");
    }

    #[test]
    fn test_labels_are_escaped() {
        let root = dir("/r", 0, vec![file("/r", "a\"b\\c", 1, 1)]);
        let text = dot(&root, LayoutStrategy::Tree);
        assert!(text.contains("label=\"a\\\"b\\\\c\""));
    }
}
