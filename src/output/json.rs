//! D3-style hierarchical JSON export
//!
//! The document is an envelope with export metadata and a `tree` object in
//! the nested `{name, children}` shape `d3.hierarchy` consumes. Each node
//! also carries its aggregates and the geometry of the current layout.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::RenderError;
use crate::layout::{Geometry, LayoutStrategy, Viewport};
use crate::tree::{Node, NodeId, NodeKind, NodeStatus};

use super::Scene;

#[derive(Debug, Serialize)]
struct Export<'a> {
    metadata: Metadata<'a>,
    tree: JsonNode<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Metadata<'a> {
    exported_at: DateTime<Utc>,
    generator: &'static str,
    format: &'static str,
    title: &'a str,
    strategy: LayoutStrategy,
    viewport: Viewport,
    node_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonNode<'a> {
    id: &'a NodeId,
    name: &'a str,
    #[serde(rename = "type")]
    kind: NodeKind,
    path: String,
    depth: usize,
    size: u64,
    file_count: u64,
    dir_count: u64,
    child_count: usize,
    status: NodeStatus,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    collapsed: bool,
    geometry: &'a Geometry,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<Vec<JsonNode<'a>>>,
}

fn build<'a>(scene: &Scene<'a>, node: &'a Node) -> Result<JsonNode<'a>, RenderError> {
    let children = if node.is_dir() {
        Some(
            node.children()
                .iter()
                .map(|child| build(scene, child))
                .collect::<Result<Vec<_>, _>>()?,
        )
    } else {
        None
    };
    Ok(JsonNode {
        id: &node.id,
        name: &node.name,
        kind: node.kind,
        path: node.path.to_string_lossy().into_owned(),
        depth: node.depth,
        size: node.size,
        file_count: node.file_count,
        dir_count: node.dir_count,
        child_count: node.child_count,
        status: node.status,
        collapsed: scene.is_collapsed(node),
        geometry: scene.geometry_of(node)?,
        children,
    })
}

pub(super) fn render(scene: &Scene<'_>) -> Result<String, RenderError> {
    let export = Export {
        metadata: Metadata {
            exported_at: Utc::now(),
            generator: concat!("treeviz ", env!("CARGO_PKG_VERSION")),
            format: "d3-hierarchy",
            title: scene.title(),
            strategy: scene.geometry.strategy,
            viewport: scene.geometry.viewport,
            node_count: scene.root.node_count(),
        },
        tree: build(scene, scene.root)?,
    };
    Ok(serde_json::to_string_pretty(&export)?)
}
