//! draw.io (mxGraph) export and import
//!
//! The diagram is an `mxGraphModel` document with one vertex per node and one
//! edge per parent-child pair. Vertices are wrapped in `<object>` elements that
//! carry the node id, path and kind, so a decoded diagram can be matched back
//! against the tree. The encoded payload is raw DEFLATE, then standard base64,
//! then percent-encoding, which is what `app.diagrams.net/#R...` accepts.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::LazyLock;

use base64::{Engine as _, engine::general_purpose};
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use regex::Regex;

use crate::error::RenderError;
use crate::tree::{Node, NodeId, NodeKind, NodeStatus};

use super::Scene;
use super::utils::{label, num, xml_escape, xml_unescape};

const BOX_HEIGHT: f64 = 32.0;

static OBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<object\s([^>]*)>\s*<mxCell\s[^>]*>\s*<mxGeometry\s([^>]*)/>"#)
        .expect("OBJECT_RE regex is invalid")
});
static EDGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<mxCell\s([^>]*\bedge="1"[^>]*)>"#)
        .expect("EDGE_RE regex is invalid")
});
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_][\w.-]*)="([^"]*)""#)
        .expect("ATTR_RE regex is invalid")
});

/// Width of a vertex box for a label, as the draw.io mapper sizes them.
fn box_width(label: &str) -> f64 {
    (label.chars().count() as f64 * 12.0 + 32.0).max(80.0)
}

fn vertex_style(scene: &Scene<'_>, node: &Node) -> String {
    let theme = &scene.config.theme;
    let (fill, stroke, extra) = match (node.kind, node.status) {
        (NodeKind::Directory, NodeStatus::Complete) => {
            (&theme.directory_fill, &theme.directory_stroke, "rounded=1;fontStyle=1;")
        }
        (NodeKind::Directory, _) => (&theme.partial_fill, &theme.partial_stroke, "rounded=1;dashed=1;"),
        (NodeKind::File, _) => (&theme.file_fill, &theme.file_stroke, "rounded=0;"),
    };
    format!(
        "{extra}whiteSpace=wrap;html=1;fillColor={fill};strokeColor={stroke};fontColor={};",
        theme.text
    )
}

/// Build the uncompressed `mxGraphModel` XML.
pub(super) fn render_xml(scene: &Scene<'_>) -> Result<String, RenderError> {
    let viewport = scene.geometry.viewport;
    let mut xml = format!(
        "<mxGraphModel dx=\"0\" dy=\"0\" grid=\"0\" guides=\"1\" tooltips=\"1\" connect=\"1\" arrows=\"0\" fold=\"1\" page=\"0\" pageScale=\"1\" pageWidth=\"{}\" pageHeight=\"{}\" background=\"{}\">\n<root>\n",
        num(viewport.width),
        num(viewport.height),
        scene.config.theme.background
    );
    xml.push_str("<mxCell id=\"0\"/>\n<mxCell id=\"1\" parent=\"0\"/>\n");

    // Cell ids 0 and 1 are the mxGraph root and default layer
    let mut cells: HashMap<&NodeId, usize> = HashMap::new();
    for (offset, node) in scene.root.walk().enumerate() {
        let cell = offset + 2;
        cells.insert(&node.id, cell);

        let geometry = scene.geometry_of(node)?;
        let text = label(node, scene.config.show_sizes);
        let width = box_width(&text);
        let kind = match node.kind {
            NodeKind::File => "file",
            NodeKind::Directory => "directory",
        };
        xml.push_str(&format!(
            "<object id=\"{cell}\" label=\"{}\" treeviz_id=\"{}\" treeviz_path=\"{}\" treeviz_kind=\"{kind}\">",
            xml_escape(&text),
            xml_escape(node.id.as_str()),
            xml_escape(&node.path.to_string_lossy()),
        ));
        xml.push_str(&format!(
            "<mxCell style=\"{}\" vertex=\"1\" parent=\"1\">",
            xml_escape(&vertex_style(scene, node))
        ));
        xml.push_str(&format!(
            "<mxGeometry x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" as=\"geometry\"/>",
            num(geometry.position.x - width / 2.0),
            num(geometry.position.y - BOX_HEIGHT / 2.0),
            num(width),
            num(BOX_HEIGHT)
        ));
        xml.push_str("</mxCell></object>\n");
    }

    let edge_style = format!(
        "endArrow=none;html=1;strokeColor={};",
        scene.config.theme.edge
    );
    for (parent, child) in &scene.geometry.edges {
        let (Some(p), Some(c)) = (cells.get(parent), cells.get(child)) else {
            continue;
        };
        xml.push_str(&format!(
            "<mxCell id=\"e{p}_{c}\" edge=\"1\" parent=\"1\" source=\"{p}\" target=\"{c}\" style=\"{}\"><mxGeometry relative=\"1\" as=\"geometry\"/></mxCell>\n",
            xml_escape(&edge_style)
        ));
    }

    xml.push_str("</root>\n</mxGraphModel>\n");
    Ok(xml)
}

/// Compress and encode diagram XML for transport in a URL fragment.
pub fn encode_payload(xml: &str) -> Result<String, RenderError> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(xml.as_bytes())?;
    let compressed = encoder.finish()?;
    let b64 = general_purpose::STANDARD.encode(&compressed);
    Ok(urlencoding::encode(&b64).into_owned())
}

/// Reverse [`encode_payload`].
pub fn decode_payload(encoded: &str) -> Result<String, RenderError> {
    let b64 = urlencoding::decode(encoded.trim())
        .map_err(|e| RenderError::Decode(format!("invalid percent-encoding: {e}")))?;
    let compressed = general_purpose::STANDARD
        .decode(b64.as_bytes())
        .map_err(|e| RenderError::Decode(format!("invalid base64: {e}")))?;
    let mut xml = String::new();
    DeflateDecoder::new(compressed.as_slice())
        .read_to_string(&mut xml)
        .map_err(|e| RenderError::Decode(format!("invalid deflate stream: {e}")))?;
    Ok(xml)
}

/// Link that opens an encoded diagram in the draw.io web app.
pub fn drawio_url(encoded: &str) -> String {
    format!("https://app.diagrams.net/?splash=0&libs=general;uml#R{}", encoded)
}

/// One vertex recovered from a diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedNode {
    pub cell: String,
    pub id: NodeId,
    pub label: String,
    pub path: String,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DecodedNode {
    /// Center of the vertex box, matching the layout position it was drawn at.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Hierarchy recovered from an encoded diagram.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedDiagram {
    /// Vertices in document order (pre-order of the source tree).
    pub nodes: Vec<DecodedNode>,
    /// Parent-child pairs of vertex cell ids.
    pub edges: Vec<(String, String)>,
}

impl DecodedDiagram {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, cell: &str) -> Option<&DecodedNode> {
        self.nodes.iter().find(|n| n.cell == cell)
    }

    /// Edges expressed as node ids instead of cell ids.
    pub fn id_edges(&self) -> Vec<(NodeId, NodeId)> {
        let by_cell: HashMap<&str, &NodeId> =
            self.nodes.iter().map(|n| (n.cell.as_str(), &n.id)).collect();
        self.edges
            .iter()
            .filter_map(|(s, t)| {
                let source = by_cell.get(s.as_str())?;
                let target = by_cell.get(t.as_str())?;
                Some(((*source).clone(), (*target).clone()))
            })
            .collect()
    }

    /// Vertex without an incoming edge.
    pub fn root(&self) -> Option<&DecodedNode> {
        self.nodes
            .iter()
            .find(|n| !self.edges.iter().any(|(_, t)| *t == n.cell))
    }

    pub fn children_of(&self, cell: &str) -> Vec<&DecodedNode> {
        self.edges
            .iter()
            .filter(|(s, _)| s == cell)
            .filter_map(|(_, t)| self.node(t))
            .collect()
    }
}

fn attributes(raw: &str) -> HashMap<String, String> {
    ATTR_RE
        .captures_iter(raw)
        .map(|c| (c[1].to_string(), xml_unescape(&c[2])))
        .collect()
}

fn number(attrs: &HashMap<String, String>, key: &str) -> Result<f64, RenderError> {
    attrs
        .get(key)
        .ok_or_else(|| RenderError::Decode(format!("vertex is missing '{key}'")))?
        .parse()
        .map_err(|_| RenderError::Decode(format!("'{key}' is not a number")))
}

fn required(attrs: &mut HashMap<String, String>, key: &str) -> Result<String, RenderError> {
    attrs
        .remove(key)
        .ok_or_else(|| RenderError::Decode(format!("vertex is missing '{key}'")))
}

/// Parse `mxGraphModel` XML produced by this module.
pub fn parse_xml(xml: &str) -> Result<DecodedDiagram, RenderError> {
    if !xml.contains("<mxGraphModel") {
        return Err(RenderError::Decode("not an mxGraphModel document".to_string()));
    }
    let mut diagram = DecodedDiagram::default();

    for caps in OBJECT_RE.captures_iter(xml) {
        let mut attrs = attributes(&caps[1]);
        let geometry = attributes(&caps[2]);
        let kind = match required(&mut attrs, "treeviz_kind")?.as_str() {
            "directory" => NodeKind::Directory,
            "file" => NodeKind::File,
            other => return Err(RenderError::Decode(format!("unknown node kind '{other}'"))),
        };
        diagram.nodes.push(DecodedNode {
            cell: required(&mut attrs, "id")?,
            id: NodeId::from(required(&mut attrs, "treeviz_id")?.as_str()),
            label: required(&mut attrs, "label")?,
            path: required(&mut attrs, "treeviz_path")?,
            kind,
            x: number(&geometry, "x")?,
            y: number(&geometry, "y")?,
            width: number(&geometry, "width")?,
            height: number(&geometry, "height")?,
        });
    }

    for caps in EDGE_RE.captures_iter(xml) {
        let mut attrs = attributes(&caps[1]);
        let source = attrs
            .remove("source")
            .ok_or_else(|| RenderError::Decode("edge without source".to_string()))?;
        let target = attrs
            .remove("target")
            .ok_or_else(|| RenderError::Decode("edge without target".to_string()))?;
        diagram.edges.push((source, target));
    }

    Ok(diagram)
}

/// Decode an encoded payload back into its hierarchy.
pub fn decode_drawio(encoded: &str) -> Result<DecodedDiagram, RenderError> {
    parse_xml(&decode_payload(encoded)?)
}
