//! Rendering of laid-out trees
//!
//! This module turns a tree plus its `GeometryMap` into an output artifact:
//! - Interactive SVG (nested groups with a click-to-collapse script)
//! - Static SVG (same markup, no script)
//! - draw.io diagram, deflated and base64/percent-encoded
//! - Live DOM patches for incremental re-rendering
//! - JSON, Mermaid and Graphviz DOT exports
//!
//! # Module Structure
//!
//! - `config` - Output configuration and theme
//! - `utils` - XML escaping, labels and number formatting
//! - `svg` - SVG formatter
//! - `drawio` - draw.io encoder and decoder
//! - `dom` - DOM patch reconciler
//! - `json` - D3-style JSON export
//! - `mermaid` - Mermaid flowchart export
//! - `dot` - Graphviz export

mod config;
mod dom;
mod dot;
mod drawio;
mod json;
mod mermaid;
mod svg;
mod utils;

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::collapse::CollapseController;
use crate::error::RenderError;
use crate::layout::{Geometry, GeometryMap};
use crate::tree::Node;

// Re-export public types and functions
pub use config::{OutputConfig, Theme};
pub use dom::{DomPatch, DomReconciler};
pub use drawio::{
    DecodedDiagram, DecodedNode, decode_drawio, decode_payload, drawio_url, encode_payload,
};
pub use utils::{xml_escape, xml_unescape};

/// Closed set of output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    InteractiveSvg,
    StaticSvg,
    Drawio,
    LiveDom,
    Json,
    Mermaid,
    Dot,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 7] = [
        OutputFormat::InteractiveSvg,
        OutputFormat::StaticSvg,
        OutputFormat::Drawio,
        OutputFormat::LiveDom,
        OutputFormat::Json,
        OutputFormat::Mermaid,
        OutputFormat::Dot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::InteractiveSvg => "svg",
            OutputFormat::StaticSvg => "static-svg",
            OutputFormat::Drawio => "drawio",
            OutputFormat::LiveDom => "dom",
            OutputFormat::Json => "json",
            OutputFormat::Mermaid => "mermaid",
            OutputFormat::Dot => "dot",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            OutputFormat::InteractiveSvg | OutputFormat::StaticSvg => "image/svg+xml",
            OutputFormat::Drawio => "text/plain",
            OutputFormat::LiveDom | OutputFormat::Json => "application/json",
            OutputFormat::Mermaid => "text/vnd.mermaid",
            OutputFormat::Dot => "text/vnd.graphviz",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "svg" | "interactive-svg" => Ok(OutputFormat::InteractiveSvg),
            "static-svg" => Ok(OutputFormat::StaticSvg),
            "drawio" | "draw.io" => Ok(OutputFormat::Drawio),
            "dom" | "live-dom" => Ok(OutputFormat::LiveDom),
            "json" => Ok(OutputFormat::Json),
            "mermaid" | "mmd" => Ok(OutputFormat::Mermaid),
            "dot" | "graphviz" => Ok(OutputFormat::Dot),
            _ => Err(format!(
                "unknown format '{}' (expected one of: svg, static-svg, drawio, dom, json, mermaid, dot)",
                s
            )),
        }
    }
}

/// Result of a render call.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    /// A serialized document.
    Document {
        media_type: &'static str,
        content: String,
    },
    /// DOM mutations for a live view, in application order.
    Patches(Vec<DomPatch>),
}

impl Artifact {
    /// Text of a document artifact.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Artifact::Document { content, .. } => Some(content),
            Artifact::Patches(_) => None,
        }
    }

    /// Write the artifact; patches are written one JSON object per line.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self {
            Artifact::Document { content, .. } => {
                out.write_all(content.as_bytes())?;
                if !content.ends_with('\n') {
                    out.write_all(b"\n")?;
                }
            }
            Artifact::Patches(patches) => {
                for patch in patches {
                    serde_json::to_writer(&mut *out, patch)?;
                    out.write_all(b"\n")?;
                }
            }
        }
        Ok(())
    }
}

/// Everything a formatter reads: the tree, its geometry and view settings.
pub(crate) struct Scene<'a> {
    pub root: &'a Node,
    pub geometry: &'a GeometryMap,
    pub config: &'a OutputConfig,
    pub collapse: Option<&'a CollapseController>,
}

impl<'a> Scene<'a> {
    pub fn geometry_of(&self, node: &Node) -> Result<&'a Geometry, RenderError> {
        self.geometry
            .get(&node.id)
            .ok_or_else(|| missing_geometry(node))
    }

    pub fn is_collapsed(&self, node: &Node) -> bool {
        self.collapse.is_some_and(|c| c.is_collapsed(&node.id))
    }

    pub fn title(&self) -> &str {
        self.config.title.as_deref().unwrap_or(&self.root.name)
    }
}

fn missing_geometry(node: &Node) -> RenderError {
    RenderError::MissingGeometry {
        id: node.id.to_string(),
        path: node.path.clone(),
    }
}

/// Fail on the first node (in pre-order) that has no geometry.
pub fn check_coverage(root: &Node, geometry: &GeometryMap) -> Result<(), RenderError> {
    match root.walk().find(|n| !geometry.contains(&n.id)) {
        Some(node) => Err(missing_geometry(node)),
        None => Ok(()),
    }
}

/// Produces artifacts from a tree and its geometry. Read-only over both, so
/// one renderer can serve several formats concurrently.
#[derive(Debug, Clone, Default)]
pub struct Renderer<'c> {
    config: OutputConfig,
    collapse: Option<&'c CollapseController>,
}

impl<'c> Renderer<'c> {
    pub fn new(config: OutputConfig) -> Self {
        Self {
            config,
            collapse: None,
        }
    }

    /// Render with the given collapse state applied to SVG output.
    pub fn with_collapse(mut self, collapse: &'c CollapseController) -> Self {
        self.collapse = Some(collapse);
        self
    }

    pub fn render(
        &self,
        root: &Node,
        geometry: &GeometryMap,
        format: OutputFormat,
    ) -> Result<Artifact, RenderError> {
        check_coverage(root, geometry)?;
        let scene = Scene {
            root,
            geometry,
            config: &self.config,
            collapse: self.collapse,
        };

        let artifact = match format {
            OutputFormat::InteractiveSvg => document(format, svg::render(&scene, true)?),
            OutputFormat::StaticSvg => document(format, svg::render(&scene, false)?),
            OutputFormat::Drawio => {
                let xml = drawio::render_xml(&scene)?;
                document(format, drawio::encode_payload(&xml)?)
            }
            OutputFormat::LiveDom => {
                let mut reconciler = DomReconciler::new();
                let mut patches = reconciler.reconcile(root, geometry)?;
                if let Some(collapse) = self.collapse {
                    patches.extend(reconciler.sync_visibility(collapse));
                }
                Artifact::Patches(patches)
            }
            OutputFormat::Json => document(format, json::render(&scene)?),
            OutputFormat::Mermaid => document(format, mermaid::render(&scene)),
            OutputFormat::Dot => document(format, dot::render(&scene)?),
        };
        info!(%format, strategy = %geometry.strategy, "render complete");
        Ok(artifact)
    }
}

fn document(format: OutputFormat, content: String) -> Artifact {
    Artifact::Document {
        media_type: format.media_type(),
        content,
    }
}

/// Render with default configuration and no collapse state.
pub fn render(
    root: &Node,
    geometry: &GeometryMap,
    format: OutputFormat,
) -> Result<Artifact, RenderError> {
    Renderer::default().render(root, geometry, format)
}
