//! Spatial layout of a scanned tree
//!
//! A layout pass reads a `Node` tree and produces a fresh `GeometryMap`; the
//! tree itself is never modified, so one scan can be laid out repeatedly with
//! different strategies and viewports.
//!
//! # Module Structure
//!
//! - `geometry` - Viewport, point, rectangle, extent and per-node geometry types
//! - `tree` / `radial` - hierarchical layouts with subtree-aware spacing
//! - `treemap` / `sunburst` - area and angle partitions weighted by size
//! - `force` - bounded force-directed simulation
//! - `galaxy` - logarithmic spiral arms

mod force;
mod galaxy;
mod geometry;
mod radial;
mod sunburst;
mod tree;
mod treemap;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::LayoutError;
use crate::tree::{FlatTree, Node};

pub use force::ForceParams;
pub use geometry::{
    AngleRange, EPSILON, Extent, Geometry, GeometryMap, Point, Rect, Viewport, sector_bounds,
};

/// Closed set of layout strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutStrategy {
    #[default]
    Tree,
    Radial,
    Treemap,
    Sunburst,
    Force,
    Galaxy,
}

impl LayoutStrategy {
    pub const ALL: [LayoutStrategy; 6] = [
        LayoutStrategy::Tree,
        LayoutStrategy::Radial,
        LayoutStrategy::Treemap,
        LayoutStrategy::Sunburst,
        LayoutStrategy::Force,
        LayoutStrategy::Galaxy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutStrategy::Tree => "tree",
            LayoutStrategy::Radial => "radial",
            LayoutStrategy::Treemap => "treemap",
            LayoutStrategy::Sunburst => "sunburst",
            LayoutStrategy::Force => "force",
            LayoutStrategy::Galaxy => "galaxy",
        }
    }

    /// Strategies that place children inside the parent's geometry. Force and
    /// galaxy positions are free; their bounds only enclose the subtree after
    /// the fact.
    pub fn guarantees_containment(&self) -> bool {
        matches!(
            self,
            LayoutStrategy::Tree
                | LayoutStrategy::Radial
                | LayoutStrategy::Treemap
                | LayoutStrategy::Sunburst
        )
    }
}

impl fmt::Display for LayoutStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tree" => Ok(LayoutStrategy::Tree),
            "radial" => Ok(LayoutStrategy::Radial),
            "treemap" => Ok(LayoutStrategy::Treemap),
            "sunburst" => Ok(LayoutStrategy::Sunburst),
            "force" => Ok(LayoutStrategy::Force),
            "galaxy" | "spiral" => Ok(LayoutStrategy::Galaxy),
            _ => Err(format!(
                "unknown layout '{}' (expected one of: tree, radial, treemap, sunburst, force, galaxy)",
                s
            )),
        }
    }
}

/// Tunables shared by all strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Blank border kept around the drawing, in layout units.
    pub margin: f64,
    /// Number of spiral arms in the galaxy layout.
    pub arm_count: usize,
    pub force: ForceParams,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            margin: 20.0,
            arm_count: 4,
            force: ForceParams::default(),
        }
    }
}

/// Output of a strategy for one node, indexed like the [`FlatTree`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct Placement {
    pub position: Point,
    pub extent: Extent,
    pub bounds: Rect,
    pub angle_range: Option<AngleRange>,
}

impl Placement {
    fn circle(position: Point, radius: f64) -> Self {
        Self {
            position,
            extent: Extent::Radius { radius },
            bounds: Rect::around(position, radius, radius),
            angle_range: None,
        }
    }
}

/// Computes geometry for a tree under a chosen strategy.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    options: LayoutOptions,
}

impl LayoutEngine {
    pub fn new(options: LayoutOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn layout(
        &self,
        root: &Node,
        strategy: LayoutStrategy,
        viewport: Viewport,
    ) -> Result<GeometryMap, LayoutError> {
        self.layout_flat(&FlatTree::new(root), strategy, viewport)
    }

    /// Lay out an already flattened tree.
    pub fn layout_flat(
        &self,
        flat: &FlatTree<'_>,
        strategy: LayoutStrategy,
        viewport: Viewport,
    ) -> Result<GeometryMap, LayoutError> {
        if !viewport.is_valid() {
            return Err(LayoutError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        if flat.is_empty() {
            return Err(LayoutError::EmptyTree);
        }
        if let Some(id) = flat.duplicate_id() {
            return Err(LayoutError::DuplicateId(id.to_string()));
        }

        let margin = self
            .options
            .margin
            .clamp(0.0, viewport.width.min(viewport.height) / 4.0);
        let area = viewport.rect().inset(margin);
        debug!(%strategy, nodes = flat.len(), "computing layout");

        let mut placements = match strategy {
            LayoutStrategy::Tree => tree::place(flat, area),
            LayoutStrategy::Radial => radial::place(flat, area),
            LayoutStrategy::Treemap => treemap::place(flat, area),
            LayoutStrategy::Sunburst => sunburst::place(flat, area),
            LayoutStrategy::Force => force::place(flat, area, &self.options.force),
            LayoutStrategy::Galaxy => galaxy::place(flat, area, self.options.arm_count),
        };
        enclose_subtrees(flat, &mut placements);

        let mut map = GeometryMap::new(strategy, viewport, area.center());
        for (entry, placement) in flat.iter().zip(&placements) {
            map.insert(
                entry.node.id.clone(),
                Geometry {
                    position: placement.position,
                    extent: placement.extent,
                    bounds: placement.bounds,
                    angle_range: placement.angle_range,
                },
            );
        }
        map.edges = flat
            .edges()
            .map(|(p, c)| (flat.node(p).id.clone(), flat.node(c).id.clone()))
            .collect();

        info!(%strategy, nodes = map.len(), edges = map.edges.len(), "layout complete");
        Ok(map)
    }
}

/// Lay out `root` with default options.
pub fn layout(
    root: &Node,
    strategy: LayoutStrategy,
    viewport: Viewport,
) -> Result<GeometryMap, LayoutError> {
    LayoutEngine::default().layout(root, strategy, viewport)
}

/// Grow every node's bounds to cover its descendants'. Children follow their
/// parent in pre-order, so one reverse pass reaches every ancestor.
fn enclose_subtrees(flat: &FlatTree<'_>, placements: &mut [Placement]) {
    for idx in (1..placements.len()).rev() {
        if let Some(parent) = flat.parent(idx) {
            let child = placements[idx].bounds;
            placements[parent].bounds = placements[parent].bounds.union(&child);
        }
    }
}

/// Deepest level below each node, relative to the root (pre-order indexed).
fn subtree_depths(flat: &FlatTree<'_>) -> Vec<usize> {
    let mut deepest: Vec<usize> = flat.iter().map(|e| e.node.depth).collect();
    for idx in (1..flat.len()).rev() {
        if let Some(parent) = flat.parent(idx) {
            deepest[parent] = deepest[parent].max(deepest[idx]);
        }
    }
    deepest
}

/// Relative layout weight of each node: its size, or its subtree node count
/// when a sibling group has no size at all.
fn sibling_weights(flat: &FlatTree<'_>, children: &[usize]) -> Vec<f64> {
    let total: u64 = children.iter().map(|&c| flat.node(c).size).sum();
    children
        .iter()
        .map(|&c| {
            let node = flat.node(c);
            if total > 0 {
                node.size as f64
            } else {
                node.node_count() as f64
            }
        })
        .collect()
}
