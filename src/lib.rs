//! treeviz - scan a directory tree, lay it out and render it
//!
//! The pipeline has three stages that share one tree model:
//! [`TreeScanner`] builds a [`Node`] tree, [`LayoutEngine`] computes a
//! [`GeometryMap`] for it under a [`LayoutStrategy`], and [`Renderer`] turns
//! both into an [`Artifact`]. [`CollapseController`] holds the view state
//! for expanding and collapsing directories.

pub mod collapse;
pub mod error;
pub mod layout;
pub mod logging;
pub mod output;
pub mod settings;
pub mod stats;
pub mod tree;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use collapse::{CollapseController, CollapseState, ToggleMessage};
pub use error::{Error, LayoutError, RenderError, Result, ScanError, SettingsError};
pub use layout::{
    Extent, Geometry, GeometryMap, LayoutEngine, LayoutOptions, LayoutStrategy, Viewport, layout,
};
pub use output::{Artifact, DomPatch, OutputConfig, OutputFormat, Renderer, Theme, render};
pub use settings::Settings;
pub use stats::{StatsConfig, TreeStats, print_stats, print_stats_json};
pub use tree::{
    CancelFlag, FilterConfig, FlatTree, Node, NodeId, NodeKind, NodeStatus, PathFilter,
    ScanConfig, ScanOutcome, ScanReport, TreeScanner,
};
