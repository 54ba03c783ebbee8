//! Directory tree scanning
//!
//! This module turns a directory on disk into an in-memory `Node` tree:
//!
//! - `PathFilter`: decides which entries are part of the tree
//! - `TreeScanner`: walks the root, detects cycles, honors the depth limit and
//!   computes per-directory aggregates
//! - `FlatTree`: index-addressed pre-order view used by the layout engine

mod arena;
mod config;
mod filter;
mod node;
mod utils;
mod walker;

// Re-export public types
pub use arena::{FlatEntry, FlatTree};
pub use config::{DEFAULT_EXCLUDED_NAMES, DEFAULT_MAX_DEPTH, FilterConfig, ScanConfig};
pub use filter::PathFilter;
pub use node::{Node, NodeId, NodeKind, NodeStatus, Walk, entry_order};
pub use utils::format_size;
pub use walker::{CancelFlag, ScanOutcome, ScanReport, SkippedEntry, TreeScanner};
