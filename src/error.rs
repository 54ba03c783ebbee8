//! Error types for scanning, layout and rendering
//!
//! Only failures that abort a whole call live here. Per-entry problems found
//! while scanning are recorded on the tree (`NodeStatus`) and in the
//! `ScanReport` instead of being returned as errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal scan failures. Only the root can produce one of these.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot access '{}': No such file or directory", .0.display())]
    RootNotFound(PathBuf),

    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("cannot read '{}': {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("scan of '{}' was cancelled", .0.display())]
    Cancelled(PathBuf),
}

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("invalid viewport {width}x{height}: width and height must be positive")]
    InvalidViewport { width: f64, height: f64 },

    #[error("cannot lay out an empty tree")]
    EmptyTree,

    #[error("node id '{0}' appears more than once in the tree")]
    DuplicateId(String),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no geometry for node '{id}' ({})", path.display())]
    MissingGeometry { id: String, path: PathBuf },

    #[error("failed to encode diagram: {0}")]
    Encoding(#[from] io::Error),

    #[error("failed to decode diagram: {0}")]
    Decode(String),

    #[error("failed to serialize tree: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse settings from {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Crate-level error used by the CLI and by callers that run the full pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
