//! Output configuration types

use serde::{Deserialize, Serialize};

/// Colors and typography shared by every visual format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: String,
    pub directory_fill: String,
    pub directory_stroke: String,
    pub file_fill: String,
    pub file_stroke: String,
    /// Fill for truncated, cycle-cut and unreadable directories.
    pub partial_fill: String,
    pub partial_stroke: String,
    pub edge: String,
    pub text: String,
    pub font_family: String,
    pub font_size: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
            directory_fill: "#e3f2fd".to_string(),
            directory_stroke: "#1565c0".to_string(),
            file_fill: "#f5f5f5".to_string(),
            file_stroke: "#616161".to_string(),
            partial_fill: "#ffeeee".to_string(),
            partial_stroke: "#cc0000".to_string(),
            edge: "#999999".to_string(),
            text: "#333333".to_string(),
            font_family: "Helvetica, Arial, sans-serif".to_string(),
            font_size: 12.0,
        }
    }
}

/// Configuration for output formatting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub theme: Theme,
    /// Append human-readable sizes to labels.
    pub show_sizes: bool,
    /// Document title; defaults to the root directory name.
    pub title: Option<String>,
}

