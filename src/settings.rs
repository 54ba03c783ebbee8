//! Settings file support
//!
//! An optional TOML file supplies defaults for every stage of the pipeline.
//! Command-line flags override it; anything it leaves out falls back to the
//! built-in defaults.
//!
//! ```toml
//! [scan]
//! max_depth = 8
//! parallel_workers = 0
//!
//! [filter]
//! excluded_names = [".git", "target"]
//! exclude_hidden = false
//!
//! [layout]
//! strategy = "radial"
//! width = 1600
//! arm_count = 6
//!
//! [render]
//! format = "static-svg"
//! show_sizes = true
//! theme = { directory_fill = "#fffde7" }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::layout::{LayoutOptions, LayoutStrategy, Viewport};
use crate::output::{OutputConfig, OutputFormat};
use crate::tree::{DEFAULT_MAX_DEPTH, FilterConfig, ScanConfig};

/// File name looked up in the working directory when `--config` is not given.
pub const DEFAULT_SETTINGS_FILE: &str = "treeviz.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scan: ScanSettings,
    pub filter: FilterConfig,
    pub layout: LayoutSettings,
    pub render: RenderSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub max_depth: usize,
    /// Ignore `max_depth` and list every level.
    pub unlimited_depth: bool,
    pub parallel_workers: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            unlimited_depth: false,
            parallel_workers: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub strategy: LayoutStrategy,
    pub width: f64,
    pub height: f64,
    #[serde(flatten)]
    pub options: LayoutOptions,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        let viewport = Viewport::default();
        Self {
            strategy: LayoutStrategy::default(),
            width: viewport.width,
            height: viewport.height,
            options: LayoutOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub format: OutputFormat,
    #[serde(flatten)]
    pub output: OutputConfig,
}

impl Settings {
    /// Load settings from a file, or return defaults if the file doesn't exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Settings file in the current directory.
    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_SETTINGS_FILE)
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            max_depth: (!self.scan.unlimited_depth).then_some(self.scan.max_depth),
            parallel_workers: self.scan.parallel_workers,
            filter: self.filter.clone(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.layout.width, self.layout.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load(temp_dir.path().join("nonexistent.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.scan_config(), ScanConfig::default());
    }

    #[test]
    fn test_load_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("treeviz.toml");
        std::fs::write(
            &path,
            r##"
[scan]
unlimited_depth = true
parallel_workers = 4

[filter]
excluded_names = ["vendor"]

[layout]
strategy = "galaxy"
width = 640.0
arm_count = 7

[render]
format = "mermaid"
show_sizes = true

[render.theme]
directory_fill = "#fffde7"
"##,
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        let scan = settings.scan_config();
        assert_eq!(scan.max_depth, None);
        assert_eq!(scan.parallel_workers, 4);
        assert_eq!(scan.filter.excluded_names.len(), 1);
        assert!(scan.filter.exclude_hidden);

        assert_eq!(settings.layout.strategy, LayoutStrategy::Galaxy);
        assert_eq!(settings.viewport(), Viewport::new(640.0, 800.0));
        assert_eq!(settings.layout.options.arm_count, 7);
        assert_eq!(settings.layout.options.margin, 20.0);

        assert_eq!(settings.render.format, OutputFormat::Mermaid);
        assert!(settings.render.output.show_sizes);
        assert_eq!(settings.render.output.theme.directory_fill, "#fffde7");
        assert_eq!(settings.render.output.theme.file_fill, "#f5f5f5");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("treeviz.toml");
        std::fs::write(&path, "[layout]\nstrategy = \"pyramid\"\n").unwrap();
        assert!(matches!(
            Settings::load(&path),
            Err(SettingsError::Parse { .. })
        ));
    }
}
