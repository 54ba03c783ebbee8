//! Configuration types for the scanner and path filter

use std::collections::BTreeSet;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Build, cache, VCS and editor artifacts that are excluded by default.
pub const DEFAULT_EXCLUDED_NAMES: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "__pycache__",
    ".DS_Store",
    "node_modules",
    ".venv",
    "venv",
    "env",
    "build",
    "dist",
    "target",
    "*.egg-info",
    "cache",
    ".cache",
    ".idea",
    ".vscode",
    ".trunk",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
    ".tox",
];

/// Static configuration for [`PathFilter`](super::PathFilter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Exact names or glob patterns. Patterns containing `/` match the path
    /// relative to the scan root; a trailing `/` restricts a pattern to
    /// directories.
    pub excluded_names: BTreeSet<String>,
    pub exclude_hidden: bool,
    /// Files larger than this many bytes are left out of the tree.
    pub max_file_size: Option<u64>,
    pub case_insensitive: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_names: DEFAULT_EXCLUDED_NAMES.iter().map(|s| s.to_string()).collect(),
            exclude_hidden: true,
            max_file_size: None,
            case_insensitive: false,
        }
    }
}

impl FilterConfig {
    /// A filter that admits everything.
    pub fn permissive() -> Self {
        Self {
            excluded_names: BTreeSet::new(),
            exclude_hidden: false,
            max_file_size: None,
            case_insensitive: false,
        }
    }

    pub fn with_excluded<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_names.extend(names.into_iter().map(Into::into));
        self
    }
}

/// Configuration for tree scanning behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directories at this depth are kept but not listed. `None` = unlimited.
    pub max_depth: Option<usize>,
    /// Number of parallel workers for sibling subdirectories.
    /// 0 = auto-detect (use all available cores)
    /// 1 = sequential (no parallelism)
    /// N = use N worker threads
    pub parallel_workers: usize,
    pub filter: FilterConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            parallel_workers: 1,
            filter: FilterConfig::default(),
        }
    }
}

pub const DEFAULT_MAX_DEPTH: usize = 5;

impl ScanConfig {
    /// Key under which an external cache may store the scan of `root`:
    /// root path, depth limit and a hash of the filter configuration.
    pub fn cache_key(&self, root: &Path) -> String {
        let mut hasher = DefaultHasher::new();
        self.filter.hash(&mut hasher);
        let depth = self
            .max_depth
            .map_or_else(|| "all".to_string(), |d| d.to_string());
        format!("{}:{}:{:016x}", root.display(), depth, hasher.finish())
    }
}

impl Hash for FilterConfig {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.excluded_names.hash(state);
        self.exclude_hidden.hash(state);
        self.max_file_size.hash(state);
        self.case_insensitive.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_excludes_vcs_dirs() {
        let config = FilterConfig::default();
        assert!(config.excluded_names.contains(".git"));
        assert!(config.excluded_names.contains("node_modules"));
        assert!(config.exclude_hidden);
    }

    #[test]
    fn test_cache_key_changes_with_filter() {
        let root = Path::new("/tmp/project");
        let a = ScanConfig::default();
        let mut b = ScanConfig::default();
        b.filter.excluded_names.insert("docs".to_string());

        assert_eq!(a.cache_key(root), ScanConfig::default().cache_key(root));
        assert_ne!(a.cache_key(root), b.cache_key(root));
        assert!(a.cache_key(root).starts_with("/tmp/project:5:"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ScanConfig = toml::from_str("max_depth = 2\n").unwrap();
        assert_eq!(config.max_depth, Some(2));
        assert_eq!(config.parallel_workers, 1);
        assert_eq!(config.filter, FilterConfig::default());
    }
}
