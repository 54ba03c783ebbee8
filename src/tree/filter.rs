//! Inclusion predicate applied to every directory entry during a scan

use std::collections::HashSet;
use std::path::Path;

use glob::{MatchOptions, Pattern};
use tracing::warn;

use super::config::FilterConfig;
use super::utils::{is_glob, match_options};

/// A compiled exclusion rule.
#[derive(Debug)]
struct Rule {
    pattern: Pattern,
    /// Match against the root-relative path instead of the base name.
    on_path: bool,
    dirs_only: bool,
}

/// Decides whether an entry becomes part of the tree.
///
/// Pure function of `(path, name, is_dir)` and the configuration it was built
/// from: literal names are checked with a set lookup, glob rules are compiled
/// once up front.
#[derive(Debug)]
pub struct PathFilter {
    literals: HashSet<String>,
    literal_dirs: HashSet<String>,
    rules: Vec<Rule>,
    options: MatchOptions,
    exclude_hidden: bool,
    case_insensitive: bool,
    max_file_size: Option<u64>,
}

impl PathFilter {
    pub fn new(config: &FilterConfig) -> Self {
        let fold = |s: &str| {
            if config.case_insensitive {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        };

        let mut literals = HashSet::new();
        let mut literal_dirs = HashSet::new();
        let mut rules = Vec::new();

        for raw in &config.excluded_names {
            let (body, dirs_only) = match raw.strip_suffix('/') {
                Some(body) => (body, true),
                None => (raw.as_str(), false),
            };
            if body.is_empty() {
                continue;
            }
            let on_path = body.contains('/');

            if !is_glob(body) && !on_path {
                if dirs_only {
                    literal_dirs.insert(fold(body));
                } else {
                    literals.insert(fold(body));
                }
                continue;
            }

            match Pattern::new(body) {
                Ok(pattern) => rules.push(Rule {
                    pattern,
                    on_path,
                    dirs_only,
                }),
                Err(e) => {
                    warn!(pattern = %raw, error = %e, "invalid exclusion pattern, matching literally");
                    literals.insert(fold(body));
                }
            }
        }

        Self {
            literals,
            literal_dirs,
            rules,
            options: match_options(config.case_insensitive),
            exclude_hidden: config.exclude_hidden,
            case_insensitive: config.case_insensitive,
            max_file_size: config.max_file_size,
        }
    }

    /// Check whether an entry should be included.
    ///
    /// `path` is relative to the scan root and is only consulted by rules that
    /// contain a `/`.
    pub fn should_include(&self, path: &Path, name: &str, is_dir: bool) -> bool {
        if self.exclude_hidden && is_hidden(name) {
            return false;
        }

        let folded;
        let key = if self.case_insensitive {
            folded = name.to_lowercase();
            folded.as_str()
        } else {
            name
        };
        if self.literals.contains(key) || (is_dir && self.literal_dirs.contains(key)) {
            return false;
        }

        let path_str = path.to_string_lossy();
        !self.rules.iter().any(|rule| {
            if rule.dirs_only && !is_dir {
                return false;
            }
            let subject: &str = if rule.on_path { &path_str } else { name };
            rule.pattern.matches_with(subject, self.options)
        })
    }

    /// Size constraint for files; directories are never size-filtered.
    pub fn admits_size(&self, size: u64) -> bool {
        self.max_file_size.is_none_or(|max| size <= max)
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::new(&FilterConfig::default())
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.') && name != "." && name != ".."
}
