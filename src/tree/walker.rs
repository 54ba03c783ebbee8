//! TreeScanner - walks a root directory into an in-memory `Node` tree

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::ScanError;

use super::config::ScanConfig;
use super::filter::PathFilter;
use super::node::{Node, NodeStatus};
use super::utils::entry_name;

/// Cooperative cancellation flag shared between a scan and its caller.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// An entry left out of the tree because it could not be inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub reason: String,
}

/// Non-fatal findings collected during a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub skipped: Vec<SkippedEntry>,
}

impl ScanReport {
    fn merge(&mut self, other: ScanReport) {
        self.skipped.extend(other.skipped);
    }
}

#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub root: Node,
    pub report: ScanReport,
}

impl ScanOutcome {
    /// True when nothing was skipped, truncated, cycle-cut or unreadable.
    pub fn is_complete(&self) -> bool {
        self.report.skipped.is_empty() && !self.root.is_partial()
    }
}

/// Canonical directories on the current recursion path. Each branch extends
/// its own chain, so parallel siblings never share or contend on it.
struct Ancestry<'a> {
    dir: PathBuf,
    parent: Option<&'a Ancestry<'a>>,
}

impl Ancestry<'_> {
    fn contains(&self, dir: &Path) -> bool {
        let mut link = Some(self);
        while let Some(a) = link {
            if a.dir == dir {
                return true;
            }
            link = a.parent;
        }
        false
    }
}

/// A filtered directory entry waiting to become a node.
struct Pending {
    absolute: PathBuf,
    relative: PathBuf,
    name: String,
    is_dir: bool,
    is_symlink: bool,
    size: u64,
}

struct Cancelled;

type Walked = Result<(Node, ScanReport), Cancelled>;

/// Scanner that builds the full tree in memory.
pub struct TreeScanner {
    config: ScanConfig,
    filter: PathFilter,
    cancel: CancelFlag,
}

impl TreeScanner {
    pub fn new(config: ScanConfig) -> Self {
        let filter = PathFilter::new(&config.filter);
        Self {
            config,
            filter,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = flag;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn scan(&self, root: &Path) -> Result<Node, ScanError> {
        self.scan_with_report(root).map(|outcome| outcome.root)
    }

    /// Scan `root`, returning the tree and the entries that were skipped.
    ///
    /// Fails only when the root itself is missing, unreadable or not a
    /// directory, or when the scan is cancelled.
    pub fn scan_with_report(&self, root: &Path) -> Result<ScanOutcome, ScanError> {
        let canonical = validate_root(root)?;
        let ancestry = Ancestry {
            dir: canonical.clone(),
            parent: None,
        };

        let run = || self.walk_dir(&canonical, PathBuf::new(), entry_name(&canonical), 0, &ancestry);

        let walked = match self.config.parallel_workers {
            0 | 1 => run(),
            n => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
                Ok(pool) => pool.install(run),
                Err(e) => {
                    warn!(error = %e, "could not build scan thread pool, using global pool");
                    run()
                }
            },
        };

        let (root_node, report) = walked.map_err(|Cancelled| ScanError::Cancelled(root.to_path_buf()))?;
        info!(
            root = %canonical.display(),
            files = root_node.file_count,
            dirs = root_node.dir_count,
            size = root_node.size,
            skipped = report.skipped.len(),
            "scan complete"
        );
        Ok(ScanOutcome {
            root: root_node,
            report,
        })
    }

    fn parallel(&self) -> bool {
        self.config.parallel_workers != 1
    }

    fn at_max_depth(&self, depth: usize) -> bool {
        self.config.max_depth.is_some_and(|max| depth >= max)
    }

    fn walk_dir(
        &self,
        absolute: &Path,
        relative: PathBuf,
        name: String,
        depth: usize,
        ancestry: &Ancestry<'_>,
    ) -> Walked {
        if self.cancel.is_cancelled() {
            return Err(Cancelled);
        }

        if self.at_max_depth(depth) {
            let node = Node::directory(absolute, relative, name, depth, Vec::new(), NodeStatus::Truncated);
            return Ok((node, ScanReport::default()));
        }

        let mut report = ScanReport::default();
        let pending = match self.read_entries(absolute, &relative, &mut report) {
            Ok(pending) => pending?,
            Err(e) => {
                warn!(path = %absolute.display(), error = %e, "cannot read directory");
                report.skipped.push(SkippedEntry {
                    path: absolute.to_path_buf(),
                    reason: e.to_string(),
                });
                let node = Node::directory(absolute, relative, name, depth, Vec::new(), NodeStatus::Unreadable);
                return Ok((node, report));
            }
        };
        debug!(path = %absolute.display(), entries = pending.len(), "listed directory");

        let visit = |entry: Pending| self.visit(entry, depth + 1, ancestry);
        let results: Vec<Walked> = if self.parallel() {
            pending.into_par_iter().map(visit).collect()
        } else {
            pending.into_iter().map(visit).collect()
        };

        let mut children = Vec::with_capacity(results.len());
        for result in results {
            let (child, child_report) = result?;
            report.merge(child_report);
            children.push(child);
        }

        let node = Node::directory(absolute, relative, name, depth, children, NodeStatus::Complete);
        Ok((node, report))
    }

    /// List and filter the immediate entries of a directory. The outer error
    /// is the directory listing failing; the inner one is cancellation.
    fn read_entries(
        &self,
        absolute: &Path,
        relative: &Path,
        report: &mut ScanReport,
    ) -> io::Result<Result<Vec<Pending>, Cancelled>> {
        let mut pending = Vec::new();

        for entry in fs::read_dir(absolute)? {
            if self.cancel.is_cancelled() {
                return Ok(Err(Cancelled));
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(dir = %absolute.display(), error = %e, "skipping unreadable entry");
                    report.skipped.push(SkippedEntry {
                        path: absolute.to_path_buf(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let entry_path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_symlink = entry.file_type().map(|t| t.is_symlink()).unwrap_or(false);

            // Follows symlinks, so a link reports its target's type and size
            let metadata = match fs::metadata(&entry_path) {
                Ok(m) => m,
                Err(e) => {
                    warn!(path = %entry_path.display(), error = %e, "skipping entry");
                    report.skipped.push(SkippedEntry {
                        path: entry_path,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if !metadata.is_dir() && !metadata.is_file() {
                debug!(path = %entry_path.display(), "skipping special file");
                continue;
            }

            let is_dir = metadata.is_dir();
            let child_relative = relative.join(&name);
            if !self.filter.should_include(&child_relative, &name, is_dir) {
                debug!(path = %child_relative.display(), "excluded by filter");
                continue;
            }
            if !is_dir && !self.filter.admits_size(metadata.len()) {
                debug!(path = %child_relative.display(), size = metadata.len(), "excluded by size limit");
                continue;
            }

            pending.push(Pending {
                absolute: entry_path,
                relative: child_relative,
                name,
                is_dir,
                is_symlink,
                size: if is_dir { 0 } else { metadata.len() },
            });
        }

        Ok(Ok(pending))
    }

    fn visit(&self, entry: Pending, depth: usize, ancestry: &Ancestry<'_>) -> Walked {
        if !entry.is_dir {
            let node = Node::file(&entry.absolute, entry.relative, entry.name, entry.size, depth);
            return Ok((node, ScanReport::default()));
        }

        // A plain subdirectory cannot alias an ancestor; only links need resolving
        let canonical = if entry.is_symlink {
            match fs::canonicalize(&entry.absolute) {
                Ok(c) => c,
                Err(e) => {
                    warn!(path = %entry.absolute.display(), error = %e, "cannot resolve link");
                    let report = ScanReport {
                        skipped: vec![SkippedEntry {
                            path: entry.absolute.clone(),
                            reason: e.to_string(),
                        }],
                    };
                    let node = Node::directory(
                        &entry.absolute,
                        entry.relative,
                        entry.name,
                        depth,
                        Vec::new(),
                        NodeStatus::Unreadable,
                    );
                    return Ok((node, report));
                }
            }
        } else {
            ancestry.dir.join(&entry.name)
        };

        if ancestry.contains(&canonical) {
            warn!(path = %entry.absolute.display(), target = %canonical.display(), "cycle detected, not descending");
            let node = Node::directory(
                &entry.absolute,
                entry.relative,
                entry.name,
                depth,
                Vec::new(),
                NodeStatus::CycleDetected,
            );
            return Ok((node, ScanReport::default()));
        }

        let link = Ancestry {
            dir: canonical,
            parent: Some(ancestry),
        };
        self.walk_dir(&entry.absolute, entry.relative, entry.name, depth, &link)
    }
}

/// Check that the root exists, is a directory and can be listed.
fn validate_root(root: &Path) -> Result<PathBuf, ScanError> {
    let metadata = fs::metadata(root).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ScanError::RootNotFound(root.to_path_buf()),
        _ => ScanError::RootUnreadable {
            path: root.to_path_buf(),
            source: e,
        },
    })?;
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    fs::read_dir(root).map_err(|e| ScanError::RootUnreadable {
        path: root.to_path_buf(),
        source: e,
    })?;

    fs::canonicalize(root).map_err(|e| ScanError::RootUnreadable {
        path: root.to_path_buf(),
        source: e,
    })
}
