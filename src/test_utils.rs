//! Test utilities for building temporary directory trees.
//!
//! This module is only compiled for tests and benchmarks.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory tree for testing.
///
/// The directory is removed when dropped.
pub struct TestTree {
    dir: TempDir,
}

impl TestTree {
    /// Create a new empty temporary directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        Self { dir }
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Add a file with the given content, creating parent directories as needed.
    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// Add a file of exactly `size` bytes.
    pub fn add_sized_file(&self, path: &str, size: usize) -> PathBuf {
        self.add_file(path, &"x".repeat(size))
    }

    /// Add a directory (and any missing parents).
    pub fn add_dir(&self, path: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        fs::create_dir_all(&full_path).expect("Failed to create dir");
        full_path
    }

    /// Create a symlink at `link` pointing to `target` (relative to the link's
    /// directory or absolute).
    #[cfg(unix)]
    pub fn add_symlink(&self, target: &str, link: &str) -> PathBuf {
        let full_link = self.dir.path().join(link);
        if let Some(parent) = full_link.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::os::unix::fs::symlink(target, &full_link).expect("Failed to create symlink");
        full_link
    }

    /// A small project: `src/{main.rs, lib.rs, util/helpers.rs}`, `docs/`
    /// with one page, `README.md`, plus a `.git` directory and a `target`
    /// build directory that the default filter excludes.
    pub fn sample_project() -> Self {
        let tree = Self::new();
        tree.add_sized_file("src/main.rs", 100);
        tree.add_sized_file("src/lib.rs", 300);
        tree.add_sized_file("src/util/helpers.rs", 40);
        tree.add_sized_file("docs/guide.md", 60);
        tree.add_sized_file("README.md", 50);
        tree.add_sized_file(".git/HEAD", 23);
        tree.add_sized_file("target/debug/app", 5000);
        tree
    }
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}
