//! Scan statistics collection and display
//!
//! This module summarizes a scanned tree: totals, depth, how many directories
//! were cut short and why, the largest files, and a breakdown by extension.

use serde::Serialize;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::tree::{Node, NodeStatus, ScanReport, format_size};

/// Default number of entries in the largest-files list.
pub const DEFAULT_LARGEST: usize = 5;

/// Collected statistics about a scanned tree.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TreeStats {
    /// Files below the root
    pub files: u64,
    /// Directories below the root
    pub directories: u64,
    /// Cumulative size in bytes
    pub total_size: u64,
    /// Deepest node depth (the root is 0)
    pub max_depth: usize,
    /// Directories not listed because of the depth limit
    pub truncated: usize,
    /// Directory symlinks not followed because they loop
    pub cycles: usize,
    /// Directories whose listing failed
    pub unreadable: usize,
    /// Entries skipped because they could not be inspected
    pub skipped: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub largest_files: Vec<FileSize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub by_extension: Vec<ExtensionStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSize {
    pub path: PathBuf,
    pub size: u64,
}

/// Statistics for a single file extension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtensionStats {
    /// Lowercased extension without the dot, empty for none
    pub extension: String,
    pub files: usize,
    pub size: u64,
}

/// Configuration for statistics collection.
#[derive(Debug, Clone)]
pub struct StatsConfig {
    /// How many of the largest files to keep
    pub largest: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            largest: DEFAULT_LARGEST,
        }
    }
}

/// Statistics collector that accumulates data node by node.
#[derive(Debug, Default)]
pub struct StatsCollector {
    config: StatsConfig,
    stats: TreeStats,
    files: Vec<FileSize>,
    /// Maps extension -> (file_count, total_size)
    by_extension: HashMap<String, (usize, u64)>,
}

impl StatsCollector {
    pub fn new(config: StatsConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Record one node. The root is counted for depth and status only.
    pub fn record_node(&mut self, node: &Node, is_root: bool) {
        let stats = &mut self.stats;
        stats.max_depth = stats.max_depth.max(node.depth);
        match node.status {
            NodeStatus::Complete => {}
            NodeStatus::Truncated => stats.truncated += 1,
            NodeStatus::CycleDetected => stats.cycles += 1,
            NodeStatus::Unreadable => stats.unreadable += 1,
        }
        if is_root {
            stats.total_size = node.size;
            return;
        }

        if node.is_dir() {
            stats.directories += 1;
            return;
        }

        stats.files += 1;
        let ext = node
            .path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let entry = self.by_extension.entry(ext).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += node.size;
        self.files.push(FileSize {
            path: node.path.clone(),
            size: node.size,
        });
    }

    /// Record the entries a scan skipped.
    pub fn record_report(&mut self, report: &ScanReport) {
        self.stats.skipped += report.skipped.len();
    }

    /// Finalize and return the collected statistics.
    pub fn finalize(mut self) -> TreeStats {
        // Largest first, ties by path
        self.files
            .sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
        self.files.truncate(self.config.largest);

        let mut extensions: Vec<ExtensionStats> = self
            .by_extension
            .into_iter()
            .map(|(extension, (files, size))| ExtensionStats {
                extension,
                files,
                size,
            })
            .collect();
        extensions.sort_by(|a, b| {
            b.files
                .cmp(&a.files)
                .then_with(|| a.extension.cmp(&b.extension))
        });

        TreeStats {
            largest_files: self.files,
            by_extension: extensions,
            ..self.stats
        }
    }
}

/// Collect statistics for a whole tree, plus the skips from its scan report.
pub fn collect(root: &Node, report: Option<&ScanReport>, config: StatsConfig) -> TreeStats {
    let mut collector = StatsCollector::new(config);
    for node in root.walk() {
        collector.record_node(node, node.id == root.id);
    }
    if let Some(report) = report {
        collector.record_report(report);
    }
    collector.finalize()
}

/// Print statistics to stderr with optional color. Stdout carries the
/// rendered artifact.
pub fn print_stats(stats: &TreeStats, use_color: bool) -> io::Result<()> {
    let color_choice = if use_color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut out = StandardStream::stderr(color_choice);
    write_stats(&mut out, stats)
}

fn write_stats<W: WriteColor>(out: &mut W, stats: &TreeStats) -> io::Result<()> {
    // Header
    let mut bold = ColorSpec::new();
    bold.set_bold(true);
    out.set_color(&bold)?;
    writeln!(out, "Tree Statistics")?;
    out.reset()?;
    writeln!(out, "───────────────")?;

    // Summary
    writeln!(out, "Files:        {}", format_number(stats.files))?;
    writeln!(out, "Directories:  {}", format_number(stats.directories))?;
    writeln!(out, "Total size:   {}", format_size(stats.total_size))?;
    writeln!(out, "Max depth:    {}", stats.max_depth)?;

    let mut warn = ColorSpec::new();
    warn.set_fg(Some(Color::Yellow));
    for (label, count) in [
        ("Truncated:", stats.truncated),
        ("Cycles:", stats.cycles),
        ("Unreadable:", stats.unreadable),
        ("Skipped:", stats.skipped),
    ] {
        if count > 0 {
            write!(out, "{:<14}", label)?;
            out.set_color(&warn)?;
            writeln!(out, "{}", count)?;
            out.reset()?;
        }
    }
    writeln!(out)?;

    let mut name_color = ColorSpec::new();
    name_color.set_fg(Some(Color::Cyan));

    if !stats.largest_files.is_empty() {
        out.set_color(&bold)?;
        writeln!(out, "Largest Files:")?;
        out.reset()?;
        for file in &stats.largest_files {
            write!(out, "  {:>10}  ", format_size(file.size))?;
            out.set_color(&name_color)?;
            writeln!(out, "{}", file.path.display())?;
            out.reset()?;
        }
        writeln!(out)?;
    }

    if !stats.by_extension.is_empty() {
        out.set_color(&bold)?;
        writeln!(out, "By Extension:")?;
        out.reset()?;
        for ext in &stats.by_extension {
            write!(out, "  ")?;
            out.set_color(&name_color)?;
            let name = if ext.extension.is_empty() {
                "(none)".to_string()
            } else {
                format!(".{}", ext.extension)
            };
            write!(out, "{:<14}", name)?;
            out.reset()?;
            writeln!(out, "{:>6} files  {:>10}", ext.files, format_size(ext.size))?;
        }
    }

    Ok(())
}

/// Format a number with thousand separators.
fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Print statistics as JSON to stderr.
pub fn print_stats_json(stats: &TreeStats) -> io::Result<()> {
    let json = serde_json::to_string_pretty(stats).map_err(io::Error::other)?;
    eprintln!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_support::{dir, file, sample_tree};
    use termcolor::NoColor;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_collect_totals() {
        let stats = collect(&sample_tree(), None, StatsConfig::default());
        assert_eq!(stats.files, 4);
        assert_eq!(stats.directories, 3);
        assert_eq!(stats.total_size, 490);
        assert_eq!(stats.max_depth, 3);
        assert_eq!(stats.truncated + stats.cycles + stats.unreadable, 0);
    }

    #[test]
    fn test_largest_files_and_extensions() {
        let stats = collect(&sample_tree(), None, StatsConfig { largest: 2 });
        let largest: Vec<u64> = stats.largest_files.iter().map(|f| f.size).collect();
        assert_eq!(largest, vec![300, 100]);
        assert_eq!(stats.largest_files[0].path, PathBuf::from("src/lib.rs"));

        assert_eq!(
            stats.by_extension[0],
            ExtensionStats {
                extension: "rs".to_string(),
                files: 3,
                size: 440,
            }
        );
        assert_eq!(stats.by_extension[1].extension, "md");
    }

    #[test]
    fn test_partial_directories_counted() {
        let truncated = Node::directory(
            std::path::Path::new("/r/deep"),
            "deep".into(),
            "deep".to_string(),
            1,
            Vec::new(),
            NodeStatus::Truncated,
        );
        let root = dir("/r", 0, vec![truncated, file("/r", "Makefile", 10, 1)]);
        let stats = collect(&root, None, StatsConfig::default());
        assert_eq!(stats.truncated, 1);
        assert_eq!(stats.by_extension[0].extension, "");
    }

    #[test]
    fn test_text_report() {
        let stats = collect(&sample_tree(), None, StatsConfig::default());
        let mut out = NoColor::new(Vec::new());
        write_stats(&mut out, &stats).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert!(text.contains("Files:        4"));
        assert!(text.contains("Largest Files:"));
        assert!(text.contains(".rs"));
        assert!(!text.contains("Truncated:"));
    }
}
