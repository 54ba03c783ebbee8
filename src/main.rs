//! CLI entry point for treeviz

use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use treeviz::output::drawio_url;
use treeviz::settings::Settings;
use treeviz::stats::{self, StatsConfig};
use treeviz::{
    Artifact, CancelFlag, CollapseController, FilterConfig, LayoutEngine, LayoutStrategy,
    OutputFormat, Renderer, TreeScanner, Viewport, logging,
};

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color on stderr based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            std::io::stderr().is_terminal()
        }
    }
}

/// Depth limit given on the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Depth {
    Levels(usize),
    Unlimited,
}

#[derive(Parser, Debug)]
#[command(name = "treeviz")]
#[command(about = "Scan a directory tree, lay it out and render it as SVG, draw.io, Mermaid, DOT or JSON")]
#[command(version)]
struct Args {
    /// Directory to visualize
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Descend only N levels deep ("unlimited" for no limit)
    #[arg(short = 'L', long = "level", value_parser = parse_depth)]
    level: Option<Depth>,

    /// Exclude entries matching pattern (can be used multiple times)
    #[arg(short = 'I', long = "ignore")]
    ignore: Vec<String>,

    /// Include hidden entries and the default build/cache/VCS exclusions
    #[arg(short, long)]
    all: bool,

    /// Layout strategy: tree, radial, treemap, sunburst, force, galaxy
    #[arg(long = "layout", value_name = "STRATEGY")]
    layout: Option<LayoutStrategy>,

    /// Output format: svg, static-svg, drawio, dom, json, mermaid, dot
    #[arg(short = 'f', long = "format")]
    format: Option<OutputFormat>,

    /// Viewport width
    #[arg(long = "width")]
    width: Option<f64>,

    /// Viewport height
    #[arg(long = "height")]
    height: Option<f64>,

    /// Number of spiral arms for the galaxy layout
    #[arg(long = "arms")]
    arms: Option<usize>,

    /// Leave out files larger than SIZE. Use suffixes: K, M, G (e.g., 5M for 5MB)
    #[arg(long = "max-file-size", value_name = "SIZE", value_parser = parse_file_size)]
    max_file_size: Option<u64>,

    /// Show file and directory sizes in labels
    #[arg(short = 's', long = "size")]
    size: bool,

    /// Document title (defaults to the directory name)
    #[arg(long = "title")]
    title: Option<String>,

    /// Start with directories at depth N and below collapsed
    #[arg(long = "collapse-depth", value_name = "N")]
    collapse_depth: Option<usize>,

    /// Start with directories holding more than N entries collapsed
    #[arg(long = "collapse-large", value_name = "N")]
    collapse_large: Option<usize>,

    /// For draw.io output, print an app.diagrams.net link instead of the payload
    #[arg(long = "url")]
    url: bool,

    /// Write the output to FILE instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Number of parallel scan workers
    /// (0 = all cores, 1 = sequential, N = use N workers)
    #[arg(short = 'j', long = "jobs")]
    jobs: Option<usize>,

    /// Abandon the scan after DURATION (e.g., 500ms, 10s, 2m)
    #[arg(long = "timeout", value_name = "DURATION", value_parser = parse_duration_string)]
    timeout: Option<Duration>,

    /// Settings file (default: ./treeviz.toml when present)
    #[arg(long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print scan statistics to stderr
    #[arg(long = "stats")]
    stats: bool,

    /// Print scan statistics to stderr as JSON
    #[arg(long = "stats-json")]
    stats_json: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    quiet: bool,
}

/// Parse a duration string like "500ms", "10s", "2m" into a Duration.
/// Uses the humantime crate.
fn parse_duration_string(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s.trim()).map_err(|e| e.to_string())
}

/// Parse a file size string like "5M", "100K", "1G" into bytes.
/// Supports suffixes: K/KB (1024), M/MB (1024^2), G/GB (1024^3)
/// Without suffix, interprets as bytes.
fn parse_file_size(s: &str) -> Result<u64, String> {
    let s = s.trim().to_uppercase();
    let (num_str, multiplier) = if let Some(n) = s.strip_suffix("GB").or_else(|| s.strip_suffix('G')) {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("MB").or_else(|| s.strip_suffix('M')) {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("KB").or_else(|| s.strip_suffix('K')) {
        (n, 1024)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("invalid number: {}", num_str))?;

    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size too large: {}", s))
}

/// Parse a depth limit: a number of levels, or "unlimited".
fn parse_depth(s: &str) -> Result<Depth, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "unlimited" | "none" | "all" => Ok(Depth::Unlimited),
        n => n
            .parse()
            .map(Depth::Levels)
            .map_err(|_| format!("expected a number or 'unlimited', got '{}'", s)),
    }
}

fn main() {
    let args = Args::parse();
    let use_color = should_use_color(args.color);
    logging::init(args.verbose, args.quiet, use_color);

    if let Err(e) = run(&args, use_color) {
        eprintln!("treeviz: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args, use_color: bool) -> treeviz::Result<()> {
    let settings_path = args.config.clone().unwrap_or_else(Settings::default_path);
    let settings = Settings::load(&settings_path)?;

    // CLI flags override the settings file, which overrides the defaults
    let mut scan_config = settings.scan_config();
    match args.level {
        Some(Depth::Levels(n)) => scan_config.max_depth = Some(n),
        Some(Depth::Unlimited) => scan_config.max_depth = None,
        None => {}
    }
    if args.all {
        scan_config.filter = FilterConfig {
            max_file_size: scan_config.filter.max_file_size,
            case_insensitive: scan_config.filter.case_insensitive,
            ..FilterConfig::permissive()
        };
    }
    scan_config.filter.excluded_names.extend(args.ignore.iter().cloned());
    if let Some(size) = args.max_file_size {
        scan_config.filter.max_file_size = Some(size);
    }
    if let Some(jobs) = args.jobs {
        scan_config.parallel_workers = jobs;
    }

    let cancel = CancelFlag::new();
    if let Some(timeout) = args.timeout {
        let flag = cancel.clone();
        thread::spawn(move || {
            thread::sleep(timeout);
            flag.cancel();
        });
    }

    let scanner = TreeScanner::new(scan_config).with_cancel_flag(cancel);
    let outcome = scanner.scan_with_report(&args.path)?;
    if !outcome.is_complete() {
        warn!(skipped = outcome.report.skipped.len(), "some entries could not be read");
    }
    let root = outcome.root;

    let mut options = settings.layout.options.clone();
    if let Some(arms) = args.arms {
        options.arm_count = arms;
    }
    let strategy = args.layout.unwrap_or(settings.layout.strategy);
    let defaults = settings.viewport();
    let viewport = Viewport::new(
        args.width.unwrap_or(defaults.width),
        args.height.unwrap_or(defaults.height),
    );
    let geometry = LayoutEngine::new(options).layout(&root, strategy, viewport)?;

    let mut collapse = CollapseController::new(&root);
    if let Some(depth) = args.collapse_depth {
        collapse.collapse_beyond_depth(depth);
    }
    if let Some(threshold) = args.collapse_large {
        collapse.collapse_large(threshold);
    }

    let mut output_config = settings.render.output.clone();
    if args.size {
        output_config.show_sizes = true;
    }
    if args.title.is_some() {
        output_config.title = args.title.clone();
    }
    let format = args.format.unwrap_or(settings.render.format);
    let artifact = Renderer::new(output_config)
        .with_collapse(&collapse)
        .render(&root, &geometry, format)?;

    let artifact = match artifact {
        Artifact::Document { content, .. } if args.url && format == OutputFormat::Drawio => {
            Artifact::Document {
                media_type: "text/uri-list",
                content: drawio_url(&content),
            }
        }
        other => other,
    };

    match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            artifact.write_to(&mut out)?;
            out.flush()?;
            info!(path = %path.display(), "wrote output");
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            artifact.write_to(&mut out)?;
            out.flush()?;
        }
    }

    if args.stats || args.stats_json {
        let tree_stats = stats::collect(&root, Some(&outcome.report), StatsConfig::default());
        if args.stats_json {
            stats::print_stats_json(&tree_stats)?;
        } else {
            stats::print_stats(&tree_stats, use_color)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_size() {
        assert_eq!(parse_file_size("100"), Ok(100));
        assert_eq!(parse_file_size("2k"), Ok(2048));
        assert_eq!(parse_file_size("5MB"), Ok(5 * 1024 * 1024));
        assert_eq!(parse_file_size("1G"), Ok(1024 * 1024 * 1024));
        assert!(parse_file_size("lots").is_err());
    }

    #[test]
    fn test_parse_depth() {
        assert_eq!(parse_depth("3"), Ok(Depth::Levels(3)));
        assert_eq!(parse_depth("unlimited"), Ok(Depth::Unlimited));
        assert!(parse_depth("-1").is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration_string("10s"), Ok(Duration::from_secs(10)));
        assert_eq!(parse_duration_string(" 250ms "), Ok(Duration::from_millis(250)));
        assert!(parse_duration_string("soon").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "treeviz", "some/dir", "-L", "2", "--layout", "radial", "-f", "mermaid", "-I", "*.log",
            "-I", "tmp",
        ])
        .unwrap();
        assert_eq!(args.level, Some(Depth::Levels(2)));
        assert_eq!(args.layout, Some(LayoutStrategy::Radial));
        assert_eq!(args.format, Some(OutputFormat::Mermaid));
        assert_eq!(args.ignore, vec!["*.log", "tmp"]);
    }
}
