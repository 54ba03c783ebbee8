//! Shared utility functions for scanning

use std::path::Path;

use glob::MatchOptions;

/// Match options for exclusion patterns; case-sensitive unless asked otherwise.
pub fn match_options(case_insensitive: bool) -> MatchOptions {
    MatchOptions {
        case_sensitive: !case_insensitive,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

/// Whether a pattern uses glob syntax rather than naming an entry exactly.
pub fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Get the name of a path, defaulting to "." for root
pub fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| ".".to_string())
}

/// Format a size in bytes to human-readable format.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1}G", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1}M", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1}K", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_glob() {
        assert!(is_glob("*.log"));
        assert!(is_glob("file?.txt"));
        assert!(!is_glob("node_modules"));
    }

    #[test]
    fn test_entry_name() {
        assert_eq!(entry_name(Path::new("/a/b/c.txt")), "c.txt");
        assert_eq!(entry_name(Path::new("/")), ".");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0B");
        assert_eq!(format_size(1023), "1023B");
        assert_eq!(format_size(1024), "1.0K");
        assert_eq!(format_size(1536), "1.5K");
        assert_eq!(format_size(1024 * 1024 * 3), "3.0M");
        assert_eq!(format_size(1024 * 1024 * 1024), "1.0G");
    }
}
