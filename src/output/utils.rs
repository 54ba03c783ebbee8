//! Shared utility functions for output formatting

use crate::tree::{Node, NodeStatus, format_size};

/// Escape text for use in XML content and attribute values.
pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`xml_escape`], plus decimal and hex character references.
pub fn xml_unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        let entity = &tail[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Visible label for a node: its name, optionally followed by its size.
pub fn label(node: &Node, show_sizes: bool) -> String {
    if show_sizes {
        format!("{} ({})", node.name, format_size(node.size))
    } else {
        node.name.clone()
    }
}

/// One-line description used for tooltips.
pub fn tooltip(node: &Node) -> String {
    let path = if node.path.as_os_str().is_empty() {
        ".".to_string()
    } else {
        node.path.display().to_string()
    };
    let mut text = if node.is_dir() {
        format!(
            "{}/ - {} files, {} dirs, {}",
            path,
            node.file_count,
            node.dir_count,
            format_size(node.size)
        )
    } else {
        format!("{} - {}", path, format_size(node.size))
    };
    match node.status {
        NodeStatus::Complete => {}
        NodeStatus::Truncated => text.push_str(" (depth limit reached)"),
        NodeStatus::CycleDetected => text.push_str(" (symlink cycle, not followed)"),
        NodeStatus::Unreadable => text.push_str(" (unreadable)"),
    }
    text
}

/// Format a coordinate with two decimals, without a trailing `-0.00`.
pub fn num(v: f64) -> String {
    let s = format!("{:.2}", v);
    if s == "-0.00" { "0.00".to_string() } else { s }
}
