//! Formatting helpers for CLI output.

use comfy_table::{ContentArrangement, Table};

/// Create a styled table with the given headers.
pub fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.load_preset(comfy_table::presets::NOTHING);
    table.set_header(headers);
    table
}

/// Format a byte count as a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Shorten a digest to its algorithm plus the first 12 encoded characters.
pub fn short_digest(digest: &str) -> String {
    // Parsed documents may carry malformed, non-ASCII digests.
    let Some((algorithm, encoded)) = digest.split_once(':') else {
        return digest.to_string();
    };
    match encoded.char_indices().nth(12) {
        Some((end, _)) => format!("{}:{}", algorithm, &encoded[..end]),
        None => digest.to_string(),
    }
}

/// Split a `KEY=VALUE` argument. The key must be non-empty; the value may be.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid argument '{s}': expected KEY=VALUE")),
    }
}
