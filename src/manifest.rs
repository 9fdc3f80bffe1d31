use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One repository to materialise: where it lives and what to call it locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub url: String,
    pub name: String,
}

/// Loads the tab-separated manifest and returns its entries in file order.
///
/// A missing or unreadable file is fatal and aborts the run before any
/// cloning starts; everything past that point is best-effort line parsing.
pub fn parse_manifest<P: AsRef<Path>>(path: P) -> Result<Vec<ManifestEntry>> {
    let path_ref = path.as_ref();
    info!(manifest_path = ?path_ref, "Reading manifest file");

    let content = fs::read_to_string(path_ref)
        .with_context(|| format!("Failed to read manifest file {:?}", path_ref))?;

    let entries = parse_lines(&content);
    info!(
        manifest_path = ?path_ref,
        entry_count = entries.len(),
        "Parsed manifest"
    );
    Ok(entries)
}

fn parse_lines(content: &str) -> Vec<ManifestEntry> {
    let mut entries = Vec::new();
    for (line_num, raw_line) in content.lines().enumerate() {
        let line_num = line_num + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        let (url, name) = match (fields.next(), fields.next()) {
            (Some(url), Some(name)) => (url, name),
            // Fewer than two columns: not an entry.
            _ => continue,
        };
        // The first line is a header unless it already looks like a URL.
        if line_num == 1 && !looks_like_url(url) {
            debug!(line = %line, "Skipping header row");
            continue;
        }
        entries.push(ManifestEntry {
            url: url.to_string(),
            name: name.to_string(),
        });
    }
    entries
}

// Deliberately only these three prefixes; other schemes (ssh://, file://)
// on line 1 are treated as a header row.
fn looks_like_url(field: &str) -> bool {
    field.starts_with("http://") || field.starts_with("https://") || field.starts_with("git@")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entries_in_file_order() {
        let content = "https://host/a.git\trepo-a\nhttps://host/b.git\trepo-b\ngit@host:c.git\trepo-c\n";
        let entries = parse_lines(content);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].name, "repo-a");
        assert_eq!(entries[1].name, "repo-b");
        assert_eq!(entries[2].url, "git@host:c.git");
    }

    #[test]
    fn drops_header_row_on_first_line() {
        let content = "url\tname\nhttps://host/a.git\trepo-a\n";
        let entries = parse_lines(content);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "repo-a");
    }

    #[test]
    fn header_looking_line_is_kept_past_line_one() {
        let content = "https://host/a.git\trepo-a\nurl\tname\n";
        let entries = parse_lines(content);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].url, "url");
        assert_eq!(entries[1].name, "name");
    }

    #[test]
    fn first_line_with_url_prefix_is_real_data() {
        for url in ["http://host/a.git", "https://host/a.git", "git@host:a.git"] {
            let content = format!("{url}\trepo-a\n");
            let entries = parse_lines(&content);
            assert_eq!(entries.len(), 1, "first line {url} must not be a header");
            assert_eq!(entries[0].url, url);
        }
    }

    #[test]
    fn ssh_scheme_on_first_line_counts_as_header() {
        let content = "ssh://host/a.git\trepo-a\nhttps://host/b.git\trepo-b\n";
        let entries = parse_lines(content);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "repo-b");
    }

    #[test]
    fn blank_lines_never_produce_entries() {
        let content = "\nhttps://host/a.git\trepo-a\n\n   \nhttps://host/b.git\trepo-b\n\n";
        let entries = parse_lines(content);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn blank_first_line_does_not_shift_header_detection() {
        // The header heuristic applies to the literal first line only, so a
        // header-looking row after a leading blank line is real data.
        let content = "\nurl\tname\n";
        let entries = parse_lines(content);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "url");
    }

    #[test]
    fn single_column_line_contributes_nothing() {
        let content = "https://host/a.git\trepo-a\nhttps://host/c.git\n";
        let entries = parse_lines(content);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "repo-a");
    }

    #[test]
    fn extra_columns_are_ignored() {
        let content = "https://host/a.git\trepo-a\tstars\t42\n";
        let entries = parse_lines(content);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "https://host/a.git");
        assert_eq!(entries[0].name, "repo-a");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = parse_manifest("definitely/not/a/real/manifest.tsv").unwrap_err();
        assert!(err.to_string().contains("manifest"));
    }
}
