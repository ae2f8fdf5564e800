//! Pure formatting functions for UI output.
//!
//! `format_*` functions build the text; `display_*` functions print it.

use crate::domain::version::ResolvedVersion;
use crate::git::GitSnapshot;

const NONE_MARKER: &str = "(none)";

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("\x1b[31mERROR:\x1b[0m {}", message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    eprintln!("\x1b[33m→\x1b[0m {}", message);
}

/// Print only the version, for consumption by scripts.
pub fn display_version(resolved: &ResolvedVersion) {
    println!("{}", resolved);
}

/// Human-readable summary of the repository state and resolved version.
///
/// Plain text, no colors, one `key: value` per line.
pub fn format_info(snapshot: &GitSnapshot, resolved: &ResolvedVersion) -> String {
    let tags = if snapshot.tags.is_empty() {
        NONE_MARKER.to_string()
    } else {
        snapshot.tags.join(", ")
    };

    format!(
        "branch:  {}\nhead:    {}\ntags:    {}\nversion: {} (from {})",
        snapshot.branch.as_deref().unwrap_or(NONE_MARKER),
        snapshot.head_commit.as_deref().unwrap_or(NONE_MARKER),
        tags,
        resolved.version,
        resolved.source
    )
}

pub fn display_info(snapshot: &GitSnapshot, resolved: &ResolvedVersion) {
    println!("{}", format_info(snapshot, resolved));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::version::VersionSource;

    #[test]
    fn test_format_info_full() {
        let snapshot = GitSnapshot {
            branch: Some("main".to_string()),
            tags: vec!["v1.0.0".to_string(), "stable".to_string()],
            head_commit: Some("abc123".to_string()),
        };
        let resolved = ResolvedVersion {
            version: "1.0.0".to_string(),
            source: VersionSource::ReleaseTag {
                tag: "v1.0.0".to_string(),
            },
        };

        let text = format_info(&snapshot, &resolved);
        assert!(text.contains("branch:  main"));
        assert!(text.contains("head:    abc123"));
        assert!(text.contains("tags:    v1.0.0, stable"));
        assert!(text.contains("version: 1.0.0 (from release tag 'v1.0.0')"));
    }

    #[test]
    fn test_format_info_outside_repository() {
        let resolved = ResolvedVersion {
            version: "0.1.0-20240101T000000-SNAPSHOT".to_string(),
            source: VersionSource::Dated,
        };

        let text = format_info(&GitSnapshot::default(), &resolved);
        assert_eq!(text.matches(NONE_MARKER).count(), 3);
        assert!(text.ends_with("(from timestamp)"));
    }
}
