use crate::error::{GitStampError, Result};
use regex::Regex;

const VERSION_PLACEHOLDER: &str = "{version}";

/// Maps a tag name to the release version it marks, if any.
///
/// Implementations must be total: a tag that is not a release tag maps to
/// `None`, never to an error or a panic. Any `Fn(&str) -> Option<String>`
/// is a mapping, so callers can pass a closure or a plain function.
pub trait TagToVersion {
    fn to_version(&self, tag: &str) -> Option<String>;
}

impl<F> TagToVersion for F
where
    F: Fn(&str) -> Option<String>,
{
    fn to_version(&self, tag: &str) -> Option<String> {
        self(tag)
    }
}

/// Default release-tag mapping: `v` followed by a digit, then anything.
///
/// `"v1.2.3"` becomes `"1.2.3"`; `"release-1.0"` and a bare `"v"` are not
/// release tags.
pub fn default_tag_to_version(tag: &str) -> Option<String> {
    let rest = tag.strip_prefix('v')?;
    if rest.starts_with(|c: char| c.is_ascii_digit()) {
        Some(rest.to_string())
    } else {
        None
    }
}

/// Tag naming pattern (e.g., "v{version}", "release-{version}")
///
/// The `{version}` placeholder matches a digit followed by anything; the
/// matched text is the version.
#[derive(Debug, Clone)]
pub struct TagPattern {
    regex: Regex,
}

impl TagPattern {
    /// Compile a pattern; it must contain exactly one `{version}` placeholder.
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();

        match pattern.matches(VERSION_PLACEHOLDER).count() {
            1 => {}
            0 => {
                return Err(GitStampError::tag(format!(
                    "Pattern '{}' must contain {} placeholder",
                    pattern, VERSION_PLACEHOLDER
                )))
            }
            _ => {
                return Err(GitStampError::tag(format!(
                    "Pattern '{}' must contain {} only once",
                    pattern, VERSION_PLACEHOLDER
                )))
            }
        }

        // Escape everything, then swap the escaped placeholder for a capture group
        let escaped = regex::escape(&pattern);
        let regex_pattern = escaped.replace(r"\{version\}", r"([0-9].*)");

        let regex = Regex::new(&format!("(?s)^{}$", regex_pattern))
            .map_err(|e| GitStampError::tag(format!("Invalid pattern '{}': {}", pattern, e)))?;

        Ok(TagPattern { regex })
    }

    /// Extract the version from a tag following this pattern
    pub fn extract(&self, tag: &str) -> Option<String> {
        self.regex
            .captures(tag)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl TagToVersion for TagPattern {
    fn to_version(&self, tag: &str) -> Option<String> {
        self.extract(tag)
    }
}
