use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};

use super::tag::{default_tag_to_version, TagToVersion};
use crate::git::GitSnapshot;

/// Suffix marking a version that is not a release
pub const SNAPSHOT_SUFFIX: &str = "SNAPSHOT";

/// Environment variable consulted for an explicit version override
pub const DEFAULT_OVERRIDE_PROPERTY: &str = "PROJECT_VERSION";

/// `yyyyMMdd'T'HHmmss`
const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Named properties the override value is looked up in.
pub trait PropertySource {
    fn property(&self, name: &str) -> Option<String>;
}

/// Reads properties from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvProperties;

impl PropertySource for EnvProperties {
    fn property(&self, name: &str) -> Option<String> {
        // Non-UTF-8 values are kept, lossily, rather than treated as unset
        std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
    }
}

/// In-memory property store
#[derive(Debug, Clone, Default)]
pub struct MapProperties {
    values: HashMap<String, String>,
}

impl MapProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl PropertySource for MapProperties {
    fn property(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

/// Source of the current time for dated versions
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stopped at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Which stage of the fallback chain produced a version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    /// Taken verbatim from the override property
    Override,
    /// Derived from a release tag on the head commit
    ReleaseTag { tag: String },
    /// Base version plus the head commit SHA
    Commit,
    /// Base version plus the current UTC timestamp
    Dated,
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSource::Override => write!(f, "override property"),
            VersionSource::ReleaseTag { tag } => write!(f, "release tag '{}'", tag),
            VersionSource::Commit => write!(f, "head commit"),
            VersionSource::Dated => write!(f, "timestamp"),
        }
    }
}

/// The version a build should use, with where it came from.
///
/// Displays as the bare version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub version: String,
    pub source: VersionSource,
}

impl fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.version)
    }
}

/// Caller-owned inputs to version resolution that don't come from git.
pub struct VersionSpec {
    override_property: String,
    base_version: String,
    tag_to_version: Box<dyn TagToVersion + Send + Sync>,
}

impl VersionSpec {
    /// Spec with the default override property and tag mapping
    pub fn new(base_version: impl Into<String>) -> Self {
        VersionSpec {
            override_property: DEFAULT_OVERRIDE_PROPERTY.to_string(),
            base_version: base_version.into(),
            tag_to_version: Box::new(default_tag_to_version),
        }
    }

    pub fn with_override_property(mut self, name: impl Into<String>) -> Self {
        self.override_property = name.into();
        self
    }

    pub fn with_tag_mapping(mut self, mapping: impl TagToVersion + Send + Sync + 'static) -> Self {
        self.tag_to_version = Box::new(mapping);
        self
    }

    pub fn override_property(&self) -> &str {
        &self.override_property
    }

    pub fn base_version(&self) -> &str {
        &self.base_version
    }

    pub fn tag_to_version(&self) -> &dyn TagToVersion {
        self.tag_to_version.as_ref()
    }

    /// Resolve against one snapshot, reading the override from `properties`.
    pub fn resolve(
        &self,
        snapshot: &GitSnapshot,
        properties: &dyn PropertySource,
        clock: &dyn Clock,
    ) -> ResolvedVersion {
        let override_value = properties.property(&self.override_property);

        resolve_version(
            override_value.as_deref(),
            &self.base_version,
            snapshot.head_commit.as_deref(),
            &snapshot.tags,
            self.tag_to_version(),
            clock,
        )
    }
}

impl fmt::Debug for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionSpec")
            .field("override_property", &self.override_property)
            .field("base_version", &self.base_version)
            .finish_non_exhaustive()
    }
}

/// Computes the version via ordered fallback:
/// override, then release tag, then commit, then timestamp.
///
/// Always produces a version; every missing input just moves on to the
/// next stage.
pub fn resolve_version(
    override_value: Option<&str>,
    base_version: &str,
    head_commit: Option<&str>,
    tags: &[String],
    tag_to_version: &dyn TagToVersion,
    clock: &dyn Clock,
) -> ResolvedVersion {
    let resolved = override_version(override_value)
        .or_else(|| release_version(tags, tag_to_version))
        .or_else(|| head_commit.map(|sha| commit_version(base_version, sha)))
        .unwrap_or_else(|| dated_version(base_version, clock.now()));

    tracing::debug!(
        version = %resolved.version,
        source = %resolved.source,
        "resolved version"
    );

    resolved
}

/// Override stage; an empty value counts as unset.
pub fn override_version(override_value: Option<&str>) -> Option<ResolvedVersion> {
    override_value
        .filter(|value| !value.is_empty())
        .map(|value| ResolvedVersion {
            version: value.to_string(),
            source: VersionSource::Override,
        })
}

/// First tag, in the given order, that the mapping turns into a version.
pub fn release_version(
    tags: &[String],
    tag_to_version: &dyn TagToVersion,
) -> Option<ResolvedVersion> {
    tags.iter().find_map(|tag| {
        tag_to_version.to_version(tag).map(|version| ResolvedVersion {
            version,
            source: VersionSource::ReleaseTag { tag: tag.clone() },
        })
    })
}

pub fn commit_version(base_version: &str, head_commit: &str) -> ResolvedVersion {
    ResolvedVersion {
        version: format!("{}-{}-{}", base_version, head_commit, SNAPSHOT_SUFFIX),
        source: VersionSource::Commit,
    }
}

pub fn dated_version(base_version: &str, now: DateTime<Utc>) -> ResolvedVersion {
    ResolvedVersion {
        version: format!(
            "{}-{}-{}",
            base_version,
            now.format(TIMESTAMP_FORMAT),
            SNAPSHOT_SUFFIX
        ),
        source: VersionSource::Dated,
    }
}
