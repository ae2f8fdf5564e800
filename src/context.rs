//! Build-wide git state, read once and handed to whatever needs a version.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::domain::version::{Clock, PropertySource, ResolvedVersion, VersionSpec};
use crate::error::Result;
use crate::git::{open_reader, GitReader, GitSnapshot};

/// Everything version resolution needs, resolved up front.
///
/// Construct one per build with [BuildContext::resolve] and pass it by
/// reference; every consumer then sees the same snapshot.
#[derive(Debug)]
pub struct BuildContext {
    location: PathBuf,
    snapshot: GitSnapshot,
    spec: VersionSpec,
}

impl BuildContext {
    pub fn new(location: impl Into<PathBuf>, snapshot: GitSnapshot, spec: VersionSpec) -> Self {
        BuildContext {
            location: location.into(),
            snapshot,
            spec,
        }
    }

    /// Open the configured backend at `location` and take one snapshot.
    ///
    /// In strict mode a failing git (missing executable, corrupt repository)
    /// is an error. A directory that simply isn't a repository is never an
    /// error: it yields an empty snapshot.
    pub fn resolve(config: &Config, location: &Path, strict: bool) -> Result<Self> {
        let spec = config.version_spec()?;
        let reader = open_reader(config.git.backend, location, &config.git.executable);
        Self::from_reader(reader.as_ref(), spec, strict)
    }

    pub fn from_reader(reader: &dyn GitReader, spec: VersionSpec, strict: bool) -> Result<Self> {
        let snapshot = if strict {
            match reader.try_snapshot() {
                Ok(snapshot) => snapshot,
                Err(e) if e.is_not_a_repository() => {
                    tracing::debug!("{}, building without git metadata", e);
                    GitSnapshot::default()
                }
                Err(e) => return Err(e),
            }
        } else {
            reader.snapshot()
        };

        tracing::debug!(
            branch = ?snapshot.branch,
            head = ?snapshot.head_commit,
            tags = ?snapshot.tags,
            "read git snapshot"
        );

        Ok(BuildContext::new(reader.location(), snapshot, spec))
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn snapshot(&self) -> &GitSnapshot {
        &self.snapshot
    }

    pub fn version(&self, properties: &dyn PropertySource, clock: &dyn Clock) -> ResolvedVersion {
        self.spec.resolve(&self.snapshot, properties, clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::version::{FixedClock, MapProperties, VersionSource};
    use crate::git::mock::{MockFailure, MockReader};
    use chrono::{TimeZone, Utc};

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 58).unwrap())
    }

    #[test]
    fn test_context_resolves_from_snapshot() {
        let reader = MockReader::new()
            .with_branch("main")
            .with_tag("v2.0.0")
            .with_tag("other")
            .with_head("abc123");

        let context = BuildContext::from_reader(&reader, VersionSpec::new("1.0"), false).unwrap();
        let resolved = context.version(&MapProperties::new(), &clock());

        assert_eq!(context.snapshot().branch.as_deref(), Some("main"));
        assert_eq!(resolved.version, "2.0.0");
    }

    #[test]
    fn test_strict_mode_surfaces_broken_git() {
        let reader = MockReader::new().failing(MockFailure::Broken);

        assert!(BuildContext::from_reader(&reader, VersionSpec::new("1.0"), true).is_err());

        let context = BuildContext::from_reader(&reader, VersionSpec::new("1.0"), false).unwrap();
        assert_eq!(context.snapshot(), &GitSnapshot::default());
    }

    #[test]
    fn test_strict_mode_tolerates_missing_repository() {
        let reader = MockReader::new().failing(MockFailure::NotARepository);

        let context = BuildContext::from_reader(&reader, VersionSpec::new("1.0"), true).unwrap();
        let resolved = context.version(&MapProperties::new(), &clock());

        assert_eq!(resolved.version, "1.0-20231231T235958-SNAPSHOT");
        assert_eq!(resolved.source, VersionSource::Dated);
    }

    #[test]
    fn test_override_property_from_spec() {
        let reader = MockReader::new().with_tag("v2.0.0");
        let spec = VersionSpec::new("1.0").with_override_property("PINNED");
        let context = BuildContext::from_reader(&reader, spec, false).unwrap();

        let props = MapProperties::new().with("PINNED", "9.9.9");
        assert_eq!(context.version(&props, &clock()).version, "9.9.9");
    }
}
