//! Domain logic - pure version rules independent of git access

pub mod tag;
pub mod version;

pub use tag::{default_tag_to_version, TagPattern, TagToVersion};
pub use version::{
    resolve_version, Clock, EnvProperties, FixedClock, MapProperties, PropertySource,
    ResolvedVersion, SystemClock, VersionSource, VersionSpec,
};
