pub mod cli;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod git;
pub mod ui;

pub use context::BuildContext;
pub use domain::{default_tag_to_version, resolve_version, ResolvedVersion, VersionSpec};
pub use error::{GitStampError, Result};
pub use git::{open_reader, GitBackend, GitReader, GitSnapshot};
