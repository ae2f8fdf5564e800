//! Read-only git access
//!
//! This module provides a trait-based abstraction over the few git queries
//! git-stamp needs, with interchangeable implementations:
//!
//! - [repository::Git2Reader]: embedded library backend using the `git2` crate
//! - [process::ProcessReader]: spawns the `git` executable and parses its output
//! - [mock::MockReader]: canned answers for testing
//!
//! The backend is picked explicitly through [GitBackend], usually from
//! configuration.
//!
//! ```rust
//! # use git_stamp::git::{open_reader, GitBackend};
//! # use std::path::Path;
//! let reader = open_reader(GitBackend::Library, Path::new("."), "git");
//! let snapshot = reader.snapshot();
//! println!("on {:?} at {:?}", snapshot.branch, snapshot.head_commit);
//! ```

pub mod mock;
pub mod process;
pub mod repository;

pub use mock::MockReader;
pub use process::ProcessReader;
pub use repository::Git2Reader;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Branch, tags and head commit read together from one working copy.
///
/// All fields are empty when the location is not a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitSnapshot {
    pub branch: Option<String>,
    pub tags: Vec<String>,
    pub head_commit: Option<String>,
}

/// Read-only queries against a working copy
///
/// Implementors provide the fallible `try_*` queries. The plain queries are
/// derived from them and never fail: any error is logged and reported as the
/// absent value, so unversioned projects still get a (dated) version.
///
/// ## Thread Safety
///
/// All implementors must be `Send + Sync` to allow safe sharing across threads.
pub trait GitReader: Send + Sync {
    /// Directory the reader was opened on
    fn location(&self) -> &Path;

    /// Short name of the checked-out branch; `Ok(None)` when HEAD is detached
    fn try_branch(&self) -> Result<Option<String>>;

    /// Names of tags pointing at the head commit, sorted by name
    fn try_current_tags(&self) -> Result<Vec<String>>;

    /// Full SHA of the head commit; `Ok(None)` before the first commit
    fn try_head_commit_sha(&self) -> Result<Option<String>>;

    /// Read all three queries in one go.
    fn try_snapshot(&self) -> Result<GitSnapshot> {
        Ok(GitSnapshot {
            branch: self.try_branch()?,
            tags: self.try_current_tags()?,
            head_commit: self.try_head_commit_sha()?,
        })
    }

    fn branch(&self) -> Option<String> {
        absent_on_error(self.location(), "branch", self.try_branch()).flatten()
    }

    fn current_tags(&self) -> Vec<String> {
        absent_on_error(self.location(), "current tags", self.try_current_tags())
            .unwrap_or_default()
    }

    fn head_commit_sha(&self) -> Option<String> {
        absent_on_error(self.location(), "head commit", self.try_head_commit_sha()).flatten()
    }

    fn snapshot(&self) -> GitSnapshot {
        absent_on_error(self.location(), "snapshot", self.try_snapshot()).unwrap_or_default()
    }
}

/// Collapse a query failure to `None`, logging it first.
///
/// A missing repository is the ordinary unversioned case and only logged at
/// debug level; anything else likely means git is misconfigured.
fn absent_on_error<T>(location: &Path, query: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) if e.is_not_a_repository() => {
            tracing::debug!(location = %location.display(), query, "no git repository: {}", e);
            None
        }
        Err(e) => {
            tracing::warn!(location = %location.display(), query, "git query failed: {}", e);
            None
        }
    }
}

/// How git is invoked
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum GitBackend {
    /// Embedded libgit2 via the `git2` crate
    #[default]
    Library,
    /// External `git` executable
    Process,
}

impl fmt::Display for GitBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitBackend::Library => write!(f, "library"),
            GitBackend::Process => write!(f, "process"),
        }
    }
}

/// Build a reader for `location` using the chosen backend.
///
/// `executable` is only used by the process backend. Opening never fails;
/// problems surface on the first query.
pub fn open_reader(backend: GitBackend, location: &Path, executable: &str) -> Box<dyn GitReader> {
    tracing::debug!(%backend, location = %location.display(), "opening git reader");

    match backend {
        GitBackend::Library => Box::new(Git2Reader::new(location)),
        GitBackend::Process => Box::new(ProcessReader::new(location).with_executable(executable)),
    }
}
