use std::path::{Path, PathBuf};

use crate::error::{GitStampError, Result};
use crate::git::GitReader;

/// Failure a [MockReader] reports from every query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Behave like a directory outside any repository
    NotARepository,
    /// Behave like a broken git installation
    Broken,
}

/// Mock reader for testing without actual git operations
#[derive(Debug, Clone, Default)]
pub struct MockReader {
    location: PathBuf,
    branch: Option<String>,
    tags: Vec<String>,
    head: Option<String>,
    failure: Option<MockFailure>,
}

impl MockReader {
    /// Create a reader with no branch, tags or commit
    pub fn new() -> Self {
        MockReader::default()
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Add a tag; tags are reported in insertion order
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_head(mut self, sha: impl Into<String>) -> Self {
        self.head = Some(sha.into());
        self
    }

    /// Make every query fail
    pub fn failing(mut self, failure: MockFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    fn check(&self) -> Result<()> {
        match self.failure {
            None => Ok(()),
            Some(MockFailure::NotARepository) => {
                Err(GitStampError::NotARepository(self.location.clone()))
            }
            Some(MockFailure::Broken) => Err(GitStampError::process("mock git is broken")),
        }
    }
}

impl GitReader for MockReader {
    fn location(&self) -> &Path {
        &self.location
    }

    fn try_branch(&self) -> Result<Option<String>> {
        self.check()?;
        Ok(self.branch.clone())
    }

    fn try_current_tags(&self) -> Result<Vec<String>> {
        self.check()?;
        Ok(self.tags.clone())
    }

    fn try_head_commit_sha(&self) -> Result<Option<String>> {
        self.check()?;
        Ok(self.head.clone())
    }
}
