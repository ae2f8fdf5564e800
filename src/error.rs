use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for git-stamp operations
#[derive(Error, Debug)]
pub enum GitStampError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Not a git repository: {}", .0.display())]
    NotARepository(PathBuf),

    #[error("Git process failed: {0}")]
    Process(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tag pattern error: {0}")]
    Tag(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-stamp
pub type Result<T> = std::result::Result<T, GitStampError>;

impl GitStampError {
    /// Create a process error with context
    pub fn process(msg: impl Into<String>) -> Self {
        GitStampError::Process(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        GitStampError::Config(msg.into())
    }

    /// Create a tag pattern error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        GitStampError::Tag(msg.into())
    }

    /// Whether this error only means "there is no repository here".
    ///
    /// Readers treat this as the legitimate unversioned state rather than a
    /// misconfiguration. Errors from inside a repository, such as a missing
    /// object, never count.
    pub fn is_not_a_repository(&self) -> bool {
        matches!(self, GitStampError::NotARepository(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GitStampError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GitStampError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_not_a_repository_display() {
        let err = GitStampError::NotARepository(PathBuf::from("/tmp/nowhere"));
        assert_eq!(err.to_string(), "Not a git repository: /tmp/nowhere");
        assert!(err.is_not_a_repository());
    }

    #[test]
    fn test_git_errors_are_never_a_missing_repository() {
        // A missing object inside a repository is also NotFound
        let err: GitStampError =
            git2::Error::new(git2::ErrorCode::NotFound, git2::ErrorClass::Odb, "x").into();
        assert!(!err.is_not_a_repository());

        let err: GitStampError =
            git2::Error::new(git2::ErrorCode::GenericError, git2::ErrorClass::Odb, "x").into();
        assert!(!err.is_not_a_repository());
    }

    #[test]
    fn test_process_error_is_not_swallowed_as_missing_repo() {
        assert!(!GitStampError::process("git: command not found").is_not_a_repository());
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (GitStampError::config("x"), "Configuration error"),
            (GitStampError::process("x"), "Git process failed"),
            (GitStampError::tag("x"), "Tag pattern error"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
