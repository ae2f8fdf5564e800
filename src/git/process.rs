use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::{GitStampError, Result};
use crate::git::{GitReader, GitSnapshot};

const DEFAULT_EXECUTABLE: &str = "git";

/// Exit status git uses for fatal errors, e.g. outside a repository
const FATAL_EXIT_CODE: i32 = 128;

/// Variables that would point git at a repository other than `location`
const REPOSITORY_ENV_VARS: &[&str] = &[
    "GIT_DIR",
    "GIT_WORK_TREE",
    "GIT_INDEX_FILE",
    "GIT_COMMON_DIR",
    "GIT_OBJECT_DIRECTORY",
    "GIT_ALTERNATE_OBJECT_DIRECTORIES",
];

/// Reader that shells out to the `git` executable
pub struct ProcessReader {
    location: PathBuf,
    executable: String,
}

impl ProcessReader {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        ProcessReader {
            location: location.into(),
            executable: DEFAULT_EXECUTABLE.to_string(),
        }
    }

    /// Use a specific git binary instead of the one on `PATH`
    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Run git in the repository directory.
    ///
    /// Fatal exits become errors; other exit codes are left for the caller
    /// to interpret.
    fn git(&self, args: &[&str]) -> Result<Output> {
        if !self.location.is_dir() {
            return Err(GitStampError::NotARepository(self.location.clone()));
        }

        tracing::trace!(executable = %self.executable, ?args, "running git");

        let mut command = Command::new(&self.executable);
        command
            .args(args)
            .current_dir(&self.location)
            // Keep messages in English so they can be matched below
            .env("LC_ALL", "C");
        for var in REPOSITORY_ENV_VARS {
            command.env_remove(var);
        }

        let output = command
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => GitStampError::process(format!(
                    "git executable '{}' not found",
                    self.executable
                )),
                _ => GitStampError::Io(e),
            })?;

        if output.status.code() == Some(FATAL_EXIT_CODE) {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("not a git repository") {
                return Err(GitStampError::NotARepository(self.location.clone()));
            }
            return Err(GitStampError::process(format!(
                "git {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }

        Ok(output)
    }

    /// Run a `--quiet` query where exit code 1 means "no such thing".
    fn query(&self, args: &[&str]) -> Result<Option<String>> {
        let output = self.git(args)?;

        match output.status.code() {
            Some(0) => {
                let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
                Ok(Some(stdout).filter(|s| !s.is_empty()))
            }
            Some(1) => Ok(None),
            _ => Err(GitStampError::process(format!(
                "git {} exited with {}",
                args.join(" "),
                output.status
            ))),
        }
    }

    /// Run a `--quiet` check where exit code 1 means "no".
    fn check(&self, args: &[&str]) -> Result<bool> {
        let output = self.git(args)?;

        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(GitStampError::process(format!(
                "git {} exited with {}",
                args.join(" "),
                output.status
            ))),
        }
    }

    /// HEAD has no commit. Fine when HEAD names a branch that doesn't exist
    /// yet; anything else means the repository is damaged.
    fn no_head_commit(&self) -> Result<Option<String>> {
        let Some(head_ref) = self.query(&["symbolic-ref", "--quiet", "HEAD"])? else {
            return Err(GitStampError::process(
                "detached HEAD does not resolve to a commit",
            ));
        };

        if self.check(&["show-ref", "--verify", "--quiet", &head_ref])? {
            return Err(GitStampError::process(format!(
                "{} does not resolve to a commit",
                head_ref
            )));
        }

        Ok(None)
    }

    fn tags_at(&self, sha: &str) -> Result<Vec<String>> {
        let output = self.git(&["tag", "--points-at", sha])?;
        if !output.status.success() {
            return Err(GitStampError::process(format!(
                "git tag --points-at {} exited with {}",
                sha, output.status
            )));
        }

        let mut tags: Vec<String> = parse_lines(&output.stdout);
        tags.sort();
        Ok(tags)
    }
}

/// Non-empty trimmed lines of git output
fn parse_lines(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

impl GitReader for ProcessReader {
    fn location(&self) -> &Path {
        &self.location
    }

    fn try_branch(&self) -> Result<Option<String>> {
        // Exit code 1 means HEAD is detached
        self.query(&["symbolic-ref", "--quiet", "--short", "HEAD"])
    }

    fn try_current_tags(&self) -> Result<Vec<String>> {
        match self.try_head_commit_sha()? {
            Some(sha) => self.tags_at(&sha),
            None => Ok(Vec::new()),
        }
    }

    fn try_head_commit_sha(&self) -> Result<Option<String>> {
        match self.query(&["rev-parse", "--verify", "--quiet", "HEAD^{commit}"])? {
            Some(sha) => Ok(Some(sha)),
            None => self.no_head_commit(),
        }
    }

    fn try_snapshot(&self) -> Result<GitSnapshot> {
        let head_commit = self.try_head_commit_sha()?;
        let tags = match &head_commit {
            Some(sha) => self.tags_at(sha)?,
            None => Vec::new(),
        };

        Ok(GitSnapshot {
            branch: self.try_branch()?,
            tags,
            head_commit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_lines() {
        let lines = parse_lines(b"v1.0.0\n\n  v1.0.1  \r\nlatest\n");
        assert_eq!(lines, vec!["v1.0.0", "v1.0.1", "latest"]);
    }

    #[test]
    fn test_parse_lines_empty() {
        assert!(parse_lines(b"").is_empty());
        assert!(parse_lines(b"\n\n").is_empty());
    }

    #[test]
    fn test_missing_directory_is_not_a_repository() {
        let dir = TempDir::new().unwrap();
        let reader = ProcessReader::new(dir.path().join("missing"));

        let err = reader.try_branch().unwrap_err();
        assert!(err.is_not_a_repository());
    }

    #[test]
    fn test_missing_executable_is_a_process_error() {
        let dir = TempDir::new().unwrap();
        let reader = ProcessReader::new(dir.path()).with_executable("git-stamp-no-such-git");

        let err = reader.try_head_commit_sha().unwrap_err();
        assert!(!err.is_not_a_repository());
        assert!(err.to_string().contains("not found"), "{}", err);

        // The permissive query still degrades
        assert_eq!(reader.head_commit_sha(), None);
    }

    #[test]
    fn test_default_executable() {
        assert_eq!(ProcessReader::new(".").executable(), "git");
    }
}
