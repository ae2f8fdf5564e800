use std::path::{Path, PathBuf};

use git2::{ErrorCode, Oid, Repository};

use crate::error::{GitStampError, Result};
use crate::git::{GitReader, GitSnapshot};

/// Reader backed by libgit2
///
/// The repository is discovered from `location` on every query, so each
/// answer reflects the working copy at the time it is asked.
pub struct Git2Reader {
    location: PathBuf,
}

impl Git2Reader {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Git2Reader {
            location: location.into(),
        }
    }

    /// Open or discover the git repository at or above the location
    fn open(&self) -> Result<Repository> {
        Repository::discover(&self.location).map_err(|e| {
            if e.code() == ErrorCode::NotFound {
                GitStampError::NotARepository(self.location.clone())
            } else {
                GitStampError::Git(e)
            }
        })
    }
}

fn branch_of(repo: &Repository) -> Result<Option<String>> {
    if repo.head_detached()? {
        return Ok(None);
    }

    match repo.head() {
        Ok(head) => Ok(head.shorthand().map(str::to_string)),
        // HEAD names a branch with no commits yet; report the name anyway
        Err(e) if e.code() == ErrorCode::UnbornBranch => {
            let head = repo.find_reference("HEAD")?;
            Ok(head
                .symbolic_target()
                .map(|target| target.strip_prefix("refs/heads/").unwrap_or(target).to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

fn head_oid(repo: &Repository) -> Result<Option<Oid>> {
    match repo.head() {
        Ok(head) => Ok(Some(head.peel_to_commit()?.id())),
        Err(e) if e.code() == ErrorCode::UnbornBranch => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Tags whose commit is `head`; annotated tags are peeled to their target.
fn tags_at(repo: &Repository, head: Oid) -> Result<Vec<String>> {
    let names = repo.tag_names(None)?;
    let mut tags = Vec::new();

    for name in names.iter().flatten() {
        let Ok(reference) = repo.find_reference(&format!("refs/tags/{}", name)) else {
            continue;
        };
        // Tags on trees or blobs never point at a commit
        let Ok(commit) = reference.peel_to_commit() else {
            continue;
        };

        if commit.id() == head {
            tags.push(name.to_string());
        }
    }

    tags.sort();
    Ok(tags)
}

impl GitReader for Git2Reader {
    fn location(&self) -> &Path {
        &self.location
    }

    fn try_branch(&self) -> Result<Option<String>> {
        branch_of(&self.open()?)
    }

    fn try_current_tags(&self) -> Result<Vec<String>> {
        let repo = self.open()?;
        match head_oid(&repo)? {
            Some(head) => tags_at(&repo, head),
            None => Ok(Vec::new()),
        }
    }

    fn try_head_commit_sha(&self) -> Result<Option<String>> {
        Ok(head_oid(&self.open()?)?.map(|oid| oid.to_string()))
    }

    fn try_snapshot(&self) -> Result<GitSnapshot> {
        let repo = self.open()?;
        let head = head_oid(&repo)?;

        let tags = match head {
            Some(oid) => tags_at(&repo, oid)?,
            None => Vec::new(),
        };

        Ok(GitSnapshot {
            branch: branch_of(&repo)?,
            tags,
            head_commit: head.map(|oid| oid.to_string()),
        })
    }
}
