//! Minimal reference reader/writer: `HEAD` dereferencing and branch tips.
//! Full ref management (symbolic ref creation, packed-refs, reflog) is out
//! of scope — this is only what the commit codec's history walk needs.

use std::fs;

use crate::error::{Error, Result};
use crate::hasher::{self, RawDigest};
use crate::repo::Repository;

const SYMREF_PREFIX: &str = "ref: ";

impl Repository {
    /// Resolves `HEAD` to a commit digest. If `HEAD` is a symbolic ref
    /// (`ref: refs/heads/<name>`), dereferences one level by reading the
    /// named ref file; a missing target ref means the branch is unborn.
    /// If `HEAD` holds a raw hex digest, that is a detached HEAD.
    pub fn resolve_head(&self) -> Result<RawDigest> {
        let head = self.read_head()?;
        match head {
            HeadState::Detached(digest) => Ok(digest),
            HeadState::Branch(name) => self.read_branch_tip(&name),
        }
    }

    /// Reads `HEAD` without dereferencing — callers that need to know
    /// whether HEAD is a branch name or a detached digest use this; callers
    /// that just want a commit digest use `resolve_head`.
    pub fn read_head(&self) -> Result<HeadState> {
        let contents = fs::read_to_string(self.head_path()).map_err(|e| Error::io(self.head_path(), e))?;
        let trimmed = contents.trim_end_matches('\n');
        if let Some(ref_path) = trimmed.strip_prefix(SYMREF_PREFIX) {
            let name = ref_path
                .strip_prefix("refs/heads/")
                .ok_or_else(|| Error::Corrupt(format!("HEAD points at unsupported ref {ref_path:?}")))?;
            Ok(HeadState::Branch(name.to_string()))
        } else {
            Ok(HeadState::Detached(hasher::from_hex(trimmed)?))
        }
    }

    /// Reads the tip commit digest of `refs/heads/<name>`. A branch with no
    /// tip file yet is an unborn branch, reported as `NotFound`.
    pub fn read_branch_tip(&self, name: &str) -> Result<RawDigest> {
        let path = self.refs_heads_dir().join(name);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(format!(
                    "branch {name:?} is an unborn branch with no commits yet"
                )));
            }
            Err(e) => return Err(Error::io(&path, e)),
        };
        hasher::from_hex(contents.trim_end_matches('\n'))
    }

    /// Writes `refs/heads/<name>` to point at `digest`, the way `commit`
    /// advances the current branch after creating a new commit.
    pub fn write_branch_tip(&self, name: &str, digest: RawDigest) -> Result<()> {
        let dir = self.refs_heads_dir();
        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        let path = dir.join(name);
        fs::write(&path, format!("{}\n", hasher::to_hex(&digest))).map_err(|e| Error::io(&path, e))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeadState {
    /// `HEAD` names a branch that may or may not have any commits yet.
    Branch(String),
    /// `HEAD` holds a raw commit digest directly.
    Detached(RawDigest),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::at(dir.path().join(".git"));
        repo.init().unwrap();
        (dir, repo)
    }

    #[test]
    fn fresh_repo_has_unborn_main() {
        let (_dir, repo) = test_repo();
        assert_eq!(repo.read_head().unwrap(), HeadState::Branch("main".into()));
        assert!(matches!(repo.resolve_head().unwrap_err(), Error::NotFound(_)));
    }

    #[test]
    fn branch_tip_resolves_after_write() {
        let (_dir, repo) = test_repo();
        let digest = [0x42; 20];
        repo.write_branch_tip("main", digest).unwrap();
        assert_eq!(repo.resolve_head().unwrap(), digest);
    }

    #[test]
    fn detached_head_is_read_directly() {
        let (_dir, repo) = test_repo();
        let digest = [0x77; 20];
        fs::write(repo.head_path(), format!("{}\n", hasher::to_hex(&digest))).unwrap();
        assert_eq!(repo.resolve_head().unwrap(), digest);
    }
}
