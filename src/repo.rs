//! Repository handle: resolves the `.git` root every other subsystem writes
//! under. There is no hidden global — every operation is a method on a
//! `Repository` value built from an explicit root.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Repository {
    /// Path to the `.git` directory itself (not its parent worktree).
    git_dir: PathBuf,
}

impl Repository {
    /// Opens a repository whose `.git` directory is `git_dir`, without
    /// requiring it to already exist (used by `init`).
    pub fn at(git_dir: impl Into<PathBuf>) -> Self {
        Repository {
            git_dir: git_dir.into(),
        }
    }

    /// Discovers a repository by assuming `./.git` relative to the current
    /// working directory, the convention Git itself assumes before walking
    /// up parent directories.
    pub fn discover() -> Result<Self> {
        let git_dir = PathBuf::from(".git");
        if !git_dir.is_dir() {
            return Err(Error::NotFound(
                "not a git repository (no .git directory found)".into(),
            ));
        }
        Ok(Repository { git_dir })
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn objects_dir(&self) -> PathBuf {
        self.git_dir.join("objects")
    }

    pub fn index_path(&self) -> PathBuf {
        self.git_dir.join("index")
    }

    pub fn head_path(&self) -> PathBuf {
        self.git_dir.join("HEAD")
    }

    pub fn refs_heads_dir(&self) -> PathBuf {
        self.git_dir.join("refs").join("heads")
    }

    /// Initializes the on-disk layout: `objects/`, `refs/heads/`, and a
    /// `HEAD` pointing at the (as yet unborn) `main` branch.
    pub fn init(&self) -> Result<()> {
        std::fs::create_dir_all(self.objects_dir())
            .map_err(|e| Error::io(self.objects_dir(), e))?;
        std::fs::create_dir_all(self.refs_heads_dir())
            .map_err(|e| Error::io(self.refs_heads_dir(), e))?;
        let head_path = self.head_path();
        if !head_path.exists() {
            std::fs::write(&head_path, b"ref: refs/heads/main\n")
                .map_err(|e| Error::io(head_path, e))?;
        }
        Ok(())
    }
}
