//! Directory materialization: recursively snapshot a working-tree directory
//! into a tree object, the way `write-tree` needs to.

use std::cmp::Ordering;
use std::fs::Metadata;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use ignore::WalkBuilder;

use crate::error::{Error, Result};
use crate::hasher::RawDigest;
use crate::object::ObjectKind;
use crate::repo::Repository;
use crate::tree::TreeBuilder;

/// Nested directories deeper than this are rejected rather than silently
/// truncated — a symlink loop or a pathological tree should fail loudly.
const MAX_TREE_DEPTH: u32 = 100;

impl Repository {
    /// Materializes the working directory rooted at `path` (relative to the
    /// process's current directory) as a tree object and returns its digest.
    /// `.git` is always skipped. An entirely empty working tree is rejected
    /// with `InvalidArgument` — there is no such thing as an empty commit
    /// here.
    pub fn write_tree_from_workdir(&self, path: &Path) -> Result<RawDigest> {
        match write_tree_recursive(self, path, 0)? {
            Some(digest) => Ok(digest),
            None => Err(Error::InvalidArgument(format!(
                "{} has no trackable content",
                path.display()
            ))),
        }
    }
}

fn write_tree_recursive(repo: &Repository, path: &Path, depth: u32) -> Result<Option<RawDigest>> {
    if depth >= MAX_TREE_DEPTH {
        return Err(Error::InvalidArgument(format!(
            "directory tree exceeds the maximum depth of {MAX_TREE_DEPTH}"
        )));
    }

    let walker = WalkBuilder::new(path).max_depth(Some(1)).hidden(false).build();
    let mut entries: Vec<_> = walker
        .filter_map(|e| {
            let entry = e.ok()?;
            if entry.depth() == 0 || entry.file_name() == ".git" {
                None
            } else {
                Some(entry)
            }
        })
        .collect();

    entries.sort_unstable_by(|a, b| {
        let af = a.file_name().as_encoded_bytes();
        let bf = b.file_name().as_encoded_bytes();
        let min_len = af.len().min(bf.len());
        match af[..min_len].cmp(&bf[..min_len]) {
            Ordering::Equal => {}
            other => return other,
        }
        let a1 = af.get(min_len).copied().or(a.path().is_dir().then_some(b'/'));
        let b1 = bf.get(min_len).copied().or(b.path().is_dir().then_some(b'/'));
        a1.cmp(&b1)
    });

    let mut builder = TreeBuilder::new();
    for entry in entries {
        let entry_path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        if entry_path.is_dir() {
            let child_digest = write_tree_recursive(repo, entry_path, depth + 1)?.ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "{} is an empty directory and cannot be represented as a tree",
                    entry_path.display()
                ))
            })?;
            builder.add("40000", name, child_digest)?;
        } else {
            let metadata = entry_path
                .metadata()
                .map_err(|e| Error::io(entry_path, e))?;
            let bytes = std::fs::read(entry_path).map_err(|e| Error::io(entry_path, e))?;
            let digest = repo.put_object(ObjectKind::Blob, &bytes)?;
            let mode = mode_for(&metadata);
            builder.add(mode, name, digest)?;
        }
    }

    if builder.is_empty() {
        Ok(None)
    } else {
        Ok(Some(builder.write(repo)?))
    }
}

fn mode_for(meta: &Metadata) -> &'static str {
    if meta.is_symlink() {
        "120000"
    } else if meta.permissions().mode() & 0o100 != 0 {
        "100755"
    } else {
        "100644"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher;
    use std::fs;

    fn test_repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::at(dir.path().join(".git"));
        repo.init().unwrap();
        (dir, repo)
    }

    #[test]
    fn snapshots_flat_directory() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), b"A").unwrap();

        let digest = repo.write_tree_from_workdir(dir.path()).unwrap();
        let object = repo.get_object(&hasher::to_hex(&digest)).unwrap();
        assert_eq!(object.kind, ObjectKind::Tree);

        let entries = crate::tree::decode(&object.payload).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "a.txt");
        assert_eq!(entries[0].mode, "100644");
    }

    #[test]
    fn snapshots_nested_directory_in_slash_order() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), b"A").unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("b").join("c.txt"), b"C").unwrap();

        let digest = repo.write_tree_from_workdir(dir.path()).unwrap();
        let object = repo.get_object(&hasher::to_hex(&digest)).unwrap();
        let entries = crate::tree::decode(&object.payload).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "a.txt");
        assert_eq!(entries[1].name, "b");
        assert_eq!(entries[1].mode, "40000");

        let sub = repo.get_object(&hasher::to_hex(&entries[1].digest)).unwrap();
        let sub_entries = crate::tree::decode(&sub.payload).unwrap();
        assert_eq!(sub_entries.len(), 1);
        assert_eq!(sub_entries[0].name, "c.txt");
    }

    #[test]
    fn empty_directory_is_rejected() {
        let (dir, repo) = test_repo();
        let err = repo.write_tree_from_workdir(dir.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn nested_empty_directory_fails_the_whole_walk() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), b"A").unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();

        let err = repo.write_tree_from_workdir(dir.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn skips_git_directory() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), b"A").unwrap();

        let digest = repo.write_tree_from_workdir(dir.path()).unwrap();
        let object = repo.get_object(&hasher::to_hex(&digest)).unwrap();
        let entries = crate::tree::decode(&object.payload).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "a.txt");
    }
}
