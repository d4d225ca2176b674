//! Object-store write path: `put(type, payload) -> digest`.

use std::fs;
use std::io::Write;

use tempfile::NamedTempFile;

use crate::compress::{MAX_OBJECT_SIZE, deflate};
use crate::error::{Error, Result};
use crate::hasher::{self, RawDigest};
use crate::object::{Object, ObjectKind};
use crate::repo::Repository;

impl Repository {
    /// Serializes, hashes, and durably persists `payload` as an object of
    /// `kind`. Idempotent: writing the same content twice leaves the
    /// filesystem in the same state and is not an error.
    pub fn put_object(&self, kind: ObjectKind, payload: &[u8]) -> Result<RawDigest> {
        if payload.len() as u64 > MAX_OBJECT_SIZE {
            return Err(Error::TooLarge {
                size: payload.len() as u64,
                limit: MAX_OBJECT_SIZE,
            });
        }

        let object = Object::new(kind, payload.to_vec());
        let serialized = object.serialize();
        let digest = hasher::hash(&serialized);
        let hex = hasher::to_hex(&digest);

        let dir = self.objects_dir().join(&hex[..2]);
        let final_path = dir.join(&hex[2..]);
        if final_path.exists() {
            tracing::debug!(digest = %hex, bytes = payload.len(), "object already present, skipping write");
            return Ok(digest);
        }

        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;

        let compressed = deflate(&serialized)?;
        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| Error::io(&dir, e))?;
        tmp.write_all(&compressed)
            .map_err(|e| Error::io(tmp.path(), e))?;
        tmp.persist(&final_path)
            .map_err(|e| Error::io(&final_path, e.error))?;

        tracing::debug!(digest = %hex, bytes = payload.len(), "wrote object");
        Ok(digest)
    }

    /// Probes for an object's presence without reading or inflating it.
    pub fn has_object(&self, hex_digest: &str) -> bool {
        crate::validate::validate_hex(hex_digest).is_ok() && self.object_path(hex_digest).exists()
    }

    pub(crate) fn object_path(&self, hex_digest: &str) -> std::path::PathBuf {
        self.objects_dir()
            .join(&hex_digest[..2])
            .join(&hex_digest[2..])
    }
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
    fn known_blob_value() {
        let (_dir, repo) = test_repo();
        let digest = repo.put_object(ObjectKind::Blob, b"hello world").unwrap();
        assert_eq!(hasher::to_hex(&digest), "95d09f2b10159347eece71399a7e2e907ea3df4f");
    }

    #[test]
    fn put_is_idempotent() {
        let (_dir, repo) = test_repo();
        let d1 = repo.put_object(ObjectKind::Blob, b"same content").unwrap();
        let d2 = repo.put_object(ObjectKind::Blob, b"same content").unwrap();
        assert_eq!(d1, d2);
    }

    #[test]
    fn rejects_oversize_payload() {
        let (_dir, repo) = test_repo();
        // Don't actually allocate 100MiB+1 in a unit test; exercising the
        // boundary check with a forged size via a smaller cap would require
        // a seam we don't have, so this test instead checks the constant
        // matches the documented 100 MiB object cap.
        assert_eq!(MAX_OBJECT_SIZE, 100 * 1024 * 1024);
    }
}
