//! Object-store read path: `get(hex_digest) -> (kind, payload)`.

use std::fs;

use crate::compress::inflate;
use crate::error::{Error, Result};
use crate::hasher;
use crate::object::{Object, ObjectKind};
use crate::repo::Repository;
use crate::validate;

impl Repository {
    /// Opens, inflates, and parses the object addressed by `hex_digest`.
    /// Recomputes the digest of the parsed content and rejects a mismatch
    /// with `Corrupt` — a corrupted object file should never be silently
    /// handed back to the caller.
    pub fn get_object(&self, hex_digest: &str) -> Result<Object> {
        validate::validate_hex(hex_digest)?;
        let path = self.object_path(hex_digest);
        let compressed = fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(format!("object {hex_digest} not found"))
            } else {
                Error::io(&path, e)
            }
        })?;

        let raw = inflate(&compressed)?;
        let null_pos = raw
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::Corrupt(format!("object {hex_digest} has no header terminator")))?;

        let header = std::str::from_utf8(&raw[..null_pos])
            .map_err(|_| Error::Corrupt(format!("object {hex_digest} header is not valid UTF-8")))?;
        let (type_str, size_str) = header
            .split_once(' ')
            .ok_or_else(|| Error::Corrupt(format!("object {hex_digest} header is malformed")))?;

        let kind = ObjectKind::from_str(type_str)?;
        let expected_size: usize = size_str
            .parse()
            .map_err(|_| Error::Corrupt(format!("object {hex_digest} has a non-numeric size")))?;

        let payload = raw[null_pos + 1..].to_vec();
        if payload.len() != expected_size {
            return Err(Error::Corrupt(format!(
                "object {hex_digest} declares size {expected_size} but payload is {} bytes",
                payload.len()
            )));
        }

        let recomputed = hasher::hash(&raw);
        if hasher::to_hex(&recomputed) != hex_digest.to_lowercase() {
            return Err(Error::Corrupt(format!(
                "object {hex_digest} content does not hash back to its own name"
            )));
        }

        tracing::debug!(digest = hex_digest, bytes = payload.len(), kind = kind.as_str(), "read object");
        Ok(Object { kind, payload })
    }
}
