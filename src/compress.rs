//! Whole-object zlib compression with a growth policy for decompression,
//! wrapping `flate2` instead of shelling out to an external interpreter the
//! way early revisions of the source did.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::error::{Error, Result};

/// Per-object cap: anything that would decompress past this is aborted
/// rather than followed, guarding against a pathologically expanding stream.
pub const MAX_OBJECT_SIZE: u64 = 100 * 1024 * 1024;

pub fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| Error::io("<in-memory deflate buffer>", e))?;
    encoder
        .finish()
        .map_err(|e| Error::io("<in-memory deflate buffer>", e))
}

/// Inflate a zlib stream whose decompressed size is not known up front.
/// Starts at `4 * input.len()`, then `10 * input.len()`, doubling again from
/// there, bailing out once the 100 MiB object cap would be exceeded.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut capacity = (data.len() as u64 * 4).max(1024);
    loop {
        let mut decoder = ZlibDecoder::new(data);
        let mut buf = Vec::with_capacity(capacity.min(MAX_OBJECT_SIZE) as usize);
        match decoder.by_ref().take(MAX_OBJECT_SIZE + 1).read_to_end(&mut buf) {
            Ok(_) => {
                if buf.len() as u64 > MAX_OBJECT_SIZE {
                    return Err(Error::TooLarge {
                        size: buf.len() as u64,
                        limit: MAX_OBJECT_SIZE,
                    });
                }
                return Ok(buf);
            }
            Err(e) => {
                if capacity >= MAX_OBJECT_SIZE {
                    return Err(Error::Corrupt(format!("failed to inflate object data: {e}")));
                }
                capacity = (capacity * 10).min(MAX_OBJECT_SIZE);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let original = b"the quick brown fox jumps over the lazy dog".repeat(100);
        let compressed = deflate(&original).unwrap();
        let restored = inflate(&compressed).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn round_trip_empty() {
        let compressed = deflate(b"").unwrap();
        assert_eq!(inflate(&compressed).unwrap(), b"");
    }

    #[test]
    fn inflate_rejects_garbage() {
        assert!(inflate(b"not a zlib stream").is_err());
    }
}
