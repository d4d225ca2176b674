//! Streaming SHA-1, the identifier and checksum primitive every other
//! subsystem builds on.
//!
//! We wrap the RustCrypto `sha1` crate rather than hand-rolling FIPS 180-2 —
//! the transform itself is exactly the kind of thing that should never be
//! reimplemented per project.

use sha1::{Digest, Sha1};

pub const DIGEST_SIZE: usize = 20;
pub const HEX_SIZE: usize = 40;

/// A raw 20-byte SHA-1 digest.
pub type RawDigest = [u8; DIGEST_SIZE];

/// Streaming SHA-1 engine: `init -> update* -> finalize`.
#[derive(Default)]
pub struct Hasher(Sha1);

impl Hasher {
    pub fn new() -> Self {
        Hasher(Sha1::new())
    }

    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.0.update(data);
        self
    }

    pub fn finalize(self) -> RawDigest {
        self.0.finalize().into()
    }
}

/// One-shot hash over a single byte slice.
pub fn hash(data: &[u8]) -> RawDigest {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Lowercase, exactly-40-character hex encoding of a digest.
pub fn to_hex(digest: &RawDigest) -> String {
    hex::encode(digest)
}

/// Strict hex decode: exactly 40 characters, all ASCII hex digits
/// (case-insensitive). Anything else is rejected rather than guessed at.
pub fn from_hex(hex_str: &str) -> crate::error::Result<RawDigest> {
    if hex_str.len() != HEX_SIZE || !hex_str.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(crate::error::Error::InvalidArgument(format!(
            "{hex_str:?} is not a 40-character hex digest"
        )));
    }
    let bytes = hex::decode(hex_str)
        .map_err(|e| crate::error::Error::InvalidArgument(format!("bad hex digest: {e}")))?;
    bytes
        .try_into()
        .map_err(|_| crate::error::Error::InvalidArgument("hex digest has the wrong length".into()))
}

/// Cheap well-formedness check used by path/argument validation, without
/// paying for the full decode.
pub fn is_valid_hex(hex_str: &str) -> bool {
    hex_str.len() == HEX_SIZE && hex_str.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_vector() {
        assert_eq!(to_hex(&hash(b"")), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn abc_vector() {
        assert_eq!(
            to_hex(&hash(b"abc")),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn fips_448_bit_vector() {
        let msg = b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq";
        assert_eq!(
            to_hex(&hash(msg)),
            "84983e441c3bd26ebaae4aa1f95129e5e54670f1"
        );
    }

    #[test]
    fn incremental_matches_one_shot() {
        let data = b"the quick brown fox jumps over the lazy dog";
        for split in 0..=data.len() {
            let mut hasher = Hasher::new();
            hasher.update(&data[..split]);
            hasher.update(&data[split..]);
            assert_eq!(hasher.finalize(), hash(data));
        }
    }

    #[test]
    fn hex_round_trip() {
        let digest = hash(b"round trip me");
        let hex_str = to_hex(&digest);
        assert_eq!(from_hex(&hex_str).unwrap(), digest);
    }

    #[test]
    fn hex_rejects_bad_length() {
        assert!(from_hex("abcd").is_err());
        assert!(from_hex(&"a".repeat(41)).is_err());
    }

    #[test]
    fn hex_rejects_non_hex_chars() {
        let bad = "g".repeat(HEX_SIZE);
        assert!(from_hex(&bad).is_err());
    }

    #[test]
    fn hex_accepts_uppercase() {
        let digest = hash(b"case insensitivity");
        let upper = to_hex(&digest).to_uppercase();
        assert_eq!(from_hex(&upper).unwrap(), digest);
    }
}
