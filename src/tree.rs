//! Tree codec: encoding, decoding, and the Git-compatible sort order that
//! makes tree hashes stable across implementations.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::hasher::{DIGEST_SIZE, RawDigest};
use crate::object::ObjectKind;
use crate::repo::Repository;
use crate::validate;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: String,
    pub name: String,
    pub digest: RawDigest,
}

impl TreeEntry {
    pub fn new(mode: impl Into<String>, name: impl Into<String>, digest: RawDigest) -> Self {
        TreeEntry {
            mode: mode.into(),
            name: name.into(),
            digest,
        }
    }

    fn is_dir(&self) -> bool {
        self.mode == "40000"
    }

    /// The sort key Git uses: the name, with a trailing `/` appended for
    /// directories, compared byte-wise. This is what makes `foo` sort before
    /// `foo.c` but after `foo/` (remember `/` is 0x2F, `.` is 0x2E, so a bare
    /// `foo` ties with the prefix of `foo.c` and `foo/` until the byte after
    /// the shared prefix breaks the tie).
    fn sort_key(&self) -> Vec<u8> {
        let mut key = self.name.clone().into_bytes();
        if self.is_dir() {
            key.push(b'/');
        }
        key
    }
}

fn compare_entries(a: &TreeEntry, b: &TreeEntry) -> Ordering {
    a.sort_key().cmp(&b.sort_key())
}

/// Concatenates `mode ' ' name '\0' digest` for each entry, in the order
/// given. Callers are expected to have already sorted (`TreeBuilder` does
/// this for them); this function does not sort on its own so that a decoded
/// tree can be re-encoded byte-for-byte without second-guessing its order.
pub fn encode(entries: &[TreeEntry]) -> Vec<u8> {
    let mut out = Vec::new();
    for entry in entries {
        out.extend_from_slice(entry.mode.as_bytes());
        out.push(b' ');
        out.extend_from_slice(entry.name.as_bytes());
        out.push(0);
        out.extend_from_slice(&entry.digest);
    }
    out
}

/// Parses a tree payload back into its entries. Any truncation or missing
/// separator is `Corrupt`; an unrecognized mode is `Corrupt` too.
pub fn decode(payload: &[u8]) -> Result<Vec<TreeEntry>> {
    let mut entries = Vec::new();
    let mut pos = 0;
    while pos < payload.len() {
        let space = payload[pos..]
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| Error::Corrupt("tree entry is missing a mode separator".into()))?;
        let mode = std::str::from_utf8(&payload[pos..pos + space])
            .map_err(|_| Error::Corrupt("tree entry mode is not valid UTF-8".into()))?;
        validate::validate_mode(mode).map_err(|_| Error::Corrupt(format!("tree entry has an invalid mode {mode:?}")))?;
        pos += space + 1;

        let nul = payload[pos..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::Corrupt("tree entry is missing a name terminator".into()))?;
        let name = std::str::from_utf8(&payload[pos..pos + nul])
            .map_err(|_| Error::Corrupt("tree entry name is not valid UTF-8".into()))?
            .to_string();
        pos += nul + 1;

        if pos + DIGEST_SIZE > payload.len() {
            return Err(Error::Corrupt("tree entry is truncated before its digest".into()));
        }
        let mut digest = [0u8; DIGEST_SIZE];
        digest.copy_from_slice(&payload[pos..pos + DIGEST_SIZE]);
        pos += DIGEST_SIZE;

        entries.push(TreeEntry::new(mode, name, digest));
    }
    Ok(entries)
}

/// Mutable container entries are added to; on `write` it sorts, encodes, and
/// submits to the object store.
#[derive(Default)]
pub struct TreeBuilder {
    entries: Vec<TreeEntry>,
    names: BTreeSet<String>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        TreeBuilder::default()
    }

    /// Adds an entry. Fails with `Exists` if the name is already present —
    /// Git trees cannot have two entries that collide on name regardless of
    /// mode.
    pub fn add(&mut self, mode: impl Into<String>, name: impl Into<String>, digest: RawDigest) -> Result<()> {
        let mode = mode.into();
        let name = name.into();
        validate::validate_mode(&mode)?;
        validate::validate_name(&name)?;
        if !self.names.insert(name.clone()) {
            return Err(Error::Exists(format!("tree already has an entry named {name:?}")));
        }
        self.entries.push(TreeEntry::new(mode, name, digest));
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorts, encodes, and persists this builder's entries as a tree object.
    /// An empty tree is rejected with `InvalidArgument` — callers that reach
    /// an empty directory must decide for themselves whether to skip it.
    pub fn write(mut self, repo: &Repository) -> Result<RawDigest> {
        if self.entries.is_empty() {
            return Err(Error::InvalidArgument("cannot write an empty tree".into()));
        }
        self.entries.sort_by(compare_entries);
        let payload = encode(&self.entries);
        repo.put_object(ObjectKind::Tree, &payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher;

    fn digest_of(byte: u8) -> RawDigest {
        [byte; DIGEST_SIZE]
    }

    #[test]
    fn encode_decode_round_trip() {
        let entries = vec![
            TreeEntry::new("100644", "a.txt", digest_of(1)),
            TreeEntry::new("40000", "b", digest_of(2)),
        ];
        let encoded = encode(&entries);
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, entries);
    }

    #[test]
    fn directory_suffix_sort_order() {
        let mut builder = TreeBuilder::new();
        builder.add("100644", "foo", digest_of(1)).unwrap();
        builder.add("100644", "foo.c", digest_of(2)).unwrap();
        builder.add("40000", "foo", digest_of(3)).unwrap_err(); // name collision with file "foo"
        builder.add("40000", "fop", digest_of(3)).unwrap();

        let mut entries = vec![
            TreeEntry::new("100644", "foo", digest_of(1)),
            TreeEntry::new("100644", "foo.c", digest_of(2)),
            TreeEntry::new("40000", "fop", digest_of(3)),
        ];
        entries.sort_by(compare_entries);
        // "foo" < "foo.c" < "fop/" byte-wise: 'o' (0x6F) < '.' (0x2E) is false,
        // so the real Git rule is exercised with a directory and a plain
        // prefix that actually collide on name instead.
        assert_eq!(entries[0].name, "foo");
    }

    #[test]
    fn dir_vs_file_same_prefix_sorts_by_slash() {
        // "foo" (file) vs "foo" as a directory name is a name collision and
        // forbidden; the meaningful case is "foo.c" (file) vs "foo" (dir),
        // where the dir's effective name "foo/" must sort before "foo.c"
        // because '/' (0x2F) < '.' (0x2E) is false... so pick bar/bar.c
        // instead, where '/' (0x2F) > '.' (0x2E) decides the order the
        // other way from a naive strcmp on raw names.
        let file = TreeEntry::new("100644", "bar.c", digest_of(1));
        let dir = TreeEntry::new("40000", "bar", digest_of(2));
        let mut entries = vec![file.clone(), dir.clone()];
        entries.sort_by(compare_entries);
        // effective names: "bar.c" vs "bar/" -> '.' (0x2E) < '/' (0x2F)
        assert_eq!(entries[0].name, "bar.c");
        assert_eq!(entries[1].name, "bar");
    }

    #[test]
    fn empty_tree_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::at(dir.path().join(".git"));
        repo.init().unwrap();
        let builder = TreeBuilder::new();
        assert!(builder.write(&repo).is_err());
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut builder = TreeBuilder::new();
        builder.add("100644", "dup", digest_of(1)).unwrap();
        assert!(builder.add("100755", "dup", digest_of(2)).is_err());
    }

    #[test]
    fn same_entry_set_encodes_deterministically() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::at(dir.path().join(".git"));
        repo.init().unwrap();

        let mut b1 = TreeBuilder::new();
        b1.add("100644", "a.txt", digest_of(9)).unwrap();
        b1.add("40000", "b", digest_of(8)).unwrap();
        let d1 = b1.write(&repo).unwrap();

        let mut b2 = TreeBuilder::new();
        b2.add("40000", "b", digest_of(8)).unwrap();
        b2.add("100644", "a.txt", digest_of(9)).unwrap();
        let d2 = b2.write(&repo).unwrap();

        assert_eq!(hasher::to_hex(&d1), hasher::to_hex(&d2));
    }
}
