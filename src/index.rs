//! The index (staging area): a sorted, checksum-trailed binary table
//! mapping paths to object digests and cached stat metadata.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::hasher::{self, DIGEST_SIZE, RawDigest};
use crate::object::ObjectKind;
use crate::repo::Repository;
use crate::tree::{self, TreeBuilder};
use crate::validate;

const SIGNATURE: &[u8; 4] = b"DIRC";
const DEFAULT_VERSION: u32 = 2;
const ENTRY_FIXED_SIZE: usize = 62;
const MAX_ENTRIES: usize = 10_000;
const NAME_MASK: u16 = 0x0FFF;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    pub ctime_sec: u32,
    pub ctime_nsec: u32,
    pub mtime_sec: u32,
    pub mtime_nsec: u32,
    pub dev: u32,
    pub ino: u32,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub file_size: u32,
    pub digest: RawDigest,
    pub path: String,
}

impl IndexEntry {
    fn new(path: impl Into<String>, digest: RawDigest, mode: u32) -> Self {
        IndexEntry {
            ctime_sec: 0,
            ctime_nsec: 0,
            mtime_sec: 0,
            mtime_nsec: 0,
            dev: 0,
            ino: 0,
            mode,
            uid: 0,
            gid: 0,
            file_size: 0,
            digest,
            path: path.into(),
        }
    }

    fn flags(&self) -> u16 {
        let len = self.path.len();
        if len < NAME_MASK as usize { len as u16 } else { NAME_MASK }
    }
}

/// Converts one of the fixed mode strings (`"40000"`, `"100644"`, …) into the
/// numeric mode the index file stores, by parsing it as octal — exactly what
/// Git's own `strtoul(mode_str, NULL, 8)` does.
fn mode_str_to_u32(mode: &str) -> Result<u32> {
    u32::from_str_radix(mode, 8).map_err(|_| Error::InvalidArgument(format!("{mode:?} is not a valid octal mode")))
}

fn mode_u32_to_str(mode: u32) -> &'static str {
    match mode {
        0o40000 => "40000",
        0o120000 => "120000",
        0o160000 => "160000",
        0o100755 => "100755",
        _ => "100644",
    }
}

#[derive(Debug)]
pub struct Index {
    version: u32,
    entries: Vec<IndexEntry>,
    dirty: bool,
}

impl Default for Index {
    fn default() -> Self {
        Index {
            version: DEFAULT_VERSION,
            entries: Vec::new(),
            dirty: false,
        }
    }
}

impl Index {
    pub fn new() -> Self {
        Index::default()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn get_by_path(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    pub fn get_by_position(&self, n: usize) -> Option<&IndexEntry> {
        self.entries.get(n)
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.dirty = true;
    }

    /// Loads an index from `path`. A missing file is not an error — it
    /// yields a fresh, empty index at the default version.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Index::new()),
            Err(e) => return Err(Error::io(path, e)),
        };
        Self::decode(&bytes)
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 12 + DIGEST_SIZE {
            return Err(Error::Corrupt("index file is too short".into()));
        }
        let (body, trailer) = bytes.split_at(bytes.len() - DIGEST_SIZE);
        let expected_checksum = hasher::hash(body);
        if expected_checksum.as_slice() != trailer {
            return Err(Error::Corrupt("index checksum does not match contents".into()));
        }

        if &body[0..4] != SIGNATURE {
            return Err(Error::Corrupt("index file has a bad signature".into()));
        }
        let version = u32::from_be_bytes(body[4..8].try_into().unwrap());
        if !(2..=4).contains(&version) {
            return Err(Error::Corrupt(format!("index version {version} is unsupported")));
        }
        let entry_count = u32::from_be_bytes(body[8..12].try_into().unwrap()) as usize;
        if entry_count > MAX_ENTRIES {
            return Err(Error::Overflow(entry_count));
        }

        let mut entries = Vec::with_capacity(entry_count);
        let mut pos = 12;
        for _ in 0..entry_count {
            if pos + ENTRY_FIXED_SIZE > body.len() {
                return Err(Error::Corrupt("index entry is truncated".into()));
            }
            let fixed = &body[pos..pos + ENTRY_FIXED_SIZE];
            let ctime_sec = u32::from_be_bytes(fixed[0..4].try_into().unwrap());
            let ctime_nsec = u32::from_be_bytes(fixed[4..8].try_into().unwrap());
            let mtime_sec = u32::from_be_bytes(fixed[8..12].try_into().unwrap());
            let mtime_nsec = u32::from_be_bytes(fixed[12..16].try_into().unwrap());
            let dev = u32::from_be_bytes(fixed[16..20].try_into().unwrap());
            let ino = u32::from_be_bytes(fixed[20..24].try_into().unwrap());
            let mode = u32::from_be_bytes(fixed[24..28].try_into().unwrap());
            let uid = u32::from_be_bytes(fixed[28..32].try_into().unwrap());
            let gid = u32::from_be_bytes(fixed[32..36].try_into().unwrap());
            let file_size = u32::from_be_bytes(fixed[36..40].try_into().unwrap());
            let mut digest = [0u8; DIGEST_SIZE];
            digest.copy_from_slice(&fixed[40..60]);
            let _flags = u16::from_be_bytes(fixed[60..62].try_into().unwrap());
            pos += ENTRY_FIXED_SIZE;

            let name_end = body[pos..]
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| Error::Corrupt("index entry is missing a path terminator".into()))?;
            let path = std::str::from_utf8(&body[pos..pos + name_end])
                .map_err(|_| Error::Corrupt("index entry path is not valid UTF-8".into()))?
                .to_string();
            pos += name_end + 1;

            let consumed = ENTRY_FIXED_SIZE + name_end + 1;
            let padded = (consumed + 8) & !7;
            let pad_len = padded - consumed;
            if pos + pad_len > body.len() {
                return Err(Error::Corrupt("index entry padding is truncated".into()));
            }
            pos += pad_len;

            entries.push(IndexEntry {
                ctime_sec,
                ctime_nsec,
                mtime_sec,
                mtime_nsec,
                dev,
                ino,
                mode,
                uid,
                gid,
                file_size,
                digest,
                path,
            });
        }

        Ok(Index {
            version,
            entries,
            dirty: false,
        })
    }

    fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(SIGNATURE);
        body.extend_from_slice(&self.version.to_be_bytes());
        body.extend_from_slice(&(self.entries.len() as u32).to_be_bytes());

        for entry in &self.entries {
            body.extend_from_slice(&entry.ctime_sec.to_be_bytes());
            body.extend_from_slice(&entry.ctime_nsec.to_be_bytes());
            body.extend_from_slice(&entry.mtime_sec.to_be_bytes());
            body.extend_from_slice(&entry.mtime_nsec.to_be_bytes());
            body.extend_from_slice(&entry.dev.to_be_bytes());
            body.extend_from_slice(&entry.ino.to_be_bytes());
            body.extend_from_slice(&entry.mode.to_be_bytes());
            body.extend_from_slice(&entry.uid.to_be_bytes());
            body.extend_from_slice(&entry.gid.to_be_bytes());
            body.extend_from_slice(&entry.file_size.to_be_bytes());
            body.extend_from_slice(&entry.digest);
            body.extend_from_slice(&entry.flags().to_be_bytes());

            body.extend_from_slice(entry.path.as_bytes());
            body.push(0);

            let consumed = ENTRY_FIXED_SIZE + entry.path.len() + 1;
            let padded = (consumed + 8) & !7;
            body.resize(body.len() + (padded - consumed), 0);
        }

        let checksum = hasher::hash(&body);
        body.extend_from_slice(&checksum);
        body
    }

    /// Sorts entries, serializes, and writes atomically via a temp file in
    /// the same directory followed by a rename into place.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.entries.sort_by(|a, b| a.path.cmp(&b.path));
        let bytes = self.encode();
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
        tmp.write_all(&bytes).map_err(|e| Error::io(tmp.path(), e))?;
        tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
        self.dirty = false;
        Ok(())
    }

    /// Adds or replaces the entry for `path`. Validates the path and the
    /// capacity ceiling; does not touch the object store.
    pub fn add(&mut self, path: &str, digest: RawDigest, mode: &str) -> Result<()> {
        validate::validate_safe_path(path)?;
        let numeric_mode = mode_str_to_u32(mode)?;

        if let Some(existing) = self.entries.iter_mut().find(|e| e.path == path) {
            existing.digest = digest;
            existing.mode = numeric_mode;
            existing.ctime_sec = 0;
            existing.ctime_nsec = 0;
            existing.mtime_sec = 0;
            existing.mtime_nsec = 0;
            existing.dev = 0;
            existing.ino = 0;
            existing.uid = 0;
            existing.gid = 0;
            existing.file_size = 0;
            self.dirty = true;
            return Ok(());
        }

        if self.entries.len() >= MAX_ENTRIES {
            return Err(Error::Overflow(self.entries.len()));
        }

        let pos = self.entries.partition_point(|e| e.path.as_str() < path);
        self.entries.insert(pos, IndexEntry::new(path, digest, numeric_mode));
        self.dirty = true;
        Ok(())
    }

    /// Stats, reads, hashes, and stores `path` as a blob, then stages it.
    /// Always re-reads and re-hashes the file's current content — there is
    /// no stat-only fast path, so a same-second mtime collision between two
    /// different file contents can never produce a stale staged digest.
    pub fn add_from_workdir(&mut self, repo: &Repository, path: &str) -> Result<()> {
        validate::validate_safe_path(path)?;
        let metadata = fs::symlink_metadata(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(format!("{path} not found"))
            } else {
                Error::io(path, e)
            }
        })?;
        if !metadata.is_file() {
            return Err(Error::InvalidArgument(format!("{path} is not a regular file")));
        }

        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        let digest = repo.put_object(ObjectKind::Blob, &bytes)?;

        let mode = if metadata.permissions().mode() & 0o100 != 0 {
            "100755"
        } else {
            "100644"
        };
        self.add(path, digest, mode)?;

        if let Some(entry) = self.entries.iter_mut().find(|e| e.path == path) {
            entry.ctime_sec = metadata.ctime() as u32;
            entry.ctime_nsec = metadata.ctime_nsec() as u32;
            entry.mtime_sec = metadata.mtime() as u32;
            entry.mtime_nsec = metadata.mtime_nsec() as u32;
            entry.dev = metadata.dev() as u32;
            entry.ino = metadata.ino() as u32;
            entry.uid = metadata.uid();
            entry.gid = metadata.gid();
            entry.file_size = metadata.size() as u32;
        }
        Ok(())
    }

    pub fn remove(&mut self, path: &str) -> Result<()> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.path == path)
            .ok_or_else(|| Error::NotFound(format!("{path} is not staged")))?;
        self.entries.remove(pos);
        self.dirty = true;
        Ok(())
    }

    /// Materializes a nested tree hierarchy from the staged paths, grouping
    /// entries on each path component rather than emitting one flat tree.
    /// This is what lets index-driven and working-tree-driven tree writes
    /// agree on the resulting digest for equivalent content.
    pub fn write_tree(&self, repo: &Repository) -> Result<RawDigest> {
        if self.entries.is_empty() {
            return Err(Error::InvalidArgument("cannot write a tree from an empty index".into()));
        }

        let mut root: BTreeMap<String, PathTreeNode> = BTreeMap::new();
        for entry in &self.entries {
            let components: Vec<&str> = entry.path.split('/').collect();
            insert_path_node(&mut root, &components, mode_u32_to_str(entry.mode), entry.digest)?;
        }
        write_path_tree(repo, &root)
    }

    /// Repopulates the index from a tree object, recursing into
    /// subdirectories and reconstructing full relative paths.
    pub fn read_tree(&mut self, repo: &Repository, tree_digest_hex: &str) -> Result<()> {
        self.clear();
        let mut collected = Vec::new();
        collect_tree_entries(repo, tree_digest_hex, "", &mut collected)?;
        for (path, mode, digest) in collected {
            self.add(&path, digest, mode)?;
        }
        Ok(())
    }
}

enum PathTreeNode {
    File { mode: &'static str, digest: RawDigest },
    Dir(BTreeMap<String, PathTreeNode>),
}

fn insert_path_node(
    map: &mut BTreeMap<String, PathTreeNode>,
    components: &[&str],
    mode: &'static str,
    digest: RawDigest,
) -> Result<()> {
    let head = components[0];
    if components.len() == 1 {
        match map.insert(head.to_string(), PathTreeNode::File { mode, digest }) {
            Some(_) => Err(Error::Exists(format!("duplicate staged path component {head:?}"))),
            None => Ok(()),
        }
    } else {
        let node = map
            .entry(head.to_string())
            .or_insert_with(|| PathTreeNode::Dir(BTreeMap::new()));
        match node {
            PathTreeNode::Dir(sub) => insert_path_node(sub, &components[1..], mode, digest),
            PathTreeNode::File { .. } => Err(Error::InvalidArgument(format!(
                "{head:?} is staged as both a file and a directory"
            ))),
        }
    }
}

fn write_path_tree(repo: &Repository, map: &BTreeMap<String, PathTreeNode>) -> Result<RawDigest> {
    let mut builder = TreeBuilder::new();
    for (name, node) in map {
        match node {
            PathTreeNode::File { mode, digest } => builder.add(*mode, name.clone(), *digest)?,
            PathTreeNode::Dir(sub) => {
                let digest = write_path_tree(repo, sub)?;
                builder.add("40000", name.clone(), digest)?
            }
        }
    }
    builder.write(repo)
}

fn collect_tree_entries(
    repo: &Repository,
    tree_digest_hex: &str,
    prefix: &str,
    out: &mut Vec<(String, &'static str, RawDigest)>,
) -> Result<()> {
    let object = repo.get_object(tree_digest_hex)?;
    if object.kind != ObjectKind::Tree {
        return Err(Error::InvalidArgument(format!("{tree_digest_hex} is not a tree")));
    }
    for entry in tree::decode(&object.payload)? {
        let full_path = if prefix.is_empty() {
            entry.name.clone()
        } else {
            format!("{prefix}/{}", entry.name)
        };
        if entry.mode == "40000" {
            let sub_hex = hasher::to_hex(&entry.digest);
            collect_tree_entries(repo, &sub_hex, &full_path, out)?;
        } else {
            let mode = mode_u32_to_str(mode_str_to_u32(&entry.mode)?);
            out.push((full_path, mode, entry.digest));
        }
    }
    Ok(())
}
