//! Commit codec: textual encoding of a snapshot (tree, parent, identities,
//! timestamp, message) and the permissive parse the history walk needs.

use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader};

use chrono::Local;

use crate::error::{Error, Result};
use crate::hasher::{self, RawDigest};
use crate::object::ObjectKind;
use crate::repo::Repository;
use crate::validate;

const MAX_MESSAGE_LEN: usize = 10 * 1024;
const MAX_NAME_LEN: usize = 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    pub tree: RawDigest,
    pub parent: Option<RawDigest>,
    pub author: String,
    pub committer: String,
    pub timestamp: i64,
    pub tz_offset: String,
    pub message: String,
}

impl Repository {
    /// Encodes and persists a commit object; returns its digest.
    pub fn put_commit(&self, commit: &Commit) -> Result<RawDigest> {
        if commit.message.len() > MAX_MESSAGE_LEN {
            return Err(Error::InvalidArgument("commit message exceeds 10 KiB".into()));
        }
        if commit.author.len() > MAX_NAME_LEN || commit.committer.len() > MAX_NAME_LEN {
            return Err(Error::InvalidArgument("commit identity exceeds 1 KiB".into()));
        }
        let payload = encode(commit);
        self.put_object(ObjectKind::Commit, &payload)
    }

    /// Reads and parses a commit object by its hex digest.
    pub fn get_commit(&self, hex_digest: &str) -> Result<Commit> {
        let object = self.get_object(hex_digest)?;
        if object.kind != ObjectKind::Commit {
            return Err(Error::InvalidArgument(format!("{hex_digest} is not a commit")));
        }
        decode(&object.payload)
    }
}

fn encode(commit: &Commit) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(&format!("tree {}\n", hasher::to_hex(&commit.tree)));
    if let Some(parent) = commit.parent {
        out.push_str(&format!("parent {}\n", hasher::to_hex(&parent)));
    }
    out.push_str(&format!(
        "author {} {} {}\n",
        commit.author, commit.timestamp, commit.tz_offset
    ));
    out.push_str(&format!(
        "committer {} {} {}\n",
        commit.committer, commit.timestamp, commit.tz_offset
    ));
    out.push('\n');
    out.push_str(&commit.message);
    out.into_bytes()
}

/// Line-oriented parse: `tree`, first `parent`, `author`, `committer`
/// headers, a blank-line separator, then the message. Unknown headers
/// before the blank line are tolerated and skipped; the leading `tree`
/// line is the one thing this refuses to be permissive about.
fn decode(payload: &[u8]) -> Result<Commit> {
    let text = std::str::from_utf8(payload).map_err(|_| Error::Corrupt("commit is not valid UTF-8".into()))?;
    let mut lines = text.split('\n');

    let mut tree = None;
    let mut parent = None;
    let mut author = None;
    let mut committer = None;

    for line in &mut lines {
        if line.is_empty() {
            break;
        }
        if let Some(rest) = line.strip_prefix("tree ") {
            tree = Some(parse_hex(rest)?);
        } else if let Some(rest) = line.strip_prefix("parent ") {
            if parent.is_none() {
                parent = Some(parse_hex(rest)?);
            }
        } else if let Some(rest) = line.strip_prefix("author ") {
            author = Some(rest.to_string());
        } else if let Some(rest) = line.strip_prefix("committer ") {
            committer = Some(rest.to_string());
        }
        // unrecognized headers are tolerated and ignored
    }

    let tree = tree.ok_or_else(|| Error::Corrupt("commit is missing its tree header".into()))?;
    let author = author.ok_or_else(|| Error::Corrupt("commit is missing its author header".into()))?;
    let committer = committer.ok_or_else(|| Error::Corrupt("commit is missing its committer header".into()))?;

    let (author, timestamp, tz_offset) = split_identity_line(&author)?;
    let (committer, _, _) = split_identity_line(&committer)?;

    let message = lines.collect::<Vec<_>>().join("\n");

    Ok(Commit {
        tree,
        parent,
        author,
        committer,
        timestamp,
        tz_offset,
        message,
    })
}

fn parse_hex(hex: &str) -> Result<RawDigest> {
    hasher::from_hex(hex.trim())
}

/// Splits `"Name <email> 1697750400 +0530"` into the leading identity
/// string, the timestamp, and the tz offset.
fn split_identity_line(line: &str) -> Result<(String, i64, String)> {
    let gt = line
        .rfind('>')
        .ok_or_else(|| Error::Corrupt("commit identity line is missing '>'".into()))?;
    let (identity, rest) = line.split_at(gt + 1);
    let mut fields = rest.trim().split_whitespace();
    let timestamp: i64 = fields
        .next()
        .ok_or_else(|| Error::Corrupt("commit identity line is missing a timestamp".into()))?
        .parse()
        .map_err(|_| Error::Corrupt("commit timestamp is not numeric".into()))?;
    let tz_offset = fields
        .next()
        .ok_or_else(|| Error::Corrupt("commit identity line is missing a timezone".into()))?
        .to_string();
    Ok((identity.to_string(), timestamp, tz_offset))
}

/// Current local time, split into Unix seconds and a `±HHMM` offset.
/// Falls back to `+0000` if the local offset cannot be determined.
pub fn local_time_and_offset() -> (i64, String) {
    let now = Local::now();
    let timestamp = now.timestamp();
    let offset_seconds = now.offset().local_minus_utc();
    let hours = offset_seconds / 3600;
    let minutes = (offset_seconds.abs() % 3600) / 60;
    (timestamp, format!("{hours:+03}{minutes:02}"))
}

/// Reads `name = ` / `email = ` out of `~/.gitconfig` rather than introducing
/// a dedicated config subsystem.
pub fn identity_from_gitconfig() -> Result<(String, String)> {
    let mut path = env::home_dir().ok_or_else(|| Error::NotFound("could not determine home directory".into()))?;
    path.push(".gitconfig");
    let file = File::open(&path).map_err(|e| Error::io(&path, e))?;
    let reader = BufReader::new(file);

    let mut name = String::new();
    let mut email = String::new();
    for line in reader.lines() {
        let line = line.map_err(|e| Error::io(&path, e))?;
        if let Some(value) = line.trim().strip_prefix("name = ") {
            name = value.trim().to_string();
        } else if let Some(value) = line.trim().strip_prefix("email = ") {
            email = value.trim().to_string();
        }
        if !name.is_empty() && !email.is_empty() {
            break;
        }
    }
    if name.is_empty() || email.is_empty() {
        return Err(Error::NotFound("user.name/user.email not set in ~/.gitconfig".into()));
    }
    Ok((name, email))
}

/// Formats `"Name <email>"`, validating neither contains a byte that would
/// corrupt the commit header it's embedded in.
pub fn format_identity(name: &str, email: &str) -> Result<String> {
    validate::validate_name(name).map_err(|_| Error::InvalidArgument("author name contains unsafe bytes".into()))?;
    if email.contains(['\n', '\r', '\0']) {
        return Err(Error::InvalidArgument("author email contains unsafe bytes".into()));
    }
    Ok(format!("{name} <{email}>"))
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

    fn sample_commit(tree: RawDigest, parent: Option<RawDigest>) -> Commit {
        Commit {
            tree,
            parent,
            author: "Ada Lovelace <ada@example.com>".into(),
            committer: "Ada Lovelace <ada@example.com>".into(),
            timestamp: 1_697_750_400,
            tz_offset: "+0530".into(),
            message: "Initial commit\n".into(),
        }
    }

    #[test]
    fn encode_decode_round_trips() {
        let (_dir, repo) = test_repo();
        let tree = repo.put_object(ObjectKind::Tree, b"irrelevant-for-this-test").unwrap();
        let commit = sample_commit(tree, None);
        let digest = repo.put_commit(&commit).unwrap();
        let decoded = repo.get_commit(&hasher::to_hex(&digest)).unwrap();
        assert_eq!(decoded.tree, commit.tree);
        assert_eq!(decoded.parent, None);
        assert_eq!(decoded.author, commit.author);
        assert_eq!(decoded.timestamp, commit.timestamp);
        assert_eq!(decoded.tz_offset, commit.tz_offset);
        assert_eq!(decoded.message, "Initial commit\n");
    }

    #[test]
    fn parent_round_trips() {
        let (_dir, repo) = test_repo();
        let tree = repo.put_object(ObjectKind::Tree, b"t").unwrap();
        let parent_commit = sample_commit(tree, None);
        let parent_digest = repo.put_commit(&parent_commit).unwrap();

        let child_commit = sample_commit(tree, Some(parent_digest));
        let child_digest = repo.put_commit(&child_commit).unwrap();
        let decoded = repo.get_commit(&hasher::to_hex(&child_digest)).unwrap();
        assert_eq!(decoded.parent, Some(parent_digest));
    }

    #[test]
    fn rejects_oversize_message() {
        let (_dir, repo) = test_repo();
        let tree = repo.put_object(ObjectKind::Tree, b"t").unwrap();
        let mut commit = sample_commit(tree, None);
        commit.message = "x".repeat(MAX_MESSAGE_LEN + 1);
        assert!(repo.put_commit(&commit).is_err());
    }

    #[test]
    fn format_identity_round_trips_through_commit() {
        let identity = format_identity("Ada Lovelace", "ada@example.com").unwrap();
        assert_eq!(identity, "Ada Lovelace <ada@example.com>");
    }

    #[test]
    fn tz_offset_has_expected_shape() {
        let (_, offset) = local_time_and_offset();
        assert_eq!(offset.len(), 5);
        assert!(offset.starts_with('+') || offset.starts_with('-'));
    }
}
