//! Shared object types: the four kinds a Git object can be, and the
//! `"<type> <size>\0"` header every serialized object starts with.

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl ObjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
            ObjectKind::Tag => "tag",
        }
    }

    pub fn from_str(kind: &str) -> Result<Self> {
        match kind {
            "blob" => Ok(ObjectKind::Blob),
            "tree" => Ok(ObjectKind::Tree),
            "commit" => Ok(ObjectKind::Commit),
            "tag" => Ok(ObjectKind::Tag),
            other => Err(Error::Corrupt(format!("unknown object kind {other:?}"))),
        }
    }

    /// Infers a kind from a tree entry's mode, the way `ls-tree` needs to
    /// when it prints an entry without reading the referenced object.
    pub fn from_mode(mode: &str) -> Result<Self> {
        match mode {
            "40000" => Ok(ObjectKind::Tree),
            "160000" => Ok(ObjectKind::Commit),
            "100644" | "100755" | "120000" => Ok(ObjectKind::Blob),
            other => Err(Error::InvalidArgument(format!("{other:?} is not a valid mode"))),
        }
    }
}

/// A decoded object: its kind plus the raw payload bytes (the header is not
/// retained — it is reconstructed on write from `kind` and `payload.len()`).
pub struct Object {
    pub kind: ObjectKind,
    pub payload: Vec<u8>,
}

impl Object {
    pub fn new(kind: ObjectKind, payload: Vec<u8>) -> Self {
        Object { kind, payload }
    }

    /// `"<type> <size>\0"`, the prefix every serialized object carries.
    pub fn header(kind: ObjectKind, size: usize) -> Vec<u8> {
        let mut header = format!("{} {}", kind.as_str(), size).into_bytes();
        header.push(0);
        header
    }

    /// Full serialized form: header ‖ payload. This is exactly what gets
    /// hashed and, separately, deflated.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Object::header(self.kind, self.payload.len());
        out.extend_from_slice(&self.payload);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_matches_git_format() {
        assert_eq!(Object::header(ObjectKind::Blob, 11), b"blob 11\0");
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [ObjectKind::Blob, ObjectKind::Tree, ObjectKind::Commit, ObjectKind::Tag] {
            assert_eq!(ObjectKind::from_str(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_corrupt() {
        assert!(ObjectKind::from_str("widget").is_err());
    }

    #[test]
    fn mode_implies_kind() {
        assert_eq!(ObjectKind::from_mode("40000").unwrap(), ObjectKind::Tree);
        assert_eq!(ObjectKind::from_mode("100644").unwrap(), ObjectKind::Blob);
        assert_eq!(ObjectKind::from_mode("160000").unwrap(), ObjectKind::Commit);
    }
}
