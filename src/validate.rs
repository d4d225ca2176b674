//! Input validation shared by the object store, tree codec, and index:
//! hex-digest well-formedness, safe relative paths, and octal mode strings.

use std::path::{Component, Path, PathBuf};

use crate::error::Error;
use crate::hasher;

pub const MAX_PATH_LEN: usize = 4096;

/// The modes a tree entry or index entry is allowed to carry.
pub const VALID_MODES: &[&str] = &["40000", "100644", "100755", "120000", "160000"];

pub fn validate_hex(hex_str: &str) -> crate::error::Result<()> {
    if hasher::is_valid_hex(hex_str) {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "{hex_str:?} is not a 40-character hex digest"
        )))
    }
}

pub fn validate_mode(mode: &str) -> crate::error::Result<()> {
    if VALID_MODES.contains(&mode) {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!("{mode:?} is not a valid mode")))
    }
}

/// Rejects absolute paths, `..` traversal, embedded NUL, and embedded CR/LF,
/// and enforces the length cap. Mirrors Git's own `git_validate_safe_path`,
/// translated to `Path` semantics.
pub fn validate_safe_path(path: &str) -> crate::error::Result<()> {
    if path.is_empty() {
        return Err(Error::InvalidArgument("path is empty".into()));
    }
    if path.len() >= MAX_PATH_LEN {
        return Err(Error::InvalidArgument(format!(
            "path {path:?} exceeds the {MAX_PATH_LEN} byte cap"
        )));
    }
    if path.bytes().any(|b| b == 0 || b == b'\n' || b == b'\r') {
        return Err(Error::InvalidArgument(format!(
            "path {path:?} contains a NUL or line-break byte"
        )));
    }
    let as_path = Path::new(path);
    if as_path.is_absolute() {
        return Err(Error::InvalidArgument(format!("path {path:?} is absolute")));
    }
    for component in as_path.components() {
        match component {
            Component::ParentDir => {
                return Err(Error::InvalidArgument(format!(
                    "path {path:?} contains a '..' component"
                )));
            }
            Component::Normal(part) if part.is_empty() => {
                return Err(Error::InvalidArgument(format!("path {path:?} has an empty component")));
            }
            _ => {}
        }
    }
    Ok(())
}

/// A single path component, as used inside a tree entry: no `/` and no NUL.
pub fn validate_name(name: &str) -> crate::error::Result<()> {
    if name.is_empty() || name.contains('/') || name.contains('\0') {
        return Err(Error::InvalidArgument(format!(
            "{name:?} is not a valid tree entry name"
        )));
    }
    Ok(())
}

/// Joins `base` and `path`, refusing to escape `base` via `..` components.
pub fn safe_path_join(base: &Path, path: &str) -> crate::error::Result<PathBuf> {
    validate_safe_path(path)?;
    Ok(base.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_absolute_and_traversal() {
        assert!(validate_safe_path("/etc/passwd").is_err());
        assert!(validate_safe_path("../secret").is_err());
        assert!(validate_safe_path("a/../b").is_err());
    }

    #[test]
    fn rejects_control_bytes() {
        assert!(validate_safe_path("a\0b").is_err());
        assert!(validate_safe_path("a\nb").is_err());
        assert!(validate_safe_path("a\rb").is_err());
    }

    #[test]
    fn accepts_ordinary_relative_paths() {
        assert!(validate_safe_path("src/main.c").is_ok());
        assert!(validate_safe_path("README.md").is_ok());
    }

    #[test]
    fn mode_validation() {
        assert!(validate_mode("100644").is_ok());
        assert!(validate_mode("40000").is_ok());
        assert!(validate_mode("999999").is_err());
    }

    #[test]
    fn name_rejects_slash_and_nul() {
        assert!(validate_name("foo/bar").is_err());
        assert!(validate_name("foo\0").is_err());
        assert!(validate_name("foo").is_ok());
    }
}
