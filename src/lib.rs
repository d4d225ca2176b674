//! Core library for a minimal, self-hosted, git-compatible content-addressed
//! version-control object database: hashing, the object store, the tree and
//! commit codecs, the staging index, and a thin reference reader.

pub mod commit;
pub mod compress;
pub mod error;
pub mod hasher;
pub mod index;
pub mod object;
pub mod object_read;
pub mod object_write;
pub mod refs;
pub mod repo;
pub mod tree;
pub mod validate;
pub mod workdir_tree;

pub use error::{Error, ErrorKind, Result};
pub use repo::Repository;
