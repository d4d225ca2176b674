//! Structured error taxonomy for the object database, tree codec, and index.
//!
//! Git's own C codebase threads a single process-wide `git_error_t` + message
//! buffer through every call. We carry the same taxonomy but attach context
//! to each variant directly instead of stashing it in shared mutable state,
//! so a caller never has to read from somewhere other than the `Result` it
//! already holds.

use std::path::PathBuf;

use thiserror::Error;

/// The numeric error domain Git's own C implementation exposes, kept around
/// so callers that want a stable integer code (matching `git_error_t`) can
/// get one without matching on every `Error` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorKind {
    Ok = 0,
    Generic = -1,
    InvalidArgument = -2,
    NotFound = -3,
    Exists = -4,
    Ambiguous = -5,
    BufferTooSmall = -6,
    Overflow = -7,
    NoMemory = -8,
    BareRepo = -10,
    UnbornBranch = -11,
    Unmerged = -12,
    NonFastForward = -13,
    InvalidSpec = -14,
    Conflict = -15,
    Locked = -16,
    Modified = -17,
    Auth = -18,
    Certificate = -19,
    Applied = -20,
    Peel = -21,
    UnexpectedEof = -22,
    Uncommitted = -23,
    Directory = -24,
}

impl ErrorKind {
    /// Human-readable name, mirroring the source's `git_error_string`.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Ok => "no error",
            ErrorKind::Generic => "generic error",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::NotFound => "not found",
            ErrorKind::Exists => "already exists",
            ErrorKind::Ambiguous => "ambiguous reference",
            ErrorKind::BufferTooSmall => "buffer too small",
            ErrorKind::Overflow => "overflow",
            ErrorKind::NoMemory => "out of memory",
            ErrorKind::BareRepo => "bare repository",
            ErrorKind::UnbornBranch => "unborn branch",
            ErrorKind::Unmerged => "unmerged entries",
            ErrorKind::NonFastForward => "non-fast-forward",
            ErrorKind::InvalidSpec => "invalid refspec",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Locked => "locked",
            ErrorKind::Modified => "modified",
            ErrorKind::Auth => "authentication required",
            ErrorKind::Certificate => "certificate error",
            ErrorKind::Applied => "already applied",
            ErrorKind::Peel => "cannot peel reference",
            ErrorKind::UnexpectedEof => "unexpected end of file",
            ErrorKind::Uncommitted => "uncommitted changes",
            ErrorKind::Directory => "directory error",
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    Exists(String),

    #[error("corrupt object or index data: {0}")]
    Corrupt(String),

    #[error("payload too large: {size} bytes exceeds the {limit} byte cap")]
    TooLarge { size: u64, limit: u64 },

    #[error("index is full: cannot exceed {0} entries")]
    Overflow(usize),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Maps to the numeric domain Git's C codebase exposes as `git_error_t`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Exists(_) => ErrorKind::Exists,
            Error::Corrupt(_) => ErrorKind::Generic,
            Error::TooLarge { .. } => ErrorKind::Overflow,
            Error::Overflow(_) => ErrorKind::Overflow,
            Error::Io { .. } => ErrorKind::Generic,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
