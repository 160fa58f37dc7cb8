//! Custom error types for the stardict2db crate.

use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum StarDictError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// An error originating from the destination SQLite store.
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    /// A required source file is absent from the dictionary directory.
    #[error("missing {kind} file in {dir}")]
    MissingFile { kind: &'static str, dir: PathBuf },

    /// The descriptor (.ifo) file is malformed.
    #[error("malformed descriptor {path}, line {line}: {detail}")]
    Descriptor {
        path: PathBuf,
        line: usize,
        detail: String,
    },

    /// The binary index (.idx) file is truncated or structurally invalid.
    #[error("corrupted index at byte {offset}: {detail}")]
    CorruptIndex { offset: usize, detail: &'static str },

    /// Source bytes that must be UTF-8 text are not.
    #[error("invalid UTF-8 in {context}")]
    InvalidUtf8 { context: String },

    /// The descriptor declares a format version outside the supported set.
    #[error("unsupported version {0:?}, expected \"2.4.2\" or \"3.0.0\"")]
    UnsupportedVersion(String),

    /// The requested index offset width is neither 32 nor 64 bits.
    #[error("unsupported index offset width: {0} (expected 32 or 64)")]
    UnsupportedOffsetWidth(u32),
}

/// A convenience `Result` type alias using the crate's `StarDictError` type.
pub type Result<T> = std::result::Result<T, StarDictError>;
