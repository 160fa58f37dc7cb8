//! # stardict2db
//!
//! Converts a dictionary in StarDict format (.ifo descriptor, .idx binary
//! word index, .dict definition blob, the latter two optionally gzip- or
//! bzip2-compressed) into a normalized SQLite store with an FTS5 full-text
//! search index.
//!
//! Synonym entries whose definitions are byte-identical are merged onto one
//! definition row; word frequencies accumulated over the deduplicated texts
//! drive the downstream prefix-match ranking.
pub mod convert;
pub mod stardict;
pub mod store;

// Re-export the main types for convenience
pub use convert::{convert, ConvertStats};
pub use stardict::{Result, StarDict, StarDictError};
pub use store::Store;
