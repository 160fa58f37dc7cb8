//! Data structures representing StarDict format components

use std::collections::HashMap;

use super::error::{Result, StarDictError};

/// A descriptor value: free-text metadata or one of the integer-typed keys
/// (`wordcount`, `idxfilesize`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Text(String),
    Integer(i64),
}

impl MetaValue {
    /// Render the value the way it is stored in the `meta` table.
    pub fn as_text(&self) -> String {
        match self {
            MetaValue::Text(s) => s.clone(),
            MetaValue::Integer(n) => n.to_string(),
        }
    }
}

/// Parsed .ifo descriptor.
///
/// Holds every key/value pair in file order (title and version included) so
/// the meta table can be populated without reordering.
#[derive(Debug)]
pub struct Descriptor {
    pub entries: Vec<(String, MetaValue)>,
}

impl Descriptor {
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn version(&self) -> &str {
        match self.get("version") {
            Some(MetaValue::Text(v)) => v,
            // read_ifo guarantees the key exists as text
            _ => "",
        }
    }

    /// Offset width the index must be parsed with.
    ///
    /// 64-bit offsets apply only when the version is "3.0.0" and the
    /// descriptor carries `idxoffsetbits=64`; every other combination uses
    /// the classic 32-bit encoding.
    pub fn offset_width(&self) -> OffsetWidth {
        if self.version() == "3.0.0" {
            if let Some(MetaValue::Text(bits)) = self.get("idxoffsetbits") {
                if bits == "64" {
                    return OffsetWidth::Bits64;
                }
            }
        }
        OffsetWidth::Bits32
    }
}

/// Width of the data-offset field in the .idx file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetWidth {
    Bits32,
    Bits64,
}

impl OffsetWidth {
    /// Get the width (in bytes) of the offset field.
    pub fn byte_width(&self) -> usize {
        match self {
            OffsetWidth::Bits32 => 4,
            OffsetWidth::Bits64 => 8,
        }
    }
}

impl TryFrom<u32> for OffsetWidth {
    type Error = StarDictError;
    fn try_from(bits: u32) -> Result<Self> {
        match bits {
            32 => Ok(Self::Bits32),
            64 => Ok(Self::Bits64),
            _ => Err(StarDictError::UnsupportedOffsetWidth(bits)),
        }
    }
}

/// One .idx entry: a word and the byte range of its definition in the .dict
/// blob.
///
/// The word stays a raw byte-string here; UTF-8 validation is deferred to the
/// blob accessor so a structurally valid index is never rejected early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub word: Vec<u8>,
    pub data_offset: u64,
    pub data_size: u32,
}

/// The parsed index: entries in file order plus a word → entry-positions map.
///
/// A word may legitimately appear more than once with different byte ranges,
/// so the map accumulates positions rather than overwriting.
#[derive(Debug)]
pub struct Index {
    pub entries: Vec<IndexEntry>,
    pub words: HashMap<Vec<u8>, Vec<usize>>,
}
