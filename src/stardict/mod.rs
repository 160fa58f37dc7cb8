//! StarDict source reading: file location, descriptor, index, and data blob

pub mod error;
pub mod models;
mod compression;
mod idx;
mod ifo;
mod locator;

use std::path::Path;
use std::str;

use log::info;

pub use error::{Result, StarDictError};
pub use locator::DictFiles;
use models::{Descriptor, Index, IndexEntry};

/// A fully loaded StarDict dictionary.
///
/// Holds the parsed descriptor, the parsed index, and the decompressed
/// definition blob. Construction reads everything eagerly; iteration over
/// entries is then pure slicing.
pub struct StarDict {
    pub files: DictFiles,
    meta: Descriptor,
    index: Index,
    data: Vec<u8>,
}

impl StarDict {
    /// Open the dictionary contained in the given directory.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Any of the three source files is missing
    /// - The descriptor is malformed or declares an unsupported version
    /// - The index is truncated or corrupt
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        info!("opening StarDict dictionary in {}", dir.display());

        let files = DictFiles::find(dir)?;
        let meta = ifo::read_ifo(&files.ifo)?;

        let idx_content = compression::read_any(&files.idx)?;
        let index = idx::read_idx(&idx_content, meta.offset_width())?;

        let data = compression::read_any(&files.dict)?;

        info!(
            "dictionary opened: {} entries, {} bytes of definition data",
            index.entries.len(),
            data.len()
        );
        Ok(Self {
            files,
            meta,
            index,
            data,
        })
    }

    pub fn meta(&self) -> &Descriptor {
        &self.meta
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Decode one index entry against the data blob.
    ///
    /// Returns the word and the definition, both as UTF-8 text. The byte
    /// range is validated against the blob; a range past the end is an error,
    /// never a short read.
    pub fn entry_text(&self, entry: &IndexEntry) -> Result<(String, String)> {
        let word = str::from_utf8(&entry.word)
            .map_err(|_| StarDictError::InvalidUtf8 {
                context: format!("index word at data offset {}", entry.data_offset),
            })?
            .to_string();

        let start = usize::try_from(entry.data_offset).ok();
        let end = start.and_then(|s| s.checked_add(entry.data_size as usize));
        let (start, end) = match (start, end) {
            (Some(start), Some(end)) if end <= self.data.len() => (start, end),
            _ => {
                return Err(StarDictError::CorruptIndex {
                    offset: entry.data_offset.min(usize::MAX as u64) as usize,
                    detail: "definition range extends past the data blob",
                })
            }
        };
        let definition = str::from_utf8(&self.data[start..end])
            .map_err(|_| StarDictError::InvalidUtf8 {
                context: format!("definition of {:?}", word),
            })?
            .to_string();

        Ok((word, definition))
    }

    /// Look up the first definition recorded for a word.
    pub fn lookup(&self, word: &str) -> Option<Result<(String, String)>> {
        let positions = self.index.words.get(word.as_bytes())?;
        let entry = &self.index.entries[*positions.first()?];
        Some(self.entry_text(entry))
    }

    /// Iterate all (word, definition) pairs in index order.
    pub fn iter_entries(&self) -> Entries<'_> {
        Entries {
            dict: self,
            position: 0,
        }
    }
}

/// Iterator over decoded (word, definition) pairs.
pub struct Entries<'a> {
    dict: &'a StarDict,
    position: usize,
}

impl<'a> Iterator for Entries<'a> {
    type Item = Result<(String, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.dict.index.entries.get(self.position)?;
        self.position += 1;
        Some(self.dict.entry_text(entry))
    }
}
