//! Locating the descriptor/index/data file triple in a dictionary directory

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use super::error::{Result, StarDictError};

/// Acceptable index file extensions, probed in order.
const IDX_EXTENSIONS: &[&str] = &["idx", "idx.gz", "idx.bz2"];

/// Acceptable data file extensions, probed in order.
const DICT_EXTENSIONS: &[&str] = &["dict", "dict.dz", "dict.gz", "dict.bz2"];

/// The three files making up one StarDict dictionary.
#[derive(Debug, Clone)]
pub struct DictFiles {
    pub ifo: PathBuf,
    pub idx: PathBuf,
    pub dict: PathBuf,
}

impl DictFiles {
    /// Locate the dictionary files in the given directory.
    ///
    /// The `.ifo` descriptor anchors the search; the index and data files
    /// share its base name and may be present compressed or plain. The first
    /// extension that resolves wins.
    pub fn find(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let ifo = find_ifo(dir)?;
        let idx = probe_extensions(&ifo, IDX_EXTENSIONS).ok_or_else(|| {
            StarDictError::MissingFile {
                kind: "index (.idx)",
                dir: dir.to_path_buf(),
            }
        })?;
        let dict = probe_extensions(&ifo, DICT_EXTENSIONS).ok_or_else(|| {
            StarDictError::MissingFile {
                kind: "data (.dict)",
                dir: dir.to_path_buf(),
            }
        })?;

        debug!(
            "located dictionary files: {}, {}, {}",
            ifo.display(),
            idx.display(),
            dict.display()
        );
        Ok(Self { ifo, idx, dict })
    }
}

/// Find the descriptor file in the directory.
fn find_ifo(dir: &Path) -> Result<PathBuf> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("ifo") && path.is_file() {
            return Ok(path);
        }
    }
    Err(StarDictError::MissingFile {
        kind: "descriptor (.ifo)",
        dir: dir.to_path_buf(),
    })
}

/// Return the first sibling of `ifo` that exists under one of the extensions.
fn probe_extensions(ifo: &Path, extensions: &[&str]) -> Option<PathBuf> {
    extensions
        .iter()
        .map(|ext| ifo.with_extension(ext))
        .find(|candidate| candidate.exists())
}
