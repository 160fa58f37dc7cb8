//! Descriptor (.ifo) parsing

use std::fs;
use std::path::Path;

use log::debug;

use super::error::{Result, StarDictError};
use super::models::{Descriptor, MetaValue};

/// Format versions this converter accepts.
const SUPPORTED_VERSIONS: &[&str] = &["2.4.2", "3.0.0"];

/// Descriptor keys whose values are integers.
const INTEGER_KEYS: &[&str] = &["wordcount", "idxfilesize"];

/// Parse a StarDict .ifo descriptor file.
///
/// Layout:
/// - Line 1: free-text title
/// - Line 2: `version=2.4.2` or `version=3.0.0` (mandatory)
/// - Remaining lines: `key=value` pairs
///
/// `wordcount` and `idxfilesize` are typed as integers; everything else stays
/// text. Line numbers in errors are 1-based.
pub fn read_ifo(path: &Path) -> Result<Descriptor> {
    let content = fs::read_to_string(path)?;
    let mut lines = content.lines().enumerate();

    let (_, title) = lines.next().ok_or_else(|| descriptor_error(path, 1, "empty file"))?;
    let mut entries = vec![("title".to_string(), MetaValue::Text(title.trim().to_string()))];

    let (line_no, line) = lines
        .next()
        .ok_or_else(|| descriptor_error(path, 2, "missing version line"))?;
    let (key, version) = key_val(path, line_no, line)?;
    if key != "version" {
        return Err(descriptor_error(
            path,
            line_no + 1,
            &format!("unexpected key {:?}, expected \"version\"", key),
        ));
    }
    if !SUPPORTED_VERSIONS.contains(&version.as_str()) {
        return Err(StarDictError::UnsupportedVersion(version));
    }
    entries.push(("version".to_string(), MetaValue::Text(version.clone())));

    for (line_no, line) in lines {
        let (key, val) = key_val(path, line_no, line)?;
        // Dead branch kept from the format history: the version allow-list
        // above never admits "3.3.0".
        if key == "idxoffsetbits" && version == "3.3.0" {
            continue;
        }
        let value = if INTEGER_KEYS.contains(&key.as_str()) {
            let n = val.parse::<i64>().map_err(|_| {
                descriptor_error(
                    path,
                    line_no + 1,
                    &format!("non-numeric value {:?} for integer key {:?}", val, key),
                )
            })?;
            MetaValue::Integer(n)
        } else {
            MetaValue::Text(val)
        };
        entries.push((key, value));
    }

    let descriptor = Descriptor { entries };
    debug!(
        "descriptor parsed: version={}, {} keys",
        descriptor.version(),
        descriptor.entries.len()
    );
    Ok(descriptor)
}

/// Split a `key=value` line, trimming whitespace around the separator.
fn key_val(path: &Path, line_no: usize, line: &str) -> Result<(String, String)> {
    let (key, val) = line
        .split_once('=')
        .ok_or_else(|| descriptor_error(path, line_no + 1, "expected key=value"))?;
    Ok((key.trim().to_string(), val.trim().to_string()))
}

fn descriptor_error(path: &Path, line: usize, detail: &str) -> StarDictError {
    StarDictError::Descriptor {
        path: path.to_path_buf(),
        line,
        detail: detail.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stardict::models::OffsetWidth;

    fn write_ifo(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.ifo");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn parses_title_version_and_typed_keys() {
        let (_dir, path) = write_ifo(
            "My Dictionary\nversion=2.4.2\nwordcount = 42\nidxfilesize=1024\nauthor=someone\n",
        );
        let meta = read_ifo(&path).unwrap();

        assert_eq!(
            meta.get("title"),
            Some(&MetaValue::Text("My Dictionary".to_string()))
        );
        assert_eq!(meta.version(), "2.4.2");
        assert_eq!(meta.get("wordcount"), Some(&MetaValue::Integer(42)));
        assert_eq!(meta.get("idxfilesize"), Some(&MetaValue::Integer(1024)));
        assert_eq!(
            meta.get("author"),
            Some(&MetaValue::Text("someone".to_string()))
        );
        assert_eq!(meta.offset_width(), OffsetWidth::Bits32);
    }

    #[test]
    fn rejects_unknown_version() {
        let (_dir, path) = write_ifo("Title\nversion=9.9.9\n");
        match read_ifo(&path) {
            Err(StarDictError::UnsupportedVersion(v)) => assert_eq!(v, "9.9.9"),
            other => panic!("expected UnsupportedVersion, got {:?}", other),
        }
    }

    #[test]
    fn rejects_misplaced_version_key() {
        let (_dir, path) = write_ifo("Title\nwordcount=10\n");
        match read_ifo(&path) {
            Err(StarDictError::Descriptor { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected Descriptor error, got {:?}", other),
        }
    }

    #[test]
    fn rejects_non_numeric_integer_key() {
        let (_dir, path) = write_ifo("Title\nversion=2.4.2\nwordcount=lots\n");
        match read_ifo(&path) {
            Err(StarDictError::Descriptor { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected Descriptor error, got {:?}", other),
        }
    }

    #[test]
    fn offset_width_is_64_only_with_flag_and_v3() {
        let (_dir, path) = write_ifo("Title\nversion=3.0.0\nidxoffsetbits=64\n");
        assert_eq!(read_ifo(&path).unwrap().offset_width(), OffsetWidth::Bits64);

        let (_dir, path) = write_ifo("Title\nversion=3.0.0\n");
        assert_eq!(read_ifo(&path).unwrap().offset_width(), OffsetWidth::Bits32);

        let (_dir, path) = write_ifo("Title\nversion=2.4.2\nidxoffsetbits=64\n");
        assert_eq!(read_ifo(&path).unwrap().offset_width(), OffsetWidth::Bits32);
    }
}
