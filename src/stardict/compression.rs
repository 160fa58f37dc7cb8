//! Transparent decompression for StarDict source files

use std::fs::File;
use std::io::Read;
use std::path::Path;

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use log::debug;

use super::error::Result;

/// Read a whole source file, decompressing according to its extension.
///
/// Extensions:
/// - `.gz` / `.dz`: gzip (dictzip is plain gzip for sequential reads)
/// - `.bz2`: bzip2
/// - anything else: raw bytes
pub fn read_any(path: &Path) -> Result<Vec<u8>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    let file = File::open(path)?;
    let mut content = Vec::new();
    match ext {
        "gz" | "dz" => {
            debug!("reading {} as gzip", path.display());
            GzDecoder::new(file).read_to_end(&mut content)?;
        }
        "bz2" => {
            debug!("reading {} as bzip2", path.display());
            BzDecoder::new(file).read_to_end(&mut content)?;
        }
        _ => {
            let mut file = file;
            file.read_to_end(&mut content)?;
        }
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_plain_files_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.idx");
        std::fs::write(&path, b"plain bytes").unwrap();
        assert_eq!(read_any(&path).unwrap(), b"plain bytes");
    }

    #[test]
    fn reads_gzip_and_dictzip_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["sample.idx.gz", "sample.dict.dz"] {
            let path = dir.path().join(name);
            let mut enc = flate2::write::GzEncoder::new(
                File::create(&path).unwrap(),
                flate2::Compression::default(),
            );
            enc.write_all(b"compressed payload").unwrap();
            enc.finish().unwrap();
            assert_eq!(read_any(&path).unwrap(), b"compressed payload");
        }
    }

    #[test]
    fn reads_bzip2_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.idx.bz2");
        let mut enc = bzip2::write::BzEncoder::new(
            File::create(&path).unwrap(),
            bzip2::Compression::default(),
        );
        enc.write_all(b"bz2 payload").unwrap();
        enc.finish().unwrap();
        assert_eq!(read_any(&path).unwrap(), b"bz2 payload");
    }
}
