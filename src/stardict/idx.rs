//! Binary index (.idx) parsing

use std::collections::HashMap;

use byteorder::{BigEndian, ByteOrder};
use log::info;

use super::error::{Result, StarDictError};
use super::models::{Index, IndexEntry, OffsetWidth};

/// Parse the decompressed .idx content.
///
/// Entry layout, repeated until end-of-buffer:
/// - word: UTF-8 bytes terminated by a null byte (kept raw here)
/// - data_offset: 4 or 8 bytes big-endian, per `width`
/// - data_size: 4 bytes big-endian
///
/// The scan must land exactly on end-of-buffer; a field running past it is a
/// corrupt index, reported with the byte offset where the entry started.
pub fn read_idx(content: &[u8], width: OffsetWidth) -> Result<Index> {
    let offset_len = width.byte_width();
    let mut entries: Vec<IndexEntry> = Vec::new();
    let mut words: HashMap<Vec<u8>, Vec<usize>> = HashMap::new();

    let mut offset = 0usize;
    while offset < content.len() {
        let entry_start = offset;

        let end = content[offset..]
            .iter()
            .position(|&b| b == 0)
            .map(|pos| offset + pos)
            .ok_or(StarDictError::CorruptIndex {
                offset: entry_start,
                detail: "no null terminator before end of file",
            })?;
        let word = content[offset..end].to_vec();
        offset = end + 1;

        if content.len() < offset + offset_len + 4 {
            return Err(StarDictError::CorruptIndex {
                offset: entry_start,
                detail: "truncated offset/size fields",
            });
        }
        let data_offset = match width {
            OffsetWidth::Bits32 => BigEndian::read_u32(&content[offset..offset + 4]) as u64,
            OffsetWidth::Bits64 => BigEndian::read_u64(&content[offset..offset + 8]),
        };
        offset += offset_len;
        let data_size = BigEndian::read_u32(&content[offset..offset + 4]);
        offset += 4;

        entries.push(IndexEntry {
            word: word.clone(),
            data_offset,
            data_size,
        });
        // Homographs repeat legitimately; accumulate positions.
        words.entry(word).or_default().push(entries.len() - 1);
    }

    info!("index parsed: {} entries, {} distinct words", entries.len(), words.len());
    Ok(Index { entries, words })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_entry(word: &[u8], data_offset: u64, data_size: u32, width: OffsetWidth) -> Vec<u8> {
        let mut out = word.to_vec();
        out.push(0);
        match width {
            OffsetWidth::Bits32 => out.extend_from_slice(&(data_offset as u32).to_be_bytes()),
            OffsetWidth::Bits64 => out.extend_from_slice(&data_offset.to_be_bytes()),
        }
        out.extend_from_slice(&data_size.to_be_bytes());
        out
    }

    #[test]
    fn parses_32_bit_entries_in_order() {
        let mut content = encode_entry(b"apple", 0, 10, OffsetWidth::Bits32);
        content.extend(encode_entry(b"banana", 10, 20, OffsetWidth::Bits32));

        let index = read_idx(&content, OffsetWidth::Bits32).unwrap();
        assert_eq!(index.entries.len(), 2);
        assert_eq!(index.entries[0].word, b"apple");
        assert_eq!(index.entries[0].data_offset, 0);
        assert_eq!(index.entries[0].data_size, 10);
        assert_eq!(index.entries[1].word, b"banana");
        assert_eq!(index.entries[1].data_offset, 10);
        assert_eq!(index.words[b"banana".as_slice()], vec![1]);
    }

    #[test]
    fn parses_64_bit_offsets() {
        let big_offset = u64::from(u32::MAX) + 7;
        let content = encode_entry(b"word", big_offset, 5, OffsetWidth::Bits64);

        let index = read_idx(&content, OffsetWidth::Bits64).unwrap();
        assert_eq!(index.entries[0].data_offset, big_offset);
    }

    #[test]
    fn records_every_position_of_a_repeated_word() {
        let mut content = encode_entry(b"run", 0, 4, OffsetWidth::Bits32);
        content.extend(encode_entry(b"walk", 4, 4, OffsetWidth::Bits32));
        content.extend(encode_entry(b"run", 8, 4, OffsetWidth::Bits32));

        let index = read_idx(&content, OffsetWidth::Bits32).unwrap();
        assert_eq!(index.words[b"run".as_slice()], vec![0, 2]);
    }

    #[test]
    fn missing_terminator_is_corrupt() {
        let content = b"no-terminator-here".to_vec();
        match read_idx(&content, OffsetWidth::Bits32) {
            Err(StarDictError::CorruptIndex { offset, .. }) => assert_eq!(offset, 0),
            other => panic!("expected CorruptIndex, got {:?}", other),
        }
    }

    #[test]
    fn truncated_size_field_is_corrupt() {
        let mut content = encode_entry(b"complete", 0, 8, OffsetWidth::Bits32);
        let second_start = content.len();
        content.extend(b"partial\0");
        content.extend_from_slice(&42u32.to_be_bytes());
        // Size field missing entirely for the second entry.
        match read_idx(&content, OffsetWidth::Bits32) {
            Err(StarDictError::CorruptIndex { offset, .. }) => assert_eq!(offset, second_start),
            other => panic!("expected CorruptIndex, got {:?}", other),
        }
    }

    #[test]
    fn width_mismatch_never_reads_past_buffer() {
        // A 64-bit index parsed as 32-bit either misparses within bounds or
        // errors; it must not panic.
        let content = encode_entry(b"word", 1, 2, OffsetWidth::Bits64);
        let _ = read_idx(&content, OffsetWidth::Bits32);
    }

    #[test]
    fn rejects_unsupported_width_selector() {
        match OffsetWidth::try_from(48u32) {
            Err(StarDictError::UnsupportedOffsetWidth(48)) => {}
            other => panic!("expected UnsupportedOffsetWidth, got {:?}", other),
        }
    }
}
