//! Deduplication, canonical-headword resolution, and frequency accumulation
//!
//! The engine consumes the (word, definition) stream once. Definitions with
//! byte-identical text collapse onto a single `definition_id`; the extra
//! words become synonym rows in `word_index`. When a synonym's definition
//! text begins with the synonym itself, that word is taken as the canonical
//! headword for the shared definition and patched in after the load.

use std::collections::HashMap;

use log::{debug, info};
use sha2::{Digest, Sha256};

use crate::stardict::{Result, StarDict};
use crate::store::Store;

/// Rows per prepared-statement flush during the definitions phase.
pub const BATCH_SIZE: usize = 10_000;

/// A freshly discovered (non-duplicate) definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionRecord {
    pub definition_id: i64,
    pub word: String,
    pub definition: String,
}

/// One final `word_index` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordIndexRow {
    pub word: String,
    pub definition_id: i64,
    pub frequency: u64,
}

/// Counters reported after a conversion run.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConvertStats {
    pub entries: u64,
    pub definitions: u64,
    pub duplicates: u64,
    pub word_rows: u64,
    pub resolution_collisions: u64,
}

/// Outcome of feeding one (word, definition) pair to the engine.
enum Observation {
    New(DefinitionRecord),
    Duplicate,
}

/// In-memory dedup/frequency state for one conversion run.
#[derive(Default)]
pub struct Engine {
    /// SHA-256 of definition text → definition_id.
    dedup: HashMap<[u8; 32], i64>,
    /// Word → definition_id last assigned to it.
    word_index: HashMap<String, i64>,
    /// definition_id → canonical headword override.
    resolved: HashMap<i64, String>,
    /// Lowercased, punctuation-trimmed token → global occurrence count.
    freq: HashMap<String, u64>,
    next_id: i64,
    resolution_collisions: u64,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one (word, definition) pair.
    ///
    /// Returns the record to persist when the definition text is new;
    /// duplicates only update the in-memory mappings.
    fn observe(&mut self, word: String, definition: String) -> Observation {
        let hash: [u8; 32] = Sha256::digest(definition.as_bytes()).into();

        if let Some(&existing_id) = self.dedup.get(&hash) {
            if definition.starts_with(&word) {
                match self.resolved.get(&existing_id) {
                    Some(earlier) if *earlier != word => {
                        // First resolution stays authoritative.
                        self.resolution_collisions += 1;
                        debug!(
                            "resolution collision between {:?} and {:?} for {:?}",
                            word,
                            earlier,
                            definition.chars().take(40).collect::<String>()
                        );
                    }
                    Some(_) => {}
                    None => {
                        self.resolved.insert(existing_id, word.clone());
                    }
                }
            }
            self.word_index.insert(word, existing_id);
            return Observation::Duplicate;
        }

        self.next_id += 1;
        let definition_id = self.next_id;
        self.dedup.insert(hash, definition_id);
        self.word_index.insert(word.clone(), definition_id);
        update_freq(&mut self.freq, &definition);

        Observation::New(DefinitionRecord {
            definition_id,
            word,
            definition,
        })
    }

    /// Consume the engine, producing the deferred headword overwrites and the
    /// final `word_index` rows.
    ///
    /// A word that never occurs as a token inside any deduplicated definition
    /// text gets frequency 0; that is the documented fallback, not an error.
    fn finish(self) -> (Vec<(i64, String)>, Vec<WordIndexRow>) {
        let resolved = self
            .resolved
            .into_iter()
            .collect::<Vec<(i64, String)>>();

        let word_rows = self
            .word_index
            .into_iter()
            .map(|(word, definition_id)| {
                let frequency = self
                    .freq
                    .get(&word.to_lowercase())
                    .copied()
                    .unwrap_or(0);
                WordIndexRow {
                    word,
                    definition_id,
                    frequency,
                }
            })
            .collect();

        (resolved, word_rows)
    }
}

/// Accumulate the definition's tokens into the frequency table.
///
/// Tokens are lowercased, whitespace-split, and trimmed of ASCII punctuation
/// on both ends; apostrophes are retained.
fn update_freq(freq: &mut HashMap<String, u64>, definition: &str) {
    for token in definition.to_lowercase().split_whitespace() {
        let word = token.trim_matches(|c: char| c.is_ascii_punctuation() && c != '\'');
        *freq.entry(word.to_string()).or_insert(0) += 1;
    }
}

/// Run the full conversion pipeline: stream the dictionary through the
/// engine into the store, phase by phase.
pub fn convert(dict: &StarDict, store: &mut Store) -> Result<ConvertStats> {
    let mut stats = ConvertStats::default();

    store.create_schema()?;
    store.replace_meta(dict.meta())?;

    let mut engine = Engine::new();
    {
        let phase = store.begin_definitions()?;
        let mut batch: Vec<DefinitionRecord> = Vec::with_capacity(BATCH_SIZE);
        for result in dict.iter_entries() {
            let (word, definition) = result?;
            stats.entries += 1;
            match engine.observe(word, definition) {
                Observation::New(record) => {
                    batch.push(record);
                    if batch.len() == BATCH_SIZE {
                        phase.insert(&batch)?;
                        batch.clear();
                    }
                }
                Observation::Duplicate => stats.duplicates += 1,
            }
        }
        if !batch.is_empty() {
            phase.insert(&batch)?;
        }
        phase.commit()?;
    }

    stats.definitions = engine.next_id as u64;
    stats.resolution_collisions = engine.resolution_collisions;

    let (resolved, word_rows) = engine.finish();
    stats.word_rows = word_rows.len() as u64;

    store.apply_resolutions(&resolved)?;
    store.insert_word_index(&word_rows)?;
    store.populate_search_index()?;

    info!(
        "conversion complete: {} entries, {} definitions, {} duplicates merged, {} word rows",
        stats.entries, stats.definitions, stats.duplicates, stats.word_rows
    );
    Ok(stats)
}
