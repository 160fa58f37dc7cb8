//! SQLite store writing
//!
//! Each load phase runs in its own transaction; a failed phase rolls back
//! alone and leaves earlier phases committed. The converter is re-run from
//! scratch after a failure rather than resumed.

use std::path::Path;

use log::{debug, info};
use rusqlite::{Connection, Transaction};

use crate::convert::{DefinitionRecord, WordIndexRow};
use crate::stardict::models::Descriptor;
use crate::stardict::Result;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Each word may carry several definitions; ids are assigned by the converter.
CREATE TABLE IF NOT EXISTS definitions (
    definition_id INTEGER PRIMARY KEY,
    word TEXT NOT NULL,
    definition TEXT NOT NULL
);

-- Contentless FTS index over the definition text already held above.
CREATE VIRTUAL TABLE IF NOT EXISTS definitions_search USING fts5(
    definition,
    content=''
);

-- Words (synonyms and variants included) mapped onto definitions.
CREATE TABLE IF NOT EXISTS word_index (
    word TEXT NOT NULL,
    definition_id INTEGER NOT NULL,
    frequency INTEGER NOT NULL,
    PRIMARY KEY (word, definition_id),
    FOREIGN KEY (definition_id) REFERENCES definitions(definition_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_word ON definitions(word);
";

const INSERT_META: &str = "INSERT INTO meta (key, value) VALUES (?1, ?2)";
const INSERT_DEFINITION: &str =
    "INSERT INTO definitions (definition_id, word, definition) VALUES (?1, ?2, ?3)";
const UPDATE_DEFINITION_WORD: &str = "UPDATE definitions SET word = ?1 WHERE definition_id = ?2";
const INSERT_WORD_INDEX: &str =
    "INSERT INTO word_index (word, definition_id, frequency) VALUES (?1, ?2, ?3)";
const INSERT_DEFINITION_FTS: &str = "INSERT INTO definitions_search (rowid, definition) \
     SELECT definition_id, definition FROM definitions";

/// Writer handle for the destination store.
///
/// Constructed once per run and passed by reference into the pipeline; there
/// is no ambient global connection.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the destination database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("opening destination store {}", path.display());
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Phase 1: create the schema. Idempotent.
    pub fn create_schema(&mut self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Phase 2: replace the meta table wholesale with the descriptor pairs.
    pub fn replace_meta(&mut self, meta: &Descriptor) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM meta", [])?;
        {
            let mut stmt = tx.prepare(INSERT_META)?;
            for (key, value) in &meta.entries {
                stmt.execute((key, value.as_text()))?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Phase 3: open the definitions transaction.
    ///
    /// The caller streams batches through [`DefinitionsPhase::insert`] and
    /// commits once the source is exhausted.
    pub fn begin_definitions(&mut self) -> Result<DefinitionsPhase<'_>> {
        Ok(DefinitionsPhase {
            tx: self.conn.transaction()?,
        })
    }

    /// Phase 4: apply the deferred canonical-headword overwrites.
    pub fn apply_resolutions(&mut self, resolved: &[(i64, String)]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(UPDATE_DEFINITION_WORD)?;
            for (definition_id, word) in resolved {
                stmt.execute((word, definition_id))?;
            }
        }
        tx.commit()?;
        debug!("applied {} headword resolutions", resolved.len());
        Ok(())
    }

    /// Phase 5: insert all word-index rows.
    pub fn insert_word_index(&mut self, rows: &[WordIndexRow]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(INSERT_WORD_INDEX)?;
            for row in rows {
                stmt.execute((&row.word, row.definition_id, row.frequency as i64))?;
            }
        }
        tx.commit()?;
        debug!("inserted {} word_index rows", rows.len());
        Ok(())
    }

    /// Phase 6: populate the contentless search index from the definitions
    /// already in the store.
    pub fn populate_search_index(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(INSERT_DEFINITION_FTS, [])?;
        tx.commit()?;
        Ok(())
    }

    /// Borrow the underlying connection (read-side queries in tests).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// The open definitions transaction of phase 3.
pub struct DefinitionsPhase<'conn> {
    tx: Transaction<'conn>,
}

impl DefinitionsPhase<'_> {
    /// Insert one batch of freshly discovered definitions.
    pub fn insert(&self, batch: &[DefinitionRecord]) -> Result<()> {
        let mut stmt = self.tx.prepare_cached(INSERT_DEFINITION)?;
        for record in batch {
            stmt.execute((record.definition_id, &record.word, &record.definition))?;
        }
        debug!("flushed {} definitions", batch.len());
        Ok(())
    }

    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }
}
