//! Relational sink backed by SQLite.
//!
//! Events are inserted in chunks with multi-row
//! `INSERT ... ON CONFLICT (...) DO NOTHING` statements, so rows already
//! present under the natural key are skipped by the database itself. The
//! number of rows each statement actually changed is what gets reported.

use std::fs;
use std::path::Path;

use rusqlite::{Connection, Transaction, params_from_iter};

use crate::config::{MAX_CHUNK_SIZE, SinkConfig};
use crate::error::Result;
use crate::event::Event;

use super::{ChunkReport, EventSink, LoadReport};

const COLUMNS: &str = "timestamp, group_name, user_phone_hash, event_type";

/// Inserts events into a SQLite table with a uniqueness constraint.
///
/// The connection lives as long as the sink and is closed when it is
/// dropped, including when a load fails halfway.
///
/// # Example
///
/// ```rust
/// use memberlog::sink::{EventSink, SqliteSink};
///
/// let mut sink = SqliteSink::open_in_memory()?;
/// assert_eq!(sink.load(&[])?.inserted, 0);
/// assert_eq!(sink.stored_count()?, 0);
/// # Ok::<(), memberlog::MemberlogError>(())
/// ```
pub struct SqliteSink {
    conn: Connection,
    location: String,
    table: String,
    chunk_size: usize,
}

impl SqliteSink {
    /// Default destination table.
    pub const DEFAULT_TABLE: &'static str = "raw_whatsapp_logs";

    /// Default rows per insert statement.
    pub const DEFAULT_CHUNK_SIZE: usize = 500;

    /// Opens the configured database and makes sure the table exists.
    pub fn open(config: &SinkConfig) -> Result<Self> {
        config.validate()?;

        let conn = if config.database_url == ":memory:" {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = Path::new(&config.database_url).parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            Connection::open(&config.database_url)?
        };

        let sink = Self {
            conn,
            location: config.database_url.clone(),
            table: config.table_name.clone(),
            chunk_size: config.chunk_size,
        };
        sink.ensure_table()?;
        tracing::debug!(database = %sink.location, table = %sink.table, "opened database connection");
        Ok(sink)
    }

    /// Opens a private in-memory database with the default table.
    pub fn open_in_memory() -> Result<Self> {
        let sink = Self {
            conn: Connection::open_in_memory()?,
            location: ":memory:".to_string(),
            table: Self::DEFAULT_TABLE.to_string(),
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
        };
        sink.ensure_table()?;
        Ok(sink)
    }

    /// Sets the number of rows per insert statement, clamped to
    /// `1..=MAX_CHUNK_SIZE`.
    #[must_use]
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.clamp(1, MAX_CHUNK_SIZE);
        self
    }

    /// The destination table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The underlying connection.
    ///
    /// Lets callers query the stored rows directly, e.g. to audit that no
    /// readable identifiers reached the table.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Creates the table and its natural-key constraint if missing.
    ///
    /// The unique index also covers tables created by other tools without
    /// the constraint.
    pub fn ensure_table(&self) -> Result<()> {
        let table = &self.table;
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                timestamp TEXT NOT NULL,
                group_name TEXT NOT NULL,
                user_phone_hash TEXT NOT NULL,
                event_type TEXT NOT NULL,
                UNIQUE ({COLUMNS})
            );
            CREATE UNIQUE INDEX IF NOT EXISTS {table}_natural_key ON {table} ({COLUMNS});"
        ))?;
        Ok(())
    }

    fn insert_chunk(tx: &Transaction<'_>, table: &str, chunk: &[Event]) -> Result<usize> {
        let placeholders = vec!["(?, ?, ?, ?)"; chunk.len()].join(", ");
        let sql = format!(
            "INSERT INTO {table} ({COLUMNS}) VALUES {placeholders} \
             ON CONFLICT ({COLUMNS}) DO NOTHING"
        );

        let values: Vec<String> = chunk
            .iter()
            .flat_map(|event| {
                [
                    event.timestamp_string(),
                    event.group_name.clone(),
                    event.subject_id.clone(),
                    event.event_type.as_str().to_string(),
                ]
            })
            .collect();

        let mut stmt = tx.prepare_cached(&sql)?;
        let inserted = stmt.execute(params_from_iter(values.iter()))?;
        Ok(inserted)
    }
}

impl EventSink for SqliteSink {
    fn name(&self) -> &'static str {
        "SQLite"
    }

    fn destination(&self) -> String {
        format!("{} ({})", self.table, self.location)
    }

    fn load(&mut self, events: &[Event]) -> Result<LoadReport> {
        if events.is_empty() {
            return Ok(LoadReport::default());
        }

        let tx = self.conn.transaction()?;
        let mut chunks = Vec::with_capacity(events.len().div_ceil(self.chunk_size));

        for (i, chunk) in events.chunks(self.chunk_size).enumerate() {
            let inserted = Self::insert_chunk(&tx, &self.table, chunk)?;
            tracing::info!(
                chunk = i + 1,
                inserted,
                submitted = chunk.len(),
                "inserted chunk"
            );
            chunks.push(ChunkReport {
                index: i + 1,
                submitted: chunk.len(),
                inserted,
            });
        }

        tx.commit()?;
        Ok(LoadReport::from_chunks(chunks))
    }

    fn stored_count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.table),
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

impl Drop for SqliteSink {
    fn drop(&mut self) {
        tracing::debug!(database = %self.location, "closing database connection");
    }
}
