//! Destinations for extracted events.
//!
//! Every sink honours the same contract: an event whose natural key
//! (`timestamp`, `group_name`, `subject_id`, `event_type`) is already stored
//! is never written again, so loading the same batch twice stores it once.
//!
//! - [`CsvSink`] - merges into a flat CSV file, rewriting it in full
//! - [`SqliteSink`] - inserts into a table with a uniqueness constraint
//!   (feature `sqlite`)

mod flat_file;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use flat_file::CsvSink;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSink;

use crate::error::Result;
use crate::event::Event;

/// Outcome of one insert statement in a chunked load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkReport {
    /// 1-based chunk number.
    pub index: usize,
    /// Rows sent in this chunk.
    pub submitted: usize,
    /// Rows the destination actually stored.
    pub inserted: usize,
}

/// Outcome of loading a batch into a sink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Events handed to the sink.
    pub submitted: usize,
    /// Events that were not already present and got stored.
    pub inserted: usize,
    /// Per-chunk breakdown, for sinks that insert in chunks.
    pub chunks: Vec<ChunkReport>,
}

impl LoadReport {
    /// Creates a report without chunk detail.
    pub fn new(submitted: usize, inserted: usize) -> Self {
        Self {
            submitted,
            inserted,
            chunks: Vec::new(),
        }
    }

    /// Builds a report by summing chunk reports.
    pub fn from_chunks(chunks: Vec<ChunkReport>) -> Self {
        Self {
            submitted: chunks.iter().map(|c| c.submitted).sum(),
            inserted: chunks.iter().map(|c| c.inserted).sum(),
            chunks,
        }
    }

    /// Events that were skipped because they were already stored, or
    /// repeated within the batch.
    pub fn skipped(&self) -> usize {
        self.submitted.saturating_sub(self.inserted)
    }
}

/// A durable destination for events.
///
/// Implementations must be idempotent at the key level: re-loading events
/// that are already stored inserts nothing and reports `inserted == 0`.
pub trait EventSink {
    /// Human-readable sink name (e.g., "CSV", "SQLite").
    fn name(&self) -> &'static str;

    /// Where the events go, for reporting.
    fn destination(&self) -> String;

    /// Stores the events not already present.
    ///
    /// An empty batch is a no-op that reports zero inserted.
    fn load(&mut self, events: &[Event]) -> Result<LoadReport>;

    /// Number of events currently stored.
    fn stored_count(&self) -> Result<usize>;
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn destination(&self) -> String {
        (**self).destination()
    }

    fn load(&mut self, events: &[Event]) -> Result<LoadReport> {
        (**self).load(events)
    }

    fn stored_count(&self) -> Result<usize> {
        (**self).stored_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_from_chunks() {
        let report = LoadReport::from_chunks(vec![
            ChunkReport {
                index: 1,
                submitted: 500,
                inserted: 480,
            },
            ChunkReport {
                index: 2,
                submitted: 20,
                inserted: 0,
            },
        ]);
        assert_eq!(report.submitted, 520);
        assert_eq!(report.inserted, 480);
        assert_eq!(report.skipped(), 40);
    }

    #[test]
    fn test_empty_report() {
        let report = LoadReport::default();
        assert_eq!(report.skipped(), 0);
        assert!(report.chunks.is_empty());
    }
}
