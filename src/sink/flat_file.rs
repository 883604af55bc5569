//! Flat CSV file sink.
//!
//! The destination is read in full, merged with the incoming batch and
//! rewritten. Existing rows come first, so they win over incoming rows with
//! the same key and are never altered.
//!
//! # Format
//! - Delimiter: `,`
//! - Columns: `timestamp`, `group_name`, `user_phone_hash`, `event_type`
//! - Timestamps: `YYYY-MM-DD HH:MM:SS`
//! - Encoding: UTF-8

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SinkConfig;
use crate::error::{MemberlogError, Result};
use crate::event::Event;

use super::{EventSink, LoadReport};

/// Merges events into a CSV file.
///
/// # Example
///
/// ```rust,no_run
/// use memberlog::sink::{CsvSink, EventSink};
///
/// let mut sink = CsvSink::new("data/raw/whatsapp_logs.csv");
/// let report = sink.load(&[])?;
/// assert_eq!(report.inserted, 0);
/// # Ok::<(), memberlog::MemberlogError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    /// Creates a sink writing to `path`. Nothing is touched until the first load.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a sink for the configured flat-file destination.
    pub fn from_config(config: &SinkConfig) -> Self {
        Self::new(config.csv_path())
    }

    /// The destination file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the rows currently stored, or nothing if the file doesn't exist.
    pub fn read_existing(&self) -> Result<Vec<Event>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut events = Vec::new();
        for (i, row) in reader.deserialize::<Event>().enumerate() {
            match row {
                Ok(event) => events.push(event),
                Err(err) if matches!(err.kind(), csv::ErrorKind::Deserialize { .. }) => {
                    return Err(MemberlogError::invalid_row(
                        &self.path,
                        i as u64 + 1,
                        err.to_string(),
                    ));
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(events)
    }

    fn write_all(&self, rows: &[&Event]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.temp_path();
        {
            let mut writer = csv::Writer::from_path(&tmp_path)?;
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl EventSink for CsvSink {
    fn name(&self) -> &'static str {
        "CSV"
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&mut self, events: &[Event]) -> Result<LoadReport> {
        if events.is_empty() {
            return Ok(LoadReport::default());
        }

        let existing = self.read_existing()?;
        let mut seen = HashSet::with_capacity(existing.len() + events.len());
        let mut rows = Vec::with_capacity(existing.len() + events.len());

        for event in &existing {
            if seen.insert(event.key()) {
                rows.push(event);
            }
        }
        if rows.len() < existing.len() {
            tracing::warn!(
                path = %self.path.display(),
                duplicates = existing.len() - rows.len(),
                "existing destination contained duplicate rows; compacting"
            );
        }

        let kept_existing = rows.len();
        for event in events {
            if seen.insert(event.key()) {
                rows.push(event);
            }
        }
        let inserted = rows.len() - kept_existing;

        self.write_all(&rows)?;
        tracing::info!(
            path = %self.path.display(),
            submitted = events.len(),
            inserted,
            total = rows.len(),
            "rewrote flat-file destination"
        );

        Ok(LoadReport::new(events.len(), inserted))
    }

    fn stored_count(&self) -> Result<usize> {
        Ok(self.read_existing()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventType;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn event(minute: u32, subject: &str, event_type: EventType) -> Event {
        let ts = NaiveDate::from_ymd_opt(2023, 3, 15)
            .unwrap()
            .and_hms_opt(14, minute, 0)
            .unwrap();
        Event::new(ts, "Los Amigos", subject, event_type)
    }

    fn batch() -> Vec<Event> {
        vec![
            event(22, "a1", EventType::Joined),
            event(23, "b2", EventType::Added),
            event(24, "a1", EventType::Left),
        ]
    }

    #[test]
    fn test_load_into_missing_file() {
        let dir = tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path().join("nested/raw/logs.csv"));

        let report = sink.load(&batch()).unwrap();
        assert_eq!(report.inserted, 3);
        assert_eq!(report.skipped(), 0);

        let content = fs::read_to_string(sink.path()).unwrap();
        assert!(content.starts_with("timestamp,group_name,user_phone_hash,event_type"));
        assert!(content.contains("2023-03-15 14:22:00,Los Amigos,a1,joined"));
    }

    #[test]
    fn test_reload_is_idempotent() {
        let dir = tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path().join("logs.csv"));

        sink.load(&batch()).unwrap();
        let report = sink.load(&batch()).unwrap();
        assert_eq!(report.inserted, 0);
        assert_eq!(report.skipped(), 3);
        assert_eq!(sink.stored_count().unwrap(), 3);
    }

    #[test]
    fn test_duplicates_within_batch_collapse() {
        let dir = tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path().join("logs.csv"));

        let mut events = batch();
        events.push(event(23, "b2", EventType::Added));
        let report = sink.load(&events).unwrap();
        assert_eq!(report.submitted, 4);
        assert_eq!(report.inserted, 3);
        assert_eq!(report.skipped(), 1);
    }

    #[test]
    fn test_existing_rows_keep_order_and_come_first() {
        let dir = tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path().join("logs.csv"));

        sink.load(&[event(30, "z9", EventType::Joined)]).unwrap();
        sink.load(&batch()).unwrap();

        let stored = sink.read_existing().unwrap();
        assert_eq!(stored.len(), 4);
        assert_eq!(stored[0].subject_id, "z9");
        assert_eq!(stored[1..], batch()[..]);
    }

    #[test]
    fn test_existing_iso_timestamps_are_normalized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs.csv");
        fs::write(
            &path,
            "timestamp,group_name,user_phone_hash,event_type\n2023-03-15T14:22:00,Los Amigos,a1,joined\n",
        )
        .unwrap();

        let mut sink = CsvSink::new(&path);
        let report = sink.load(&batch()).unwrap();
        assert_eq!(report.inserted, 2);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("2023-03-15 14:22:00,Los Amigos,a1,joined"));
        assert!(!content.contains('T'));
    }

    #[test]
    fn test_existing_duplicates_are_compacted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs.csv");
        fs::write(
            &path,
            "timestamp,group_name,user_phone_hash,event_type\n\
             2023-03-15 14:22:00,Los Amigos,a1,joined\n\
             2023-03-15 14:22:00,Los Amigos,a1,joined\n",
        )
        .unwrap();

        let mut sink = CsvSink::new(&path);
        let report = sink.load(&batch()).unwrap();
        assert_eq!(report.inserted, 2);
        assert_eq!(sink.stored_count().unwrap(), 3);
    }

    #[test]
    fn test_unreadable_existing_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs.csv");
        fs::write(
            &path,
            "timestamp,group_name,user_phone_hash,event_type\nyesterday,G,a1,joined\n",
        )
        .unwrap();

        let err = CsvSink::new(&path).load(&batch()).unwrap_err();
        assert!(matches!(err, MemberlogError::InvalidRow { line: 1, .. }));
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let dir = tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path().join("logs.csv"));
        let report = sink.load(&[]).unwrap();
        assert_eq!(report, LoadReport::default());
        assert!(!sink.path().exists());
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path().join("logs.csv"));
        sink.load(&batch()).unwrap();
        assert!(!dir.path().join("logs.csv.tmp").exists());
    }
}
