//! Batch extraction: discover transcripts, parse them, load the events.
//!
//! A run is sequential and file-at-a-time:
//!
//! 1. [`discover_transcripts`] turns the input path into a sorted file list.
//! 2. Each file is parsed in order; events are appended to one aggregate,
//!    file order first, then line order.
//! 3. If the aggregate is non-empty the sink is opened and the aggregate is
//!    loaded in one go. An unreadable file aborts the run before anything is
//!    loaded.
//!
//! # Example
//!
//! ```rust,no_run
//! use memberlog::batch::{SinkMode, run};
//! use memberlog::config::SinkConfig;
//! use std::path::Path;
//!
//! let config = SinkConfig::from_env()?;
//! let summary = run(Path::new("exports/"), SinkMode::Local, &config)?;
//! println!("Parsed {}", summary.counts);
//! # Ok::<(), memberlog::MemberlogError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ParserConfig, SinkConfig};
use crate::error::{MemberlogError, Result};
use crate::event::{Event, EventCounts};
use crate::parser::TranscriptParser;
use crate::progress::{Progress, ProgressCallback, no_progress};
use crate::sink::{CsvSink, EventSink, LoadReport};

/// Which destination a run loads into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkMode {
    /// Flat CSV file; identifiers are kept readable.
    Local,
    /// Relational table; identifiers are anonymized.
    Relational,
}

impl SinkMode {
    /// Whether subject identifiers are hashed in this mode.
    pub fn anonymize(self) -> bool {
        matches!(self, SinkMode::Relational)
    }

    /// Opens the sink for this mode from the process configuration.
    pub fn open_sink(self, config: &SinkConfig) -> Result<Box<dyn EventSink>> {
        match self {
            SinkMode::Local => Ok(Box::new(CsvSink::from_config(config))),
            #[cfg(feature = "sqlite")]
            SinkMode::Relational => Ok(Box::new(crate::sink::SqliteSink::open(config)?)),
            #[cfg(not(feature = "sqlite"))]
            SinkMode::Relational => Err(MemberlogError::invalid_config(
                "mode",
                "the relational sink requires the `sqlite` feature",
            )),
        }
    }
}

/// Lists the transcripts to process.
///
/// A directory yields its files with the given extension, sorted by name;
/// a file yields itself. An empty directory yields an empty list.
pub fn discover_transcripts(path: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if path.is_dir() {
        let mut files = Vec::new();
        for entry in fs::read_dir(path)? {
            let candidate = entry?.path();
            if candidate.is_file() && candidate.extension().is_some_and(|ext| ext == extension) {
                files.push(candidate);
            }
        }
        files.sort();
        Ok(files)
    } else if path.is_file() {
        Ok(vec![path.to_path_buf()])
    } else {
        Err(MemberlogError::path_not_found(path))
    }
}

/// What a run found and stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Transcripts parsed, in processing order.
    pub files: Vec<PathBuf>,
    /// Events per type across all transcripts.
    pub counts: EventCounts,
    /// Sink outcome; `None` when there was nothing to load.
    pub load: Option<LoadReport>,
    /// Name of the sink used.
    pub sink: Option<&'static str>,
    /// Destination description reported by the sink.
    pub destination: Option<String>,
}

/// Orchestrates parsing and loading.
pub struct Extraction {
    parser: TranscriptParser,
    progress: ProgressCallback,
}

impl Default for Extraction {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl Extraction {
    /// Creates an extraction with the given parser configuration.
    pub fn new(config: ParserConfig) -> Self {
        Self {
            parser: TranscriptParser::with_config(config),
            progress: no_progress(),
        }
    }

    /// Creates an extraction configured for `mode`.
    pub fn for_mode(mode: SinkMode) -> Self {
        Self::new(ParserConfig::new().with_anonymize(mode.anonymize()))
    }

    /// Registers a progress callback.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    /// The parser used for every transcript.
    pub fn parser(&self) -> &TranscriptParser {
        &self.parser
    }

    /// Parses every transcript under `path` into one aggregate.
    pub fn collect(&self, path: &Path) -> Result<(Vec<PathBuf>, Vec<Event>)> {
        let files = discover_transcripts(path, &self.parser.config().extension)?;
        if path.is_dir() {
            (self.progress)(Progress::Discovered { count: files.len() });
        }

        let mut events = Vec::new();
        for (i, file) in files.iter().enumerate() {
            (self.progress)(Progress::Parsing {
                file: file.clone(),
                index: i + 1,
                total: files.len(),
            });
            let before = events.len();
            let mut stream = self.parser.stream(file)?;
            for event in stream.by_ref() {
                events.push(event?);
            }
            let parsed = events.len() - before;
            tracing::info!(
                file = %file.display(),
                group = stream.group_name(),
                lines = stream.lines_read(),
                events = parsed,
                "parsed transcript"
            );
            (self.progress)(Progress::Parsed {
                file: file.clone(),
                events: parsed,
            });
        }

        Ok((files, events))
    }

    /// Parses `path` and loads the aggregate into the sink returned by
    /// `open_sink`.
    ///
    /// The sink is only opened when there is something to load, and is
    /// dropped (closing any connection) before this returns, on success or
    /// failure.
    pub fn run<S, F>(&self, path: &Path, open_sink: F) -> Result<RunSummary>
    where
        S: EventSink,
        F: FnOnce() -> Result<S>,
    {
        let (files, events) = self.collect(path)?;
        let counts = EventCounts::tally(&events);
        (self.progress)(Progress::Collected { counts });
        let mut summary = RunSummary {
            files,
            counts,
            ..RunSummary::default()
        };

        if events.is_empty() {
            return Ok(summary);
        }

        let mut sink = open_sink()?;
        (self.progress)(Progress::Loading {
            sink: sink.name(),
            events: events.len(),
        });
        let report = sink.load(&events)?;
        tracing::info!(
            sink = sink.name(),
            inserted = report.inserted,
            skipped = report.skipped(),
            "loaded events"
        );

        summary.sink = Some(sink.name());
        summary.destination = Some(sink.destination());
        summary.load = Some(report);
        Ok(summary)
    }
}

/// Runs a full extraction of `path` into the sink selected by `mode`.
///
/// Local mode keeps identifiers readable and merges into the CSV file;
/// relational mode anonymizes them and inserts into the database.
pub fn run(path: &Path, mode: SinkMode, config: &SinkConfig) -> Result<RunSummary> {
    Extraction::for_mode(mode).run(path, || mode.open_sink(config))
}
