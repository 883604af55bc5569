//! Transcript parser: from an exported chat file to membership events.
//!
//! The parser reads a transcript line by line, classifies each line with
//! [`classify_line`], and turns every subject on a matching line into an
//! [`Event`]. Lines that don't match are skipped; only I/O failures are
//! reported.
//!
//! # Example
//!
//! ```rust,no_run
//! use memberlog::parser::TranscriptParser;
//! use std::path::Path;
//!
//! let parser = TranscriptParser::new();
//!
//! // Parse the whole file into memory
//! let events = parser.parse(Path::new("Chat de WhatsApp con Los Amigos.txt"))?;
//!
//! // Or stream it
//! for event in parser.stream(Path::new("Chat de WhatsApp con Los Amigos.txt"))? {
//!     let event = event?;
//!     println!("{} {} {}", event.timestamp, event.event_type, event.subject_id);
//! }
//! # Ok::<(), memberlog::MemberlogError>(())
//! ```

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::config::ParserConfig;
use crate::error::Result;
use crate::event::Event;
use crate::identity::identify;
use crate::parsing::classify_line;

/// Export filename prefixes, per locale, that precede the group name.
pub const EXPORT_PREFIXES: &[&str] = &["Chat de WhatsApp con ", "WhatsApp Chat with "];

/// Derives the group name from a transcript's filename.
///
/// ```
/// use memberlog::parser::group_name_from_path;
/// use std::path::Path;
///
/// assert_eq!(group_name_from_path(Path::new("exports/Chat de WhatsApp con Los Amigos.txt")), "Los Amigos");
/// assert_eq!(group_name_from_path(Path::new("WhatsApp Chat with Book Club.txt")), "Book Club");
/// assert_eq!(group_name_from_path(Path::new("random.txt")), "random");
/// ```
pub fn group_name_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    EXPORT_PREFIXES
        .iter()
        .find_map(|prefix| stem.strip_prefix(prefix))
        .map(str::to_string)
        .unwrap_or(stem)
}

/// Parser for WhatsApp TXT transcripts.
#[derive(Debug, Clone, Default)]
pub struct TranscriptParser {
    config: ParserConfig,
}

impl TranscriptParser {
    /// Creates a parser with default configuration (anonymizing).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses a transcript file into events, in line order.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file can't be opened or read. Unmatched
    /// and malformed lines are never errors.
    pub fn parse(&self, path: &Path) -> Result<Vec<Event>> {
        self.stream(path)?.collect()
    }

    /// Opens a transcript and returns a lazy iterator over its events.
    pub fn stream(&self, path: &Path) -> Result<TranscriptEvents<BufReader<File>>> {
        let file = File::open(path)?;
        let reader = BufReader::with_capacity(self.config.buffer_size, file);
        Ok(self.stream_reader(reader, group_name_from_path(path)))
    }

    /// Streams events from any buffered reader, attributing them to `group_name`.
    pub fn stream_reader<R: BufRead>(
        &self,
        reader: R,
        group_name: impl Into<String>,
    ) -> TranscriptEvents<R> {
        TranscriptEvents::new(reader, group_name.into(), self.config.anonymize)
    }

    /// Parses transcript content held in memory.
    pub fn parse_str(&self, content: &str, group_name: &str) -> Result<Vec<Event>> {
        self.stream_reader(content.as_bytes(), group_name).collect()
    }
}

/// Lazy iterator over the events of one transcript.
///
/// A line naming several subjects yields one event per subject, all with
/// the same timestamp.
pub struct TranscriptEvents<R: BufRead> {
    reader: R,
    group_name: String,
    anonymize: bool,
    line_buffer: String,
    queued: VecDeque<Event>,
    lines_read: u64,
    finished: bool,
}

impl<R: BufRead> TranscriptEvents<R> {
    fn new(reader: R, group_name: String, anonymize: bool) -> Self {
        Self {
            reader,
            group_name,
            anonymize,
            line_buffer: String::with_capacity(256),
            queued: VecDeque::new(),
            lines_read: 0,
            finished: false,
        }
    }

    /// Group name attached to every event.
    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    /// Number of lines consumed so far.
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    fn queue_line(&mut self) {
        let line = self.line_buffer.trim_end_matches(['\n', '\r']);
        let Some(classified) = classify_line(line) else {
            return;
        };

        let event_type = classified.event_type();
        for subject in &classified.subjects {
            self.queued.push_back(Event::new(
                classified.timestamp,
                self.group_name.clone(),
                identify(subject, self.anonymize),
                event_type,
            ));
        }
    }
}

impl<R: BufRead> Iterator for TranscriptEvents<R> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.queued.pop_front() {
                return Some(Ok(event));
            }
            if self.finished {
                return None;
            }

            self.line_buffer.clear();
            match self.reader.read_line(&mut self.line_buffer) {
                Ok(0) => self.finished = true,
                Ok(_) => {
                    self.lines_read += 1;
                    self.queue_line();
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}
