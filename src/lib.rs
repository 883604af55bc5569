//! # Memberlog
//!
//! Extracts group membership events from exported WhatsApp chat transcripts
//! and loads them, deduplicated, into a CSV file or a SQLite table.
//!
//! ## Overview
//!
//! A transcript is the `.txt` file WhatsApp produces with "Export chat".
//! Memberlog reads the system messages it contains (Spanish locale):
//!
//! - **joined**: `+52 55 1234 5678 se unió con el enlace del grupo`
//! - **left**: `~ Ana salió del grupo`
//! - **added**: `Se añadió a ~ Currio.` or `+1 234 añadió a +1 111 y ~ Bob`
//!
//! Each becomes an [`Event`] with a minute-resolution timestamp, the group
//! name taken from the filename, and the affected user's identifier,
//! optionally anonymized to a 16-hex-character SHA-256 prefix.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use memberlog::prelude::*;
//! use std::path::Path;
//!
//! fn main() -> Result<()> {
//!     let events = TranscriptParser::new()
//!         .parse(Path::new("Chat de WhatsApp con Los Amigos.txt"))?;
//!
//!     let mut sink = CsvSink::new("data/raw/whatsapp_logs.csv");
//!     let report = sink.load(&events)?;
//!     println!("{} new, {} skipped", report.inserted, report.skipped());
//!     Ok(())
//! }
//! ```
//!
//! Loading is idempotent: running the same transcripts again stores nothing
//! new.
//!
//! ## Module Structure
//!
//! - [`identity`]: identifier normalization and anonymization
//! - [`parsing`]: line prefix matching, membership [`Rule`](parsing::Rule)s,
//!   subject splitting
//! - [`parser`]: [`TranscriptParser`](parser::TranscriptParser), file to events
//! - [`batch`]: directory discovery and whole-run orchestration
//! - [`sink`]: [`EventSink`](sink::EventSink), [`CsvSink`](sink::CsvSink),
//!   `SqliteSink` (feature `sqlite`)
//! - [`config`]: [`ParserConfig`](config::ParserConfig),
//!   [`SinkConfig`](config::SinkConfig)
//! - [`progress`]: progress callbacks for runs
//! - [`error`]: [`MemberlogError`], [`Result`]

pub mod batch;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod identity;
pub mod parser;
pub mod parsing;
pub mod progress;
pub mod sink;

// Re-export the main types at the crate root for convenience
pub use error::{MemberlogError, Result};
pub use event::{Event, EventType};

/// Convenient re-exports for common usage.
///
/// ```rust
/// use memberlog::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{MemberlogError, Result};
    pub use crate::event::{Event, EventCounts, EventKey, EventType};

    pub use crate::identity::{identify, normalize_identifier};
    pub use crate::parser::{TranscriptParser, group_name_from_path};
    pub use crate::parsing::{classify_line, split_subjects};

    pub use crate::batch::{Extraction, RunSummary, SinkMode, discover_transcripts};
    pub use crate::config::{ParserConfig, SinkConfig};

    pub use crate::sink::{CsvSink, EventSink, LoadReport};
    #[cfg(feature = "sqlite")]
    pub use crate::sink::SqliteSink;
}
