//! Progress reporting for extraction runs.
//!
//! The orchestrator doesn't print anything itself. Callers that want to
//! show progress register a [`ProgressCallback`] and receive a [`Progress`]
//! value at each stage.
//!
//! # Example
//!
//! ```rust
//! use memberlog::progress::{Progress, ProgressCallback};
//! use std::sync::Arc;
//!
//! let callback: ProgressCallback = Arc::new(|progress: Progress| {
//!     if let Progress::Parsing { file, .. } = progress {
//!         println!("Parsing: {}", file.display());
//!     }
//! });
//! # callback(Progress::Discovered { count: 0 });
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use crate::event::EventCounts;

/// A stage of an extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// Transcripts were found under a directory.
    Discovered {
        /// Number of transcripts that will be parsed.
        count: usize,
    },

    /// A transcript is about to be parsed.
    Parsing {
        file: PathBuf,
        /// 1-based position in the run.
        index: usize,
        total: usize,
    },

    /// A transcript was parsed.
    Parsed {
        file: PathBuf,
        /// Events produced by this transcript.
        events: usize,
    },

    /// All transcripts were parsed.
    Collected {
        /// Events per type across the whole run.
        counts: EventCounts,
    },

    /// The aggregate is being handed to a sink.
    Loading {
        /// Sink name, e.g. "CSV" or "SQLite".
        sink: &'static str,
        events: usize,
    },
}

impl Progress {
    /// Fraction of transcripts started, for `Parsing` updates.
    pub fn percentage(&self) -> Option<f64> {
        match self {
            Progress::Parsing { index, total, .. } if *total > 0 => {
                Some(*index as f64 / *total as f64 * 100.0)
            }
            _ => None,
        }
    }
}

/// Callback type for receiving progress updates.
pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

/// Creates a no-op progress callback.
pub fn no_progress() -> ProgressCallback {
    Arc::new(|_| {})
}
