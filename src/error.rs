//! Unified error types for memberlog.
//!
//! This module provides a single [`MemberlogError`] enum that covers all error
//! cases in the library.
//!
//! # What is *not* an error
//!
//! Transcript lines that don't carry a timestamp prefix, carry a corrupted
//! date, or don't describe a membership event are skipped silently by the
//! parser. Only conditions that prevent a whole file or a whole load from
//! completing surface here.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for memberlog operations.
///
/// # Example
///
/// ```rust
/// use memberlog::error::Result;
/// use memberlog::Event;
///
/// fn my_function() -> Result<Vec<Event>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, MemberlogError>;

/// The error type for all memberlog operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MemberlogError {
    /// An I/O error occurred.
    ///
    /// Raised when a transcript cannot be opened or becomes unreadable
    /// mid-parse, or when a flat-file destination cannot be written.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The input path is neither a file nor a directory.
    #[error("Path not found: {}", path.display())]
    PathNotFound {
        /// The path that was requested
        path: PathBuf,
    },

    /// CSV reading or writing error in the flat-file sink.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Relational sink error.
    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A row of an existing flat-file destination could not be understood.
    #[error("Invalid row {line} in {}: {message}", path.display())]
    InvalidRow {
        /// Destination file
        path: PathBuf,
        /// 1-based record number (header excluded)
        line: u64,
        /// Description of what's wrong
        message: String,
    },

    /// An event type string is not one of `joined`, `left`, `added`.
    #[error("Invalid event type '{input}'. Expected one of: joined, left, added")]
    InvalidEventType {
        /// The string that was provided
        input: String,
    },

    /// A configuration value is out of range or malformed.
    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfig {
        /// The offending setting
        field: &'static str,
        /// Description of what's wrong
        message: String,
    },

    /// Loading configuration from the environment failed.
    #[error("Environment configuration error: {0}")]
    Env(#[from] envconfig::Error),
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl MemberlogError {
    /// Creates a path-not-found error.
    pub fn path_not_found(path: impl Into<PathBuf>) -> Self {
        MemberlogError::PathNotFound { path: path.into() }
    }

    /// Creates an invalid row error for a flat-file destination.
    pub fn invalid_row(path: impl Into<PathBuf>, line: u64, message: impl Into<String>) -> Self {
        MemberlogError::InvalidRow {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Creates an invalid event type error.
    pub fn invalid_event_type(input: impl Into<String>) -> Self {
        MemberlogError::InvalidEventType {
            input: input.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(field: &'static str, message: impl Into<String>) -> Self {
        MemberlogError::InvalidConfig {
            field,
            message: message.into(),
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, MemberlogError::Io(_))
    }

    /// Returns `true` if the input path did not exist.
    pub fn is_path_not_found(&self) -> bool {
        matches!(self, MemberlogError::PathNotFound { .. })
    }

    /// Returns `true` if this is a configuration error.
    pub fn is_invalid_config(&self) -> bool {
        matches!(
            self,
            MemberlogError::InvalidConfig { .. } | MemberlogError::Env(_)
        )
    }
}
