//! Configuration types for parsing and loading.
//!
//! - [`ParserConfig`] controls how transcripts are read and whether subject
//!   identifiers are anonymized.
//! - [`SinkConfig`] describes where events are persisted. It is read once
//!   from the environment at startup and passed explicitly to the sinks.
//!
//! # Example
//!
//! ```rust
//! use memberlog::config::ParserConfig;
//! use memberlog::parser::TranscriptParser;
//!
//! let config = ParserConfig::new()
//!     .with_anonymize(false)
//!     .with_buffer_size(128 * 1024);
//!
//! let parser = TranscriptParser::with_config(config);
//! ```

use std::path::{Path, PathBuf};

use envconfig::Envconfig;
use serde::{Deserialize, Serialize};

use crate::error::{MemberlogError, Result};

/// Largest insert chunk: SQLite binds at most 32766 parameters per
/// statement and every row takes four.
pub const MAX_CHUNK_SIZE: usize = 32766 / 4;

/// Configuration for transcript parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Replace subject identifiers by truncated SHA-256 digests (default: true)
    pub anonymize: bool,

    /// Read buffer size (default: 64KB)
    pub buffer_size: usize,

    /// File extension of transcripts when scanning a directory (default: "txt")
    pub extension: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            anonymize: true,
            buffer_size: 64 * 1024, // 64KB
            extension: "txt".to_string(),
        }
    }
}

impl ParserConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables subject anonymization.
    #[must_use]
    pub fn with_anonymize(mut self, anonymize: bool) -> Self {
        self.anonymize = anonymize;
        self
    }

    /// Sets the read buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Sets the transcript file extension (without the dot).
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

/// Destination settings, read from `MEMBERLOG_*` environment variables.
///
/// | Variable | Default |
/// |----------|---------|
/// | `MEMBERLOG_DATABASE_URL` | `data/raw/whatsapp_logs.db` |
/// | `MEMBERLOG_TABLE` | `raw_whatsapp_logs` |
/// | `MEMBERLOG_CHUNK_SIZE` | `500` |
/// | `MEMBERLOG_CSV_PATH` | `data/raw/whatsapp_logs.csv` |
#[derive(Envconfig, Clone, Debug)]
pub struct SinkConfig {
    /// SQLite database file, or `:memory:`.
    #[envconfig(from = "MEMBERLOG_DATABASE_URL", default = "data/raw/whatsapp_logs.db")]
    pub database_url: String,

    #[envconfig(from = "MEMBERLOG_TABLE", default = "raw_whatsapp_logs")]
    pub table_name: String,

    /// Rows per multi-row insert statement.
    #[envconfig(from = "MEMBERLOG_CHUNK_SIZE", default = "500")]
    pub chunk_size: usize,

    #[envconfig(from = "MEMBERLOG_CSV_PATH", default = "data/raw/whatsapp_logs.csv")]
    pub csv_path: String,
}

impl SinkConfig {
    /// Reads the configuration from the environment and validates it.
    pub fn from_env() -> Result<Self> {
        let config = Self::init_from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Overrides the database location.
    #[must_use]
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = url.into();
        self
    }

    /// Overrides the destination table.
    #[must_use]
    pub fn with_table_name(mut self, table: impl Into<String>) -> Self {
        self.table_name = table.into();
        self
    }

    /// Overrides the insert chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Overrides the flat-file destination.
    #[must_use]
    pub fn with_csv_path(mut self, path: impl AsRef<Path>) -> Self {
        self.csv_path = path.as_ref().to_string_lossy().into_owned();
        self
    }

    /// The flat-file destination as a path.
    pub fn csv_path(&self) -> PathBuf {
        PathBuf::from(&self.csv_path)
    }

    /// Checks values the environment parser can't.
    ///
    /// The table name is interpolated into SQL, so it must be a plain
    /// identifier.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(MemberlogError::invalid_config(
                "chunk_size",
                "must be greater than zero",
            ));
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(MemberlogError::invalid_config(
                "chunk_size",
                format!(
                    "{} exceeds the maximum of {MAX_CHUNK_SIZE} rows per statement",
                    self.chunk_size
                ),
            ));
        }
        if !is_sql_identifier(&self.table_name) {
            return Err(MemberlogError::invalid_config(
                "table_name",
                format!(
                    "'{}' is not a valid identifier (letters, digits, underscores)",
                    self.table_name
                ),
            ));
        }
        if self.database_url.trim().is_empty() {
            return Err(MemberlogError::invalid_config("database_url", "is empty"));
        }
        if self.csv_path.trim().is_empty() {
            return Err(MemberlogError::invalid_config("csv_path", "is empty"));
        }
        Ok(())
    }
}

fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn defaults() -> SinkConfig {
        SinkConfig::init_from_hashmap(&HashMap::new()).unwrap()
    }

    #[test]
    fn test_parser_config_defaults() {
        let config = ParserConfig::default();
        assert!(config.anonymize);
        assert_eq!(config.buffer_size, 64 * 1024);
        assert_eq!(config.extension, "txt");
    }

    #[test]
    fn test_parser_config_builder() {
        let config = ParserConfig::new()
            .with_anonymize(false)
            .with_buffer_size(1024)
            .with_extension("log");
        assert!(!config.anonymize);
        assert_eq!(config.buffer_size, 1024);
        assert_eq!(config.extension, "log");
    }

    #[test]
    fn test_sink_config_defaults() {
        let config = defaults();
        assert_eq!(config.table_name, "raw_whatsapp_logs");
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.csv_path(), PathBuf::from("data/raw/whatsapp_logs.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sink_config_from_map() {
        let mut vars = HashMap::new();
        vars.insert("MEMBERLOG_CHUNK_SIZE".to_string(), "25".to_string());
        vars.insert("MEMBERLOG_TABLE".to_string(), "events".to_string());
        let config = SinkConfig::init_from_hashmap(&vars).unwrap();
        assert_eq!(config.chunk_size, 25);
        assert_eq!(config.table_name, "events");
    }

    #[test]
    fn test_sink_config_rejects_bad_chunk_size() {
        let mut vars = HashMap::new();
        vars.insert("MEMBERLOG_CHUNK_SIZE".to_string(), "many".to_string());
        assert!(SinkConfig::init_from_hashmap(&vars).is_err());

        let err = defaults().with_chunk_size(0).validate().unwrap_err();
        assert!(err.is_invalid_config());
    }

    #[test]
    fn test_sink_config_rejects_oversized_chunk() {
        assert!(defaults().with_chunk_size(MAX_CHUNK_SIZE).validate().is_ok());

        let err = defaults()
            .with_chunk_size(MAX_CHUNK_SIZE + 1)
            .validate()
            .unwrap_err();
        assert!(err.is_invalid_config());
        assert!(err.to_string().contains("chunk_size"));

        let mut vars = HashMap::new();
        vars.insert("MEMBERLOG_CHUNK_SIZE".to_string(), "70000".to_string());
        let config = SinkConfig::init_from_hashmap(&vars).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sink_config_rejects_unsafe_table_names() {
        for name in ["", "1events", "logs; DROP TABLE x", "raw-logs"] {
            assert!(defaults().with_table_name(name).validate().is_err(), "{name}");
        }
        assert!(defaults().with_table_name("_logs_2024").validate().is_ok());
    }
}
