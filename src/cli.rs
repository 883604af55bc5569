//! Command-line interface definition using clap.

use std::path::PathBuf;

use clap::Parser;

use crate::batch::SinkMode;
use crate::config::SinkConfig;

/// Extract join/leave/add events from WhatsApp group chat exports.
#[derive(Parser, Debug, Clone)]
#[command(name = "memberlog")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    memberlog \"Chat de WhatsApp con Los Amigos.txt\"
    memberlog --local exports/
    memberlog --local -o out/events.csv exports/
    memberlog --database logs.db --chunk-size 200 exports/

ENVIRONMENT:
    MEMBERLOG_DATABASE_URL, MEMBERLOG_TABLE, MEMBERLOG_CHUNK_SIZE, MEMBERLOG_CSV_PATH")]
pub struct Args {
    /// Transcript file, or a directory of .txt transcripts
    pub path: PathBuf,

    /// Merge into a local CSV file instead of the database (keeps identifiers readable)
    #[arg(long)]
    pub local: bool,

    /// CSV destination for --local (overrides MEMBERLOG_CSV_PATH)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// SQLite database file (overrides MEMBERLOG_DATABASE_URL)
    #[arg(long, value_name = "FILE")]
    pub database: Option<String>,

    /// Destination table (overrides MEMBERLOG_TABLE)
    #[arg(long, value_name = "NAME")]
    pub table: Option<String>,

    /// Rows per insert statement, at most 8191 (overrides MEMBERLOG_CHUNK_SIZE)
    #[arg(long, value_name = "N")]
    pub chunk_size: Option<usize>,

    /// Log parsing and loading details to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// The sink selected by the flags.
    pub fn mode(&self) -> SinkMode {
        if self.local {
            SinkMode::Local
        } else {
            SinkMode::Relational
        }
    }

    /// Applies command-line overrides on top of the environment configuration.
    pub fn apply_overrides(&self, mut config: SinkConfig) -> SinkConfig {
        if let Some(ref output) = self.output {
            config = config.with_csv_path(output);
        }
        if let Some(ref database) = self.database {
            config = config.with_database_url(database.clone());
        }
        if let Some(ref table) = self.table {
            config = config.with_table_name(table.clone());
        }
        if let Some(size) = self.chunk_size {
            config = config.with_chunk_size(size);
        }
        config
    }
}
