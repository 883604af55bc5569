//! # memberlog CLI
//!
//! Command-line interface for the memberlog library.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser as ClapParser;
use envconfig::Envconfig;
use tracing_subscriber::EnvFilter;

use memberlog::MemberlogError;
use memberlog::batch::{Extraction, RunSummary};
use memberlog::cli::Args;
use memberlog::config::SinkConfig;
use memberlog::progress::{Progress, ProgressCallback};

fn main() {
    let args = <Args as ClapParser>::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), MemberlogError> {
    let start = Instant::now();
    let config = args.apply_overrides(SinkConfig::init_from_env()?);
    config.validate()?;
    let mode = args.mode();

    println!("📦 memberlog v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Input:   {}", args.path.display());
    if args.local {
        println!("💾 Output:  {}", config.csv_path().display());
    } else {
        println!("🗄️  Output:  {} ({})", config.table_name, config.database_url);
    }
    println!();

    let extraction = Extraction::for_mode(mode).with_progress(print_progress(args.path.clone()));
    let summary = extraction.run(&args.path, || mode.open_sink(&config))?;

    if summary.files.is_empty() {
        println!("No .txt files found in {}", args.path.display());
        return Ok(());
    }
    if summary.counts.is_empty() {
        println!("No join/leave events found.");
        return Ok(());
    }

    print_load(&summary);

    println!();
    println!("✅ WhatsApp log extraction complete.");
    println!("   Total time:  {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn print_progress(root: PathBuf) -> ProgressCallback {
    Arc::new(move |progress: Progress| match progress {
        Progress::Discovered { count } if count > 0 => {
            println!("🔍 Found {} chat files in {}", count, root.display());
        }
        Progress::Parsing { ref file, .. } => {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());
            let percent = progress.percentage().unwrap_or_default();
            println!("   [{:>3.0}%] Parsing: {}", percent, name);
        }
        Progress::Collected { counts } if !counts.is_empty() => {
            println!("📊 Parsed {}", counts);
        }
        Progress::Loading { sink, events } => {
            println!("💾 Loading {} events into {}...", events, sink);
        }
        _ => {}
    })
}

fn print_load(summary: &RunSummary) {
    let Some(report) = &summary.load else {
        return;
    };
    let destination = summary.destination.as_deref().unwrap_or_default();

    for chunk in &report.chunks {
        println!(
            "   Chunk {}: inserted {}/{} rows",
            chunk.index, chunk.inserted, chunk.submitted
        );
    }

    let verb = if summary.sink == Some("CSV") {
        "Saved"
    } else {
        "Inserted"
    };
    println!(
        "   {} {} new rows to {} ({} duplicates skipped)",
        verb,
        report.inserted,
        destination,
        report.skipped()
    );
}
