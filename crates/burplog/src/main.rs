//! burplog CLI
//!
//! Reads a JSON export of tokenized proxy log entries, normalizes each
//! transaction and prints one line (or JSON object) per record.
//!
//! Usage:
//!   burplog <FILE> [OPTIONS]

use anyhow::Context;
use burplog::{normalize_file, Config, Format, LogBatch, RecordSummary};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ANSI color codes
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Normalize captured HTTP transactions from an intercepting-proxy log
#[derive(Parser, Debug)]
#[command(name = "burplog")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file holding an array of tokenized log entries
    #[arg(required = true)]
    path: PathBuf,

    /// YAML configuration file
    #[arg(short, long, env = "BURPLOG_CONFIG")]
    config: Option<PathBuf>,

    /// Output format (overrides the config file)
    #[arg(short, long, value_enum, env = "BURPLOG_OUTPUT")]
    output: Option<Format>,

    /// Log level (overrides the config file; RUST_LOG wins over both)
    #[arg(long, env = "BURPLOG_LOG_LEVEL")]
    log_level: Option<String>,

    /// Shorthand for --log-level debug
    #[arg(short, long)]
    verbose: bool,

    /// Exit with an error if any entry had to be skipped
    #[arg(short, long)]
    strict: bool,
}

fn main() {
    let args = Args::parse();

    match run(args) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{RED}{BOLD}error:{RESET} {e:#}");
            std::process::exit(1);
        }
    }
}

/// Returns whether the run counts as a success.
fn run(args: Args) -> anyhow::Result<bool> {
    let config = load_config(&args)?;
    init_logging(&config);

    let batch = normalize_file(&args.path)
        .with_context(|| format!("failed to normalize {}", args.path.display()))?;

    match config.output {
        Format::Json => print_json(&batch)?,
        Format::Text => print_text(&batch, &args),
    }

    Ok(batch.is_complete() || !config.strict)
}

/// Config file first, then command-line overrides.
fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(output) = args.output {
        config.output = output;
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    if args.verbose {
        config.log_level = "debug".to_string();
    }
    config.strict |= args.strict;

    config.validate()?;
    Ok(config)
}

fn init_logging(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.log_format {
        Format::Json => builder.json().init(),
        Format::Text => builder.init(),
    }
}

fn print_text(batch: &LogBatch, args: &Args) {
    println!("{BOLD}{CYAN}burplog{RESET} {DIM}{}{RESET}", args.path.display());
    println!("{DIM}━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━{RESET}");

    for record in &batch.records {
        println!("{}", RecordSummary::from(record));
    }

    println!();
    println!(
        "{BOLD}{}{RESET} record(s) normalized, {}{}{RESET} skipped",
        batch.records.len(),
        if batch.is_complete() { DIM } else { YELLOW },
        batch.skipped.len()
    );
    for skipped in &batch.skipped {
        println!("  {YELLOW}#{}{RESET} {}", skipped.index, skipped.reason);
    }
}

fn print_json(batch: &LogBatch) -> anyhow::Result<()> {
    let summaries: Vec<RecordSummary> = batch.records.iter().map(RecordSummary::from).collect();
    let skipped: Vec<serde_json::Value> = batch
        .skipped
        .iter()
        .map(|s| serde_json::json!({"index": s.index, "reason": s.reason}))
        .collect();

    let output = serde_json::json!({
        "records": summaries,
        "skipped": skipped,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
