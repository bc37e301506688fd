//! CLI interface for es-meanrev
//!
//! Single command: replay a quote file and print the performance summary.
//! Positional arguments mirror the classic invocation
//! `es-meanrev [data_file] [threshold]`; anything not given on the command
//! line falls back to the configuration file, then to built-in defaults.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "es-meanrev")]
#[command(about = "Tick-level mean-reversion backtester for ES futures")]
#[command(version)]
pub struct Cli {
    /// Quote CSV to replay [default: data/ES_futures_sample.csv]
    pub data_file: Option<PathBuf>,

    /// Entry threshold in standard deviations [default: 2.5]
    pub threshold: Option<f64>,

    /// Path to configuration file
    #[arg(short, long, default_value = "meanrev.toml")]
    pub config: String,

    /// Rolling statistics window override
    #[arg(long)]
    pub window: Option<u64>,

    /// Output prefix for the equity-curve and trade CSVs
    #[arg(long)]
    pub output: Option<String>,

    /// Run the reader and compute stages on separate threads
    #[arg(long)]
    pub threaded: bool,
}
