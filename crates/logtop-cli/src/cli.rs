use crate::OutputFormat;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Config file read when `--config` is given without a path
pub const DEFAULT_CONFIG_PATH: &str = "./config.json";

#[derive(Parser)]
#[command(name = "logtop")]
#[command(author, version)]
#[command(
    about = "Find the URLs that consume the most server time in nginx access logs",
    long_about = "logtop reads the latest rotated nginx access log, aggregates request times \
                  by URL and writes an HTML report of the most time-consuming endpoints."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format for terminal output
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    pub format: OutputFormat,

    /// JSON config file overriding the defaults, given as --config=FILE
    /// (`--config` alone reads ./config.json)
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = DEFAULT_CONFIG_PATH
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the HTML report for the latest log in LOG_DIR
    Report {
        /// Rebuild the report even if it already exists
        #[arg(long)]
        force: bool,

        /// Directory holding the rotated logs (overrides LOG_DIR)
        #[arg(long, value_name = "DIR")]
        log_dir: Option<PathBuf>,

        /// Directory the report is written to (overrides REPORT_DIR)
        #[arg(long, value_name = "DIR")]
        report_dir: Option<PathBuf>,
    },

    /// Print the most time-consuming URLs of one log file
    Analyze {
        /// Path to the log file (plain or .gz)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Number of URLs to show (overrides REPORT_SIZE)
        #[arg(short = 'n', long)]
        top: Option<usize>,

        /// Maximum percentage of unparseable lines (overrides ERR_LIMIT)
        #[arg(long, value_name = "PERCENT")]
        err_limit: Option<f64>,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}
