//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "weightlog", version, about = "Personal weight log")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/weightlog.toml")]
    pub config: PathBuf,

    /// Measurement log to use instead of `store.path` from the config
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Print results and logs as JSON instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); defaults to logging.level, then warn
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the measurement log with its header
    Init,
    /// Store a weight in kg, then print a short summary
    Log {
        /// Weight in kg
        value: f64,
        /// Record at this RFC 3339 time instead of now
        #[arg(long, value_name = "TIMESTAMP")]
        at: Option<String>,
        /// Store even when the value is outside the [input] band
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
    /// Print the most recent measurement
    Latest,
    /// Full report: statistics, trend and goal projection
    Stats {
        /// Only show this much recent history (e.g. 30d, 8w)
        #[arg(long, value_name = "WINDOW")]
        last: Option<String>,
        /// Bucket width for the period change (overrides report.resample)
        #[arg(long, value_name = "WINDOW")]
        resample: Option<String>,
        /// Skip the trend fit and goal projection
        #[arg(long, action = ArgAction::SetTrue)]
        no_projection: bool,
    },
}
