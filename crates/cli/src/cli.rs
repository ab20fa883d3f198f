//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Batch Sink - push newline-delimited events to HTTP collectors
#[derive(Parser, Debug)]
#[command(
    name = "batch-sink",
    author,
    version,
    about = "Push event batches to HTTP collectors",
    long_about = "Reads newline-delimited events from a file or stdin, groups them into \n\
                  fixed-size batches and delivers every batch to each configured sink \n\
                  as a JSON array, plain or gzip+base64 encoded."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "BATCH_SINK_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "BATCH_SINK_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send events through the configured sinks
    Send(SendArgs),

    /// Validate configuration file without sending
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `send` command
#[derive(Parser, Debug, Clone)]
pub struct SendArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "config.toml", env = "BATCH_SINK_CONFIG")]
    pub config: PathBuf,

    /// Input file with one event per line ("-" or omitted = stdin)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Number of events per batch
    #[arg(long, default_value = "100", env = "BATCH_SINK_BATCH_SIZE", value_parser = clap::value_parser!(u64).range(1..))]
    pub batch_size: u64,

    /// Per-event codec
    #[arg(long, value_enum, default_value = "raw-json")]
    pub codec: CodecKind,

    /// Only send to the sink with this name
    #[arg(long)]
    pub sink: Option<String>,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "BATCH_SINK_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and input, then exit without sending
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show configured extra headers
    #[arg(long)]
    pub headers: bool,
}

/// Per-event codec selection
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CodecKind {
    /// Wrap each line as `{"body": "<line>"}`
    Json,
    /// Each line is already a JSON value and is sent verbatim
    #[default]
    RawJson,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
