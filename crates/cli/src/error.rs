//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration loading or validation error
    #[error("Invalid configuration: {0}")]
    Config(#[from] contracts::ContractError),

    /// `--sink` named a sink that is not configured
    #[error("No sink named '{name}' in configuration")]
    UnknownSink { name: String },

    /// Input could not be read
    #[error("Failed to read input from {source_name}: {source}")]
    InputRead {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    /// At least one batch was not delivered
    #[error("{failed} batch(es) failed across {sinks} sink(s)")]
    Delivery { failed: u64, sinks: usize },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn unknown_sink(name: impl Into<String>) -> Self {
        Self::UnknownSink { name: name.into() }
    }

    pub fn input_read(source_name: impl Into<String>, source: std::io::Error) -> Self {
        Self::InputRead {
            source_name: source_name.into(),
            source,
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
