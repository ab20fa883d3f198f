//! Layered error definitions
//!
//! Categorized by source: config / encode / transport / lifecycle

use thiserror::Error;

/// Boxed underlying cause
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Encode Errors =====
    /// Codec failed to serialize one event
    #[error("codec '{codec}' encode error: {message}")]
    Encode {
        codec: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Payload compression failed
    #[error("sink '{sink_name}' compression error: {source}")]
    Compression {
        sink_name: String,
        #[source]
        source: std::io::Error,
    },

    // ===== Transport Errors =====
    /// Request could not be constructed, nothing was sent
    #[error("sink '{sink_name}' request build error: {source}")]
    RequestBuild {
        sink_name: String,
        #[source]
        source: BoxError,
    },

    /// Connection, DNS, TLS or timeout failure while sending
    #[error("sink '{sink_name}' transport error posting to '{url}': {source}")]
    Transport {
        sink_name: String,
        url: String,
        #[source]
        source: BoxError,
    },

    /// Collector answered with a non-success status (strict mode only)
    #[error("sink '{sink_name}' rejected by collector with status {status}")]
    RemoteStatus { sink_name: String, status: u16 },

    // ===== Lifecycle Errors =====
    /// Operation invoked in the wrong lifecycle state
    #[error("sink '{sink_name}' cannot {operation} while {state}")]
    InvalidState {
        sink_name: String,
        operation: &'static str,
        state: String,
    },

    /// Sink construction failed
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create encode error without an underlying cause
    pub fn encode(codec: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encode {
            codec: codec.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create lifecycle state error
    pub fn invalid_state(
        sink_name: impl Into<String>,
        operation: &'static str,
        state: impl ToString,
    ) -> Self {
        Self::InvalidState {
            sink_name: sink_name.into(),
            operation,
            state: state.to_string(),
        }
    }

    /// Whether the failure happened below the HTTP layer
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
