//! Error types and utilities for alertstat

use thiserror::Error;

/// Result type alias for alertstat operations
pub type Result<T> = std::result::Result<T, AlertStatError>;

/// Main error type for alertstat operations
#[derive(Error, Debug)]
pub enum AlertStatError {
    /// Missing or invalid configuration. Fatal at startup.
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network related errors (HTTP transport, non-success status codes)
    #[error("Network error: {message}")]
    Network {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Telegram Bot API answered with `ok: false`
    #[error("Telegram API error: {message}")]
    Telegram {
        message: String,
        error_code: Option<i64>,
    },

    /// The message source could not be resolved or scanned
    #[error("Message source error: {message}")]
    Source {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Chart generation and plotting errors
    #[error("Graph error: {message}")]
    Graph { message: String },

    /// Localization catalogue errors
    #[error("Localization error: {message}")]
    Localization { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation errors for configuration values or input data
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },
}

impl AlertStatError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a network error for a non-success HTTP status
    pub fn http_status(status_code: u16, body: impl Into<String>) -> Self {
        Self::Network {
            message: format!("HTTP {status_code}: {}", body.into()),
            status_code: Some(status_code),
            source: None,
        }
    }

    /// Create a network error wrapping a transport failure
    pub fn network_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            message: msg.into(),
            status_code: None,
            source: Some(Box::new(source)),
        }
    }

    /// Create a new Telegram API error
    pub fn telegram(msg: impl Into<String>, error_code: Option<i64>) -> Self {
        Self::Telegram {
            message: msg.into(),
            error_code,
        }
    }

    /// Create a new message source error
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new message source error with source
    pub fn source_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Source {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new graph error
    pub fn graph(msg: impl Into<String>) -> Self {
        Self::Graph {
            message: msg.into(),
        }
    }

    /// Create a new localization error
    pub fn localization(msg: impl Into<String>) -> Self {
        Self::Localization {
            message: msg.into(),
        }
    }

    /// Create a new validation error for a specific field
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Whether this error must stop the process at startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::Validation { .. })
    }

    /// HTTP status attached to the error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Network { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

// Error conversion implementations for external types

#[cfg(feature = "http")]
/// Convert from reqwest::Error to AlertStatError
impl From<reqwest::Error> for AlertStatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network_with_source("Request timeout", err)
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err)
        } else if let Some(status) = err.status() {
            Self::Network {
                message: format!("HTTP error: {}", status.as_u16()),
                status_code: Some(status.as_u16()),
                source: Some(Box::new(err)),
            }
        } else {
            Self::network_with_source("Network request failed", err)
        }
    }
}

#[cfg(feature = "plotters")]
/// Convert from plotters drawing errors to AlertStatError
impl<T> From<plotters::drawing::DrawingAreaErrorKind<T>> for AlertStatError
where
    T: std::error::Error + Send + Sync + 'static,
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<T>) -> Self {
        Self::graph(format!("Chart rendering failed: {err}"))
    }
}
