//! Signature Generator Library
//!
//! A Rust library for generating personalized HTML email signatures from a
//! template and a delimited data table.
//!
//! This library provides tools for:
//! - Parsing delimited tables with delimiter detection and quote handling
//! - Extracting `{{placeholder}}` tokens from templates
//! - Validating table columns and rows against the template's placeholders
//! - Rendering one signature per row with collision-free output names
//! - Exporting signatures to a directory, a ZIP archive or by email
//! - Comprehensive error handling that keeps row failures out of the way of the batch

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services;
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{GeneratedArtifact, PlaceholderSet, Row, Table, ValidationResult};
pub use config::Config;

/// Result type alias for the signature generator
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for signature generation, validation and export
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Table columns do not match the template placeholders, or rows are incomplete
    #[error("Schema error: {message}")]
    Schema {
        message: String,
        diagnostics: Vec<String>,
    },

    /// A single table row could not be turned into an artifact
    #[error("Row {row}: {reason}")]
    RowRejected { row: usize, reason: String },

    /// Mail transport failure
    #[error("Delivery error: {message}")]
    Delivery {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Email address could not be parsed
    #[error("Invalid email address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// ZIP archive writing error
    #[error("Archive error: {message}")]
    Archive {
        message: String,
        #[source]
        source: zip::result::ZipError,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create an I/O error with a simple message
    pub fn io_error(message: impl Into<String>) -> Self {
        let message_str = message.into();
        Self::Io {
            message: message_str.clone(),
            source: std::io::Error::other(message_str),
        }
    }

    /// Create a schema error carrying the itemized diagnostics
    pub fn schema(message: impl Into<String>, diagnostics: Vec<String>) -> Self {
        Self::Schema {
            message: message.into(),
            diagnostics,
        }
    }

    /// Create a row rejection
    pub fn row_rejected(row: usize, reason: impl Into<String>) -> Self {
        Self::RowRejected {
            row,
            reason: reason.into(),
        }
    }

    /// Create a delivery error from a transport failure
    pub fn delivery(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Delivery {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a delivery error without an underlying cause
    pub fn delivery_message(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
            source: None,
        }
    }

    /// Create an invalid address error
    pub fn invalid_address(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Create an archive error with context
    pub fn archive(message: impl Into<String>, source: zip::result::ZipError) -> Self {
        Self::Archive {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }

    /// Whether the error stops the whole batch rather than a single row
    pub fn is_batch_fatal(&self) -> bool {
        !matches!(self, Self::RowRejected { .. } | Self::InvalidAddress { .. })
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(error: zip::result::ZipError) -> Self {
        Self::Archive {
            message: "ZIP archive operation failed".to_string(),
            source: error,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration {
            message: format!("Invalid configuration file: {}", error),
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::Io {
            message: "CSV writing failed".to_string(),
            source: std::io::Error::other(error),
        }
    }
}
