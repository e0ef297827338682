//! Error types for the Workforce Engine.
//!
//! Only conditions the engine cannot recover from are raised through
//! [`EngineError`]. Per-record data problems are collected as
//! [`DataDefect`](crate::models::DataDefect)s and reported next to the
//! results instead.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the Workforce Engine.
///
/// # Example
///
/// ```
/// use workforce_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but is semantically unusable.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        message: String,
    },

    /// A reference period was constructed with inconsistent bounds.
    #[error("Invalid period: {message}")]
    InvalidPeriod {
        /// Why the period was rejected.
        message: String,
    },

    /// One of the required source collections was absent while the other
    /// was supplied.
    #[error("Missing {collection} collection for period ending {period_end}")]
    MissingCollection {
        /// Name of the missing collection ("employees" or "attendance").
        collection: String,
        /// Last day of the period being built.
        period_end: NaiveDate,
    },

    /// A report could not be serialized for export.
    #[error("Serialization error: {message}")]
    Serialization {
        /// The underlying serializer message.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

impl From<serde_json::Error> for EngineError {
    fn from(error: serde_json::Error) -> Self {
        EngineError::Serialization {
            message: error.to_string(),
        }
    }
}
