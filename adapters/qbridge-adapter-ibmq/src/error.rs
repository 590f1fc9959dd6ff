//! Error types for the IBM Q connector.

use std::path::PathBuf;

use qbridge_hal::HalError;
use thiserror::Error;

/// Result type for IBM Q operations.
pub type IbmqResult<T> = Result<T, IbmqError>;

/// Errors that can occur when using IBM Q.
#[derive(Debug, Error)]
pub enum IbmqError {
    /// No token given and no stored account could be loaded.
    #[error("No active IBM Q account, and no IBM Q token provided.")]
    NoAccount,

    /// Token cannot be used as a bearer credential.
    #[error("Invalid IBM Q API token")]
    InvalidToken,

    /// Stored credentials exist but are unusable.
    #[error("IBM Q account error: {0}")]
    AccountError(String),

    /// Device configuration file could not be parsed.
    #[error("Invalid device configuration in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// Filesystem error.
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API returned an error.
    #[error("IBM Q API error: {message}")]
    ApiError {
        /// Error code from API.
        code: Option<String>,
        /// Error message.
        message: String,
    },

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Job failed.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// Job was cancelled.
    #[error("Job was cancelled: {0}")]
    JobCancelled(String),

    /// Circuit conversion error.
    #[error("Circuit conversion error: {0}")]
    CircuitError(String),

    /// Backend not available.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// Timeout waiting for job.
    #[error("Timeout waiting for job")]
    Timeout,

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Run bookkeeping was requested before any job ran.
    #[error("No job has been executed on this device")]
    NoCurrentJob,

    /// Error from the execution contract.
    #[error(transparent)]
    Hal(#[from] HalError),
}

impl From<IbmqError> for HalError {
    fn from(e: IbmqError) -> Self {
        match e {
            IbmqError::NoAccount | IbmqError::InvalidToken | IbmqError::AccountError(_) => {
                HalError::AuthenticationFailed(e.to_string())
            }
            IbmqError::Config { .. } | IbmqError::Io { .. } => {
                HalError::Configuration(e.to_string())
            }
            IbmqError::JobNotFound(id) => HalError::JobNotFound(id),
            IbmqError::JobFailed(msg) => HalError::JobFailed(msg),
            IbmqError::JobCancelled(_) => HalError::JobCancelled,
            IbmqError::BackendUnavailable(msg) => HalError::BackendUnavailable(msg),
            IbmqError::CircuitError(msg) => HalError::InvalidCircuit(msg),
            IbmqError::Timeout => HalError::Timeout("IBM Q job".to_string()),
            IbmqError::HttpError(e) => HalError::Network(e),
            IbmqError::JsonError(e) => HalError::Serialization(e),
            IbmqError::Hal(e) => e,
            _ => HalError::Backend(e.to_string()),
        }
    }
}
