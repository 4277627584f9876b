//! Error handling module for mediaconform

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type for processing requests
#[derive(Error, Debug)]
pub enum ConformError {
    /// No stream in the input satisfies the selection criteria.
    /// User-correctable; never retried.
    #[error("no eligible stream: {message}")]
    NoEligibleStream { message: String },

    /// A requested timestamp lies past the end of the media timeline.
    /// User-correctable; never retried.
    #[error("timestamp {requested:.3}s is beyond the end of the video ({duration:.3}s)")]
    TimestampBeyondEnd { requested: f64, duration: f64 },

    /// The external transcode worker exited with a failure
    #[error("transcode worker failed (exit code {exit_code:?}): {stderr}")]
    WorkerFailure {
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The input itself is malformed or structurally unsupported
    #[error("unsupported input: {message}")]
    UnsupportedInput { message: String },

    /// Media probe error
    #[error("failed to probe media file: {message}")]
    ProbeError { message: String },

    /// Configuration error
    #[error("configuration error: {message}")]
    ConfigError { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<DomainError> for ConformError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::BadArgs(message) => ConformError::ConfigError { message },
            DomainError::NoEligibleStream(message) => ConformError::NoEligibleStream { message },
            DomainError::TimestampBeyondEnd {
                requested,
                duration,
            } => ConformError::TimestampBeyondEnd {
                requested,
                duration,
            },
            DomainError::UnsupportedInput(message) => ConformError::UnsupportedInput { message },
            DomainError::ProbeFail(message) => ConformError::ProbeError { message },
        }
    }
}

/// Result type alias for processing requests
pub type ConformResult<T> = std::result::Result<T, ConformError>;
