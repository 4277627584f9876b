// Domain errors - failure classes produced by the pure decision core

use thiserror::Error;

/// Errors raised while resolving decisions, before any external tool runs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid or contradictory arguments
    #[error("invalid arguments: {0}")]
    BadArgs(String),

    /// No stream in the input satisfies the selection criteria
    #[error("{0}")]
    NoEligibleStream(String),

    /// A requested timestamp lies past the end of the media timeline
    #[error("timestamp {requested:.3}s is beyond the end of the video ({duration:.3}s)")]
    TimestampBeyondEnd { requested: f64, duration: f64 },

    /// The probed structure is malformed or cannot be represented
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// Probing the input failed
    #[error("probe failed: {0}")]
    ProbeFail(String),
}
