//! Error types for blazecal.

use thiserror::Error;

/// Errors that can occur in blazecal operations.
#[derive(Error, Debug)]
pub enum CalError {
    #[error("Malformed recurrence rule: {0}")]
    MalformedRule(String),

    #[error("Event not found: {0}")]
    NotFound(String),

    #[error("Transport failure: {0}")]
    TransportFailure(String),

    #[error("Event '{0}' has no recurrence rule")]
    NotRecurring(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for blazecal operations.
pub type CalResult<T> = Result<T, CalError>;
