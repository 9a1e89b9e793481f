//! Application-level errors
//!
//! Domain errors never surface here: readers fold them into degraded models.

use thiserror::Error;

/// Failures of the listing use case and its configuration.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("failed to open locator {locator}")]
    SourceUnavailable {
        locator: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {message}")]
    Config { message: String },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
