//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::from(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Infra(InfraError::Io { .. }) => exitcode::IOERR,
            CliError::Infra(InfraError::Application(app)) => match app {
                ApplicationError::SourceUnavailable { .. } => exitcode::NOINPUT,
                ApplicationError::Config { .. } => exitcode::CONFIG,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_unreachable_locator_when_mapping_then_noinput() {
        let err = CliError::from(ApplicationError::SourceUnavailable {
            locator: "missing.txt".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        assert_eq!(err.exit_code(), exitcode::NOINPUT);
    }

    #[test]
    fn given_each_layer_when_mapping_then_distinct_codes() {
        let config = CliError::from(ApplicationError::Config {
            message: "bad".to_string(),
        });
        let io = CliError::Infra(InfraError::io(
            "temp dir",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        ));

        assert_eq!(config.exit_code(), exitcode::CONFIG);
        assert_eq!(io.exit_code(), exitcode::IOERR);
    }
}
