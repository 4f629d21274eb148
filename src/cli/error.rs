//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::{ApplicationError, ErrorKind};
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Store(_) => crate::exitcode::UNAVAILABLE,
                InfraError::Server { .. } => crate::exitcode::UNAVAILABLE,
                InfraError::Application(ApplicationError::Config { .. }) => {
                    crate::exitcode::CONFIG
                }
                InfraError::Application(app) => match app.kind() {
                    ErrorKind::Validation | ErrorKind::Conflict | ErrorKind::NotFound => {
                        crate::exitcode::DATAERR
                    }
                    ErrorKind::Internal => crate::exitcode::SOFTWARE,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn given_user_errors_when_exit_code_then_dataerr() {
        let conflict = CliError::from(ApplicationError::Conflict("A".into()));
        let missing = CliError::from(ApplicationError::NotFound("A".into()));
        let invalid = CliError::from(ApplicationError::from(DomainError::EmptyGardenName));

        assert_eq!(conflict.exit_code(), crate::exitcode::DATAERR);
        assert_eq!(missing.exit_code(), crate::exitcode::DATAERR);
        assert_eq!(invalid.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_config_error_when_exit_code_then_config() {
        let err = CliError::from(ApplicationError::Config {
            message: "bad".into(),
        });
        assert_eq!(err.exit_code(), crate::exitcode::CONFIG);
    }

    #[test]
    fn given_usage_error_when_exit_code_then_usage() {
        assert_eq!(
            CliError::InvalidArgs("x".into()).exit_code(),
            crate::exitcode::USAGE
        );
    }
}
