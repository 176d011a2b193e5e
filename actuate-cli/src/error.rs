use actuate_config::ConfigError;
use actuate_core::{ErrorKind, ResolutionError};
use actuate_runtime::ActuateError;
use thiserror::Error;

/// Generic failure.
pub const EXIT_FAILURE: i32 = 1;
/// Bad arguments, unknown action or unusable input.
pub const EXIT_USAGE: i32 = 2;
/// No automation could be found for the action.
pub const EXIT_AUTOMATION_MISSING: i32 = 12;
/// The automation ran and failed.
pub const EXIT_ACTION_FAILED: i32 = 13;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Actuate(#[from] ActuateError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Usage(String),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ResolutionError> for CliError {
    fn from(error: ResolutionError) -> Self {
        Self::Actuate(error.into())
    }
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Classification, when the failure maps onto one.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Actuate(e) => Some(e.kind()),
            Self::Config(_) => Some(ErrorKind::Config),
            Self::Usage(_) => Some(ErrorKind::Usage),
            Self::Io(_) | Self::Json(_) => None,
        }
    }

    /// Machine-readable code for JSON error output.
    pub fn code(&self) -> &'static str {
        self.kind().map(|kind| kind.as_str()).unwrap_or("io")
    }

    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            Some(ErrorKind::Usage) => EXIT_USAGE,
            Some(ErrorKind::ResolutionFailure | ErrorKind::TargetNotFound) => {
                EXIT_AUTOMATION_MISSING
            }
            Some(
                ErrorKind::ExecutionFailure
                | ErrorKind::MalformedOutput
                | ErrorKind::CancellationFailure,
            ) => EXIT_ACTION_FAILED,
            Some(ErrorKind::Config) | None => EXIT_FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actuate_core::InputError;

    #[test]
    fn exit_codes_follow_error_kind() {
        assert_eq!(CliError::usage("bad").exit_code(), EXIT_USAGE);
        assert_eq!(
            CliError::from(ResolutionError::unknown_action("fly")).exit_code(),
            EXIT_USAGE
        );
        assert_eq!(
            CliError::from(ResolutionError::no_automation("task-list", Vec::new())).exit_code(),
            EXIT_AUTOMATION_MISSING
        );
        assert_eq!(
            CliError::from(ActuateError::from(InputError::MissingTask {
                action_id: "timer-start".to_string()
            }))
            .exit_code(),
            EXIT_USAGE
        );
        assert_eq!(
            CliError::from(ConfigError::NoConfigDir { env: "X" }).exit_code(),
            EXIT_FAILURE
        );
    }

    #[test]
    fn codes_are_stable_labels() {
        assert_eq!(CliError::usage("x").code(), "usage");
        assert_eq!(
            CliError::from(ResolutionError::no_automation("pause", Vec::new())).code(),
            "resolution_failure"
        );
        assert_eq!(CliError::Io(std::io::Error::other("closed")).code(), "io");
    }
}
