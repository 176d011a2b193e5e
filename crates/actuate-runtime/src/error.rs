//! Umbrella error for end-to-end dispatch.

use crate::executor::ExecutionError;
use actuate_core::{ErrorKind, InputError, ResolutionError};
use std::time::Duration;
use thiserror::Error;

/// Result type for dispatcher operations
pub type ActuateResult<T> = Result<T, ActuateError>;

/// Every failure a [`crate::Dispatcher`] can report, with enough context
/// (action, automation, attempts) for callers to log it.
#[derive(Debug, Error)]
pub enum ActuateError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    InvalidInput(#[from] InputError),

    #[error("automation not found: {automation} (action {action_id})")]
    TargetNotFound {
        action_id: String,
        automation: String,
        attempts: u32,
        #[source]
        source: ExecutionError,
    },

    #[error("action {action_id} failed: {source}")]
    Execution {
        action_id: String,
        #[source]
        source: ExecutionError,
    },

    #[error("automation {automation} returned invalid JSON for action {action_id}: {source}")]
    MalformedOutput {
        action_id: String,
        automation: String,
        attempts: u32,
        #[source]
        source: serde_json::Error,
    },
}

impl ActuateError {
    /// Classify an execution failure against an automation.
    pub fn from_execution(action_id: impl Into<String>, source: ExecutionError) -> Self {
        let action_id = action_id.into();
        if source.is_target_not_found() {
            Self::TargetNotFound {
                action_id,
                automation: source.automation().to_string(),
                attempts: source.attempts(),
                source,
            }
        } else {
            Self::Execution { action_id, source }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Resolution(e) => e.kind(),
            Self::InvalidInput(e) => e.kind(),
            Self::TargetNotFound { .. } => ErrorKind::TargetNotFound,
            Self::Execution {
                source: ExecutionError::Cancelled { .. },
                ..
            } => ErrorKind::CancellationFailure,
            Self::Execution { .. } => ErrorKind::ExecutionFailure,
            Self::MalformedOutput { .. } => ErrorKind::MalformedOutput,
        }
    }

    pub fn action_id(&self) -> &str {
        match self {
            Self::Resolution(e) => e.action_id(),
            Self::InvalidInput(InputError::MissingTask { action_id })
            | Self::InvalidInput(InputError::UnknownParameter { action_id, .. })
            | Self::TargetNotFound { action_id, .. }
            | Self::Execution { action_id, .. }
            | Self::MalformedOutput { action_id, .. } => action_id,
        }
    }

    /// Automation that was addressed, when resolution got that far.
    pub fn automation(&self) -> Option<&str> {
        match self {
            Self::Resolution(_) | Self::InvalidInput(_) => None,
            Self::TargetNotFound { automation, .. } | Self::MalformedOutput { automation, .. } => {
                Some(automation)
            }
            Self::Execution { source, .. } => Some(source.automation()),
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Resolution(_) | Self::InvalidInput(_) => 0,
            Self::TargetNotFound { attempts, .. } | Self::MalformedOutput { attempts, .. } => {
                *attempts
            }
            Self::Execution { source, .. } => source.attempts(),
        }
    }

    pub fn elapsed(&self) -> Option<Duration> {
        match self {
            Self::TargetNotFound { source, .. } | Self::Execution { source, .. } => {
                Some(source.elapsed())
            }
            _ => None,
        }
    }
}
