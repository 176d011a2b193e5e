//! Resolution and metadata errors.
//!
//! The full error taxonomy spans two crates: resolution failures originate
//! here, execution-side failures in `actuate-runtime`. [`ErrorKind`] gives
//! both a shared, stable classification for callers that map errors to exit
//! codes or JSON error payloads.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for resolution operations
pub type ResolutionResult<T> = Result<T, ResolutionError>;

/// Stable classification of every failure the dispatcher can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller supplied an unknown action or unusable input.
    Usage,
    /// No automation reference could be determined.
    ResolutionFailure,
    /// The addressed automation does not exist at invocation time.
    TargetNotFound,
    /// The external call failed after exhausting retries.
    ExecutionFailure,
    /// The automation ran but its output was not valid structured data.
    MalformedOutput,
    /// The caller's cancellation fired mid-execution.
    CancellationFailure,
    /// Configuration could not be read or written.
    Config,
}

impl ErrorKind {
    /// Machine-readable label used in JSON error payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Usage => "usage",
            ErrorKind::ResolutionFailure => "resolution_failure",
            ErrorKind::TargetNotFound => "target_not_found",
            ErrorKind::ExecutionFailure => "execution_failure",
            ErrorKind::MalformedOutput => "malformed_output",
            ErrorKind::CancellationFailure => "cancelled",
            ErrorKind::Config => "config",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while determining which automation to run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// The action id is not part of the catalog.
    #[error("unknown action: {action_id}")]
    UnknownAction { action_id: String },

    /// No override, no valid mapping, and no installed candidate.
    #[error("{}", no_automation_message(.action_id, .candidates))]
    NoAutomation {
        action_id: String,
        candidates: Vec<String>,
    },
}

impl ResolutionError {
    /// Create an unknown action error
    pub fn unknown_action(action_id: impl Into<String>) -> Self {
        Self::UnknownAction {
            action_id: action_id.into(),
        }
    }

    /// Create a no-automation error carrying the candidates that were tried
    pub fn no_automation(action_id: impl Into<String>, candidates: Vec<String>) -> Self {
        Self::NoAutomation {
            action_id: action_id.into(),
            candidates,
        }
    }

    /// The action this error refers to.
    pub fn action_id(&self) -> &str {
        match self {
            Self::UnknownAction { action_id } | Self::NoAutomation { action_id, .. } => action_id,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownAction { .. } => ErrorKind::Usage,
            Self::NoAutomation { .. } => ErrorKind::ResolutionFailure,
        }
    }
}

fn no_automation_message(action_id: &str, candidates: &[String]) -> String {
    if candidates.is_empty() {
        format!("no matching automation found for action {action_id}")
    } else {
        format!(
            "no matching automation found for action {action_id}; expected one of: {}",
            candidates.join(", ")
        )
    }
}

/// Errors building the payload handed to an automation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("missing task for action {action_id} (provide a task or JSON input)")]
    MissingTask { action_id: String },

    #[error("unknown parameter '{parameter}' for action {action_id}")]
    UnknownParameter {
        action_id: String,
        parameter: String,
    },
}

impl InputError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Usage
    }
}

/// Errors raised by app metadata providers.
///
/// Callers degrade to [`crate::AppMetadata::empty`] on any of these.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to read metadata snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse metadata snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("app metadata unavailable: {0}")]
    Unavailable(String),
}
