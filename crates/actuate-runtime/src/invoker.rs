//! Collaborator seams: the automation invoker and the index provider.

use actuate_core::AutomationIndex;
use async_trait::async_trait;
use thiserror::Error;

/// Text fragments the host emits when a named automation does not exist.
const NOT_FOUND_MARKERS: [&str; 2] = ["couldn't find shortcut", "find shortcut"];

/// One named output blob produced by an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl OutputArtifact {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// A single call to an external automation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    pub automation: String,
    pub payload: Vec<u8>,
    /// Output preference forwarded to the host, e.g. `public.plain-text`.
    pub output_type: Option<String>,
}

/// Errors reported by an [`AutomationInvoker`] or [`IndexProvider`].
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("automation {automation} failed ({status}): {stderr}")]
    Failed {
        automation: String,
        status: String,
        stderr: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl InvokeError {
    pub fn failed(
        automation: impl Into<String>,
        status: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::Failed {
            automation: automation.into(),
            status: status.into(),
            stderr: stderr.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Whether the host reported that the addressed automation does not exist.
    ///
    /// Recognized from the error text only; the host exposes no error code.
    pub fn is_target_not_found(&self) -> bool {
        is_not_found_text(&self.to_string())
    }
}

/// Case-insensitive check for the host's "not found" phrasing.
pub fn is_not_found_text(text: &str) -> bool {
    let text = text.to_lowercase();
    NOT_FOUND_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Runs a named automation and returns its raw output artifacts.
#[async_trait]
pub trait AutomationInvoker: Send + Sync {
    async fn invoke(&self, request: &InvocationRequest) -> Result<Vec<OutputArtifact>, InvokeError>;
}

/// Enumerates installed automations.
#[async_trait]
pub trait IndexProvider: Send + Sync {
    async fn list(&self) -> Result<AutomationIndex, InvokeError>;
}
