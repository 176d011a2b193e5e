//! Optional JSON-lines trace of every execution.

use crate::envelope::normalize_input;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// One line of the trace file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEntry {
    pub timestamp: String,
    pub automation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TraceEntry {
    pub fn new(automation: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            automation: automation.into(),
            input: None,
            output: None,
            error: None,
        }
    }

    pub fn with_input(mut self, input: &[u8]) -> Self {
        self.input = normalize_input(input);
        self
    }

    pub fn with_output(mut self, output: &[u8]) -> Self {
        self.output = normalize_input(output);
        self
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

/// Appends [`TraceEntry`] lines to a file.
#[derive(Debug, Clone)]
pub struct TraceLog {
    path: PathBuf,
}

impl TraceLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, entry: &TraceEntry) -> std::io::Result<()> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await
    }

    /// Append, logging instead of failing.
    pub async fn record(&self, entry: &TraceEntry) {
        if let Err(e) = self.append(entry).await {
            warn!(path = %self.path.display(), error = %e, "Failed to write trace entry");
        }
    }
}
