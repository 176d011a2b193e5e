//! Machine-readable response envelopes.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use std::time::Duration;

/// Action reference inside an envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRef {
    pub id: String,
}

/// Automation reference inside an envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceRef {
    pub name: String,
}

/// Successful response wrapper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    pub ok: bool,
    pub timestamp: String,
    pub action: ActionRef,
    pub source: SourceRef,
    pub attempts: u32,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    pub result: Value,
}

impl ResponseEnvelope {
    /// Build an envelope stamped with the current time.
    pub fn new(
        action_id: &str,
        automation: &str,
        attempts: u32,
        elapsed: Duration,
        input: Option<&[u8]>,
        output: &[u8],
    ) -> Self {
        Self::at(Utc::now(), action_id, automation, attempts, elapsed, input, output)
    }

    pub fn at(
        timestamp: DateTime<Utc>,
        action_id: &str,
        automation: &str,
        attempts: u32,
        elapsed: Duration,
        input: Option<&[u8]>,
        output: &[u8],
    ) -> Self {
        Self {
            ok: true,
            timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            action: ActionRef {
                id: action_id.to_string(),
            },
            source: SourceRef {
                name: automation.to_string(),
            },
            attempts,
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            input: input.and_then(normalize_input),
            result: normalize_output(output, automation),
        }
    }
}

/// Error body inside an [`ErrorEnvelope`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Failure response wrapper: `{"ok": false, "error": {"code", "message"}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEnvelope {
    pub ok: bool,
    pub error: ErrorBody,
}

impl ErrorEnvelope {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

/// Parse output as JSON, wrapping anything else as text. Never fails.
pub fn normalize_output(output: &[u8], source: &str) -> Value {
    if let Ok(value) = serde_json::from_slice::<Value>(output) {
        return value;
    }
    json!({
        "raw": String::from_utf8_lossy(output).trim(),
        "format": "text",
        "source": source,
    })
}

/// Echo of the input: JSON when valid, trimmed text otherwise, `None` when blank.
pub fn normalize_input(input: &[u8]) -> Option<Value> {
    if let Ok(value) = serde_json::from_slice::<Value>(input) {
        return Some(value);
    }
    let text = String::from_utf8_lossy(input);
    let text = text.trim();
    (!text.is_empty()).then(|| Value::String(text.to_string()))
}
