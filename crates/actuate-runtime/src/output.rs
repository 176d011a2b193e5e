//! Merging of invocation artifacts into a single output.

use crate::invoker::OutputArtifact;
use serde_json::Value;

/// Collapses the artifacts of one invocation into one byte payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputNormalizer;

impl OutputNormalizer {
    /// Merge `artifacts`.
    ///
    /// - none: empty output
    /// - one: its bytes, untouched
    /// - several: a JSON array ordered by artifact name, each element parsed
    ///   as JSON when valid and kept as trimmed text otherwise
    pub fn merge(mut artifacts: Vec<OutputArtifact>) -> Vec<u8> {
        match artifacts.len() {
            0 => Vec::new(),
            1 => artifacts.pop().map(|a| a.bytes).unwrap_or_default(),
            _ => {
                artifacts.sort_by(|a, b| a.name.cmp(&b.name));
                let items: Vec<Value> = artifacts
                    .iter()
                    .map(|artifact| artifact_value(&artifact.bytes))
                    .collect();
                Value::Array(items).to_string().into_bytes()
            }
        }
    }
}

fn artifact_value(bytes: &[u8]) -> Value {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => value,
        Err(_) => Value::String(String::from_utf8_lossy(bytes).trim().to_string()),
    }
}
