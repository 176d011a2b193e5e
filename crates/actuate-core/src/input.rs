//! Input payload construction.

use crate::action::ActionDefinition;
use crate::error::InputError;
use std::collections::BTreeMap;

/// Build the payload for `action`.
///
/// Raw input wins verbatim. Otherwise a JSON object is assembled from the
/// trimmed task and the given parameters; an empty object yields `None` and
/// the executor substitutes `{}`.
pub fn build_input(
    action: &ActionDefinition,
    task: Option<&str>,
    parameters: &BTreeMap<String, String>,
    raw: Option<&[u8]>,
) -> Result<Option<Vec<u8>>, InputError> {
    if let Some(raw) = raw.filter(|raw| !raw.is_empty()) {
        return Ok(Some(raw.to_vec()));
    }

    let mut payload = serde_json::Map::new();
    let task = task.map(str::trim).filter(|task| !task.is_empty());
    match task {
        Some(task) => {
            payload.insert("task".to_string(), serde_json::Value::from(task));
        }
        None if action.requires_task => {
            return Err(InputError::MissingTask {
                action_id: action.id.clone(),
            });
        }
        None => {}
    }

    for (name, value) in parameters {
        if !action.parameters.contains_key(name) {
            return Err(InputError::UnknownParameter {
                action_id: action.id.clone(),
                parameter: name.clone(),
            });
        }
        if !value.is_empty() {
            payload.insert(name.clone(), serde_json::Value::from(value.as_str()));
        }
    }

    if payload.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::Value::Object(payload).to_string().into_bytes()))
}

/// Extract the trimmed `task` field from raw JSON object input.
pub fn task_from_input(raw: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(raw).ok()?;
    value
        .get("task")?
        .as_str()
        .map(str::trim)
        .filter(|task| !task.is_empty())
        .map(str::to_string)
}
