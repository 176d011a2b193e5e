//! Configuration schema.

use crate::error::{ConfigError, ConfigResult};
use actuate_core::{AutomationRef, MappingSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Output preference passed to the invoker unless configured otherwise.
pub const DEFAULT_OUTPUT_TYPE: &str = "public.plain-text";

/// Defaults for retry, backoff and timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    /// Deadline for one execution across all attempts; zero disables it.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub retries: u32,
    /// Initial backoff between attempts.
    #[serde(with = "humantime_serde")]
    pub retry_wait: Duration,
    pub output_type: String,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retries: 0,
            retry_wait: Duration::from_secs(1),
            output_type: DEFAULT_OUTPUT_TYPE.to_string(),
        }
    }
}

/// Whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub execution: ExecutionSettings,

    /// Action id to user-chosen automation.
    pub mappings: BTreeMap<String, AutomationRef>,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn mapping(&self, action_id: &str) -> Option<&AutomationRef> {
        self.mappings.get(action_id)
    }

    /// Mappings sorted by action id.
    pub fn mappings(&self) -> impl Iterator<Item = (&str, &AutomationRef)> {
        self.mappings.iter().map(|(id, r)| (id.as_str(), r))
    }

    /// Insert or replace a mapping. Blank fields are dropped; a reference
    /// with neither a name nor an id is rejected.
    pub fn set_mapping(
        &mut self,
        action_id: impl Into<String>,
        reference: AutomationRef,
    ) -> ConfigResult<Option<AutomationRef>> {
        let action_id = action_id.into();
        let reference = AutomationRef {
            name: reference.name().map(str::to_string),
            id: reference.id().map(str::to_string),
        };
        if reference.is_empty() {
            return Err(ConfigError::invalid_mapping(
                action_id,
                "a name or an id is required",
            ));
        }
        tracing::debug!(action = %action_id, automation = %reference.label(), "Setting mapping");
        Ok(self.mappings.insert(action_id, reference))
    }

    pub fn remove_mapping(&mut self, action_id: &str) -> Option<AutomationRef> {
        self.mappings.remove(action_id)
    }
}

impl MappingSource for Config {
    fn mapping(&self, action_id: &str) -> Option<AutomationRef> {
        self.mappings.get(action_id).cloned()
    }
}

/// humantime-formatted `Duration` fields.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        let text = text.trim();
        if text == "0" {
            return Ok(Duration::ZERO);
        }
        humantime::parse_duration(text).map_err(D::Error::custom)
    }
}
