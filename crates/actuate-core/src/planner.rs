//! Resolution precedence: override, persisted mapping, then discovery.
//!
//! The planner never retries an earlier stage once a later one is reached,
//! and once it returns a reference it is done: execution failures against
//! that reference are reported by the caller, not fed back here.

use crate::action::ActionDefinition;
use crate::candidates::{CandidateList, CandidateResolver};
use crate::error::{ResolutionError, ResolutionResult};
use crate::index::AutomationIndex;
use crate::matcher::Matcher;
use crate::metadata::AppMetadata;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// A user-configured reference to an automation, by name and/or id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl AutomationRef {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            id: None,
        }
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            name: None,
            id: Some(id.into()),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Non-blank name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    /// Non-blank id, if any.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.name().is_none() && self.id().is_none()
    }

    /// Human label: the name, else the id.
    pub fn label(&self) -> &str {
        self.name().or_else(|| self.id()).unwrap_or_default()
    }
}

/// Read-only view of persisted action mappings.
pub trait MappingSource {
    fn mapping(&self, action_id: &str) -> Option<AutomationRef>;
}

impl MappingSource for BTreeMap<String, AutomationRef> {
    fn mapping(&self, action_id: &str) -> Option<AutomationRef> {
        self.get(action_id).cloned()
    }
}

impl MappingSource for HashMap<String, AutomationRef> {
    fn mapping(&self, action_id: &str) -> Option<AutomationRef> {
        self.get(action_id).cloned()
    }
}

/// No persisted mappings at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMappings;

impl MappingSource for NoMappings {
    fn mapping(&self, _action_id: &str) -> Option<AutomationRef> {
        None
    }
}

/// Which precedence stage produced the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Override,
    Mapping,
    Discovered,
    /// Taken from a caller-supplied candidate list.
    Candidate,
}

impl ResolutionSource {
    /// Whether the caller addressed this automation explicitly.
    pub fn is_explicit(&self) -> bool {
        matches!(self, Self::Override | Self::Mapping)
    }

    /// Label matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::Mapping => "mapping",
            Self::Discovered => "discovered",
            Self::Candidate => "candidate",
        }
    }
}

impl std::fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Name passed to the invoker.
    pub automation: String,
    pub source: ResolutionSource,
    /// Candidates computed during discovery; empty for earlier stages.
    pub candidates: CandidateList,
}

/// What to resolve.
#[derive(Debug, Clone)]
pub struct ResolutionRequest<'a> {
    pub action: &'a ActionDefinition,
    pub task: Option<String>,
    pub override_name: Option<String>,
}

impl<'a> ResolutionRequest<'a> {
    pub fn new(action: &'a ActionDefinition) -> Self {
        Self {
            action,
            task: None,
            override_name: None,
        }
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = Some(task.into());
        self
    }

    pub fn with_override(mut self, name: impl Into<String>) -> Self {
        self.override_name = Some(name.into());
        self
    }

    /// Trimmed task, empty when none was given.
    pub fn task(&self) -> &str {
        self.task.as_deref().map(str::trim).unwrap_or_default()
    }

    /// Non-blank override, if any.
    pub fn override_name(&self) -> Option<&str> {
        self.override_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }

    /// Whether planning will consult the automation index.
    pub fn needs_index(&self) -> bool {
        self.override_name().is_none()
    }
}

/// Applies override → mapping → discovery precedence.
pub struct ResolutionPlanner<'a> {
    metadata: &'a AppMetadata,
    mappings: &'a dyn MappingSource,
    locales: Vec<String>,
}

impl<'a> ResolutionPlanner<'a> {
    pub fn new(metadata: &'a AppMetadata, mappings: &'a dyn MappingSource) -> Self {
        Self {
            metadata,
            mappings,
            locales: Vec::new(),
        }
    }

    /// Preferred locales, most preferred first.
    pub fn with_locales(mut self, locales: Vec<String>) -> Self {
        self.locales = locales;
        self
    }

    /// Candidate names discovery would try for `request`.
    pub fn candidates(&self, request: &ResolutionRequest<'_>) -> CandidateList {
        CandidateResolver::new(self.metadata)
            .with_locales(&self.locales)
            .resolve(request.action, request.task())
    }

    pub fn plan(
        &self,
        request: &ResolutionRequest<'_>,
        index: &AutomationIndex,
    ) -> ResolutionResult<Resolution> {
        let action_id = request.action.id.as_str();

        if let Some(name) = request.override_name() {
            info!(action = %action_id, automation = %name, "Using explicit override");
            return Ok(Resolution {
                automation: name.to_string(),
                source: ResolutionSource::Override,
                candidates: CandidateList::new(),
            });
        }

        let matcher = Matcher::new(index);

        if let Some(mapping) = self.mappings.mapping(action_id).filter(|m| !m.is_empty()) {
            let hit = mapping
                .name()
                .and_then(|name| matcher.find(name))
                .or_else(|| mapping.id().and_then(|id| matcher.find(id)));

            match hit {
                Some((name, kind)) => {
                    info!(
                        action = %action_id,
                        automation = %name,
                        ?kind,
                        "Using persisted mapping"
                    );
                    return Ok(Resolution {
                        automation: name.to_string(),
                        source: ResolutionSource::Mapping,
                        candidates: CandidateList::new(),
                    });
                }
                None => {
                    warn!(
                        action = %action_id,
                        mapping = %mapping.label(),
                        "Persisted mapping not installed, falling back to discovery"
                    );
                }
            }
        }

        let candidates = self.candidates(request);
        match matcher.first_match(&candidates) {
            Some(hit) => {
                info!(
                    action = %action_id,
                    automation = %hit.name,
                    position = hit.position,
                    "Resolved automation"
                );
                Ok(Resolution {
                    automation: hit.name.to_string(),
                    source: ResolutionSource::Discovered,
                    candidates,
                })
            }
            None => {
                debug!(action = %action_id, index_size = index.len(), "No candidate installed");
                Err(ResolutionError::no_automation(
                    action_id,
                    candidates.into_vec(),
                ))
            }
        }
    }
}
