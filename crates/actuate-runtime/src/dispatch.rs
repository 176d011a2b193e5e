//! End-to-end dispatch: resolve an action, execute it, report the outcome.

use crate::envelope::ResponseEnvelope;
use crate::error::{ActuateError, ActuateResult};
use crate::executor::{ExecutionError, ExecutionResult, Executor, RetryPolicy};
use crate::invoker::{AutomationInvoker, IndexProvider};
use crate::trace::{TraceEntry, TraceLog};
use actuate_core::{
    ActionCatalog, ActionDefinition, AppMetadata, AutomationIndex, CandidateList, Matcher,
    MappingSource, NoMappings, Resolution, ResolutionError, ResolutionPlanner, ResolutionRequest,
    ResolutionSource, build_input, task_from_input,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Caller-facing description of one action run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchRequest {
    pub action_id: String,
    pub task: Option<String>,
    pub parameters: BTreeMap<String, String>,
    /// Already-serialized input; takes precedence over task and parameters.
    pub raw_input: Option<Vec<u8>>,
    pub override_name: Option<String>,
}

impl DispatchRequest {
    pub fn new(action_id: impl Into<String>) -> Self {
        Self {
            action_id: action_id.into(),
            ..Self::default()
        }
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = Some(task.into());
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn with_raw_input(mut self, raw: impl Into<Vec<u8>>) -> Self {
        self.raw_input = Some(raw.into());
        self
    }

    pub fn with_override(mut self, name: impl Into<String>) -> Self {
        self.override_name = Some(name.into());
        self
    }

    /// Task used for template expansion: explicit, else from JSON input.
    pub fn effective_task(&self) -> Option<String> {
        self.task
            .as_deref()
            .map(str::trim)
            .filter(|task| !task.is_empty())
            .map(str::to_string)
            .or_else(|| self.raw_input.as_deref().and_then(task_from_input))
    }
}

/// A completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub action_id: String,
    pub resolution: Resolution,
    pub execution: ExecutionResult,
    /// Payload that was sent, `None` when the default empty object was used.
    pub input: Option<Vec<u8>>,
}

impl DispatchOutcome {
    pub fn envelope(&self) -> ResponseEnvelope {
        ResponseEnvelope::new(
            &self.action_id,
            &self.resolution.automation,
            self.execution.attempts,
            self.execution.elapsed,
            self.input.as_deref(),
            &self.execution.output,
        )
    }
}

/// What a run would do, without doing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DryRun {
    pub action_id: String,
    pub resolution: Resolution,
    #[serde(serialize_with = "serialize_payload")]
    pub input: Option<Vec<u8>>,
}

fn serialize_payload<S>(input: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let value = input
        .as_deref()
        .and_then(crate::envelope::normalize_input)
        .unwrap_or_else(|| serde_json::json!({}));
    value.serialize(serializer)
}

/// Which catalog actions are runnable against the installed automations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Coverage {
    pub available: Vec<String>,
    pub missing: Vec<String>,
}

/// Resolves actions and executes them through an [`Executor`].
pub struct Dispatcher {
    catalog: ActionCatalog,
    metadata: AppMetadata,
    mappings: Arc<dyn MappingSource + Send + Sync>,
    index: Arc<dyn IndexProvider>,
    executor: Executor,
    locales: Vec<String>,
    trace: Option<TraceLog>,
    require_structured: bool,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("actions", &self.catalog.len())
            .field("executor", &self.executor)
            .field("locales", &self.locales)
            .field("trace", &self.trace)
            .field("require_structured", &self.require_structured)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(invoker: Arc<dyn AutomationInvoker>, index: Arc<dyn IndexProvider>) -> Self {
        Self {
            catalog: ActionCatalog::builtin(),
            metadata: AppMetadata::empty(),
            mappings: Arc::new(NoMappings),
            index,
            executor: Executor::new(invoker),
            locales: Vec::new(),
            trace: None,
            require_structured: false,
        }
    }

    pub fn with_catalog(mut self, catalog: ActionCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_metadata(mut self, metadata: AppMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_mappings(mut self, mappings: Arc<dyn MappingSource + Send + Sync>) -> Self {
        self.mappings = mappings;
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.executor = self.executor.with_policy(policy);
        self
    }

    pub fn with_output_type(mut self, output_type: impl Into<String>) -> Self {
        self.executor = self.executor.with_output_type(output_type);
        self
    }

    /// Preferred locales, most preferred first.
    pub fn with_locales(mut self, locales: Vec<String>) -> Self {
        self.locales = locales;
        self
    }

    pub fn with_trace(mut self, trace: TraceLog) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Reject non-JSON output from overridden or mapped automations.
    pub fn require_structured(mut self, require: bool) -> Self {
        self.require_structured = require;
        self
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    pub fn metadata(&self) -> &AppMetadata {
        &self.metadata
    }

    pub fn mapping(&self, action_id: &str) -> Option<actuate_core::AutomationRef> {
        self.mappings.mapping(action_id)
    }

    fn planner(&self) -> ResolutionPlanner<'_> {
        ResolutionPlanner::new(&self.metadata, self.mappings.as_ref())
            .with_locales(self.locales.clone())
    }

    fn action(&self, action_id: &str) -> ActuateResult<&ActionDefinition> {
        Ok(self.catalog.find(action_id)?)
    }

    /// Fetch a fresh index. Provider failure means nothing is installed.
    pub async fn load_index(&self) -> AutomationIndex {
        match self.index.list().await {
            Ok(index) => index,
            Err(e) => {
                warn!(error = %e, "Automation index unavailable, treating as empty");
                AutomationIndex::new()
            }
        }
    }

    fn resolution_request<'a>(
        action: &'a ActionDefinition,
        request: &DispatchRequest,
    ) -> ResolutionRequest<'a> {
        ResolutionRequest {
            action,
            task: request.effective_task(),
            override_name: request.override_name.clone(),
        }
    }

    /// Candidate names discovery would try for `request`.
    pub fn candidates(&self, request: &DispatchRequest) -> ActuateResult<CandidateList> {
        let action = self.action(&request.action_id)?;
        Ok(self
            .planner()
            .candidates(&Self::resolution_request(action, request)))
    }

    /// Determine the automation `request` would run.
    pub async fn resolve(&self, request: &DispatchRequest) -> ActuateResult<Resolution> {
        let action = self.action(&request.action_id)?;
        let planning = Self::resolution_request(action, request);
        let index = if planning.needs_index() {
            self.load_index().await
        } else {
            AutomationIndex::new()
        };
        Ok(self.planner().plan(&planning, &index)?)
    }

    fn input(&self, request: &DispatchRequest) -> ActuateResult<Option<Vec<u8>>> {
        let action = self.action(&request.action_id)?;
        Ok(build_input(
            action,
            request.task.as_deref(),
            &request.parameters,
            request.raw_input.as_deref(),
        )?)
    }

    /// Resolve and report without executing.
    pub async fn dry_run(&self, request: &DispatchRequest) -> ActuateResult<DryRun> {
        let input = self.input(request)?;
        let resolution = self.resolve(request).await?;
        Ok(DryRun {
            action_id: request.action_id.clone(),
            resolution,
            input,
        })
    }

    /// Resolve `request` and execute the resulting automation.
    pub async fn run(
        &self,
        request: &DispatchRequest,
        cancel: &CancellationToken,
    ) -> ActuateResult<DispatchOutcome> {
        let input = self.input(request)?;
        let resolution = self.resolve(request).await?;
        let execution = self
            .execute_traced(&resolution.automation, input.as_deref(), cancel)
            .await
            .map_err(|e| ActuateError::from_execution(&request.action_id, e))?;

        if self.require_structured
            && resolution.source.is_explicit()
            && let Err(source) = serde_json::from_slice::<serde_json::Value>(&execution.output)
        {
            return Err(ActuateError::MalformedOutput {
                action_id: request.action_id.clone(),
                automation: resolution.automation,
                attempts: execution.attempts,
                source,
            });
        }

        info!(
            action = %request.action_id,
            automation = %resolution.automation,
            source = resolution.source.as_str(),
            attempts = execution.attempts,
            "Action completed"
        );
        Ok(DispatchOutcome {
            action_id: request.action_id.clone(),
            resolution,
            execution,
            input,
        })
    }

    /// Try `candidates` in order; a missing automation moves on to the next.
    ///
    /// Any other failure is terminal. An empty or exhausted list is a
    /// resolution failure naming every candidate.
    pub async fn run_candidates(
        &self,
        request: &DispatchRequest,
        candidates: &[String],
        cancel: &CancellationToken,
    ) -> ActuateResult<DispatchOutcome> {
        let input = self.input(request)?;
        let list: CandidateList = candidates.iter().map(|c| c.trim()).collect();

        for candidate in list.iter() {
            match self.executor.execute(candidate, input.as_deref(), cancel).await {
                Ok(execution) => {
                    self.trace(candidate, input.as_deref(), Ok(&execution)).await;
                    info!(
                        action = %request.action_id,
                        automation = %candidate,
                        "Candidate succeeded"
                    );
                    return Ok(DispatchOutcome {
                        action_id: request.action_id.clone(),
                        resolution: Resolution {
                            automation: candidate.to_string(),
                            source: ResolutionSource::Candidate,
                            candidates: list.clone(),
                        },
                        execution,
                        input,
                    });
                }
                Err(e) if e.is_target_not_found() => {
                    debug!(
                        action = %request.action_id,
                        automation = %candidate,
                        "Candidate not installed, trying next"
                    );
                }
                Err(e) => {
                    self.trace(candidate, input.as_deref(), Err(&e)).await;
                    return Err(ActuateError::Execution {
                        action_id: request.action_id.clone(),
                        source: e,
                    });
                }
            }
        }

        Err(ResolutionError::no_automation(&request.action_id, list.into_vec()).into())
    }

    /// Partition the catalog into runnable and missing actions.
    ///
    /// Actions that yield no candidates without a task are left out.
    pub async fn coverage(&self) -> Coverage {
        let index = self.load_index().await;
        let matcher = Matcher::new(&index);
        let planner = self.planner();
        let mut coverage = Coverage::default();

        for action in &self.catalog {
            let mapped = self.mappings.mapping(&action.id).is_some_and(|m| {
                m.name().and_then(|name| matcher.find(name)).is_some()
                    || m.id().and_then(|id| matcher.find(id)).is_some()
            });
            if mapped {
                coverage.available.push(action.id.clone());
                continue;
            }

            let candidates = planner.candidates(&ResolutionRequest::new(action));
            if candidates.is_empty() {
                continue;
            }
            if matcher.first_match(&candidates).is_some() {
                coverage.available.push(action.id.clone());
            } else {
                coverage.missing.push(action.id.clone());
            }
        }

        coverage.available.sort();
        coverage.missing.sort();
        coverage
    }

    async fn execute_traced(
        &self,
        automation: &str,
        input: Option<&[u8]>,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, ExecutionError> {
        let result = self.executor.execute(automation, input, cancel).await;
        self.trace(automation, input, result.as_ref()).await;
        result
    }

    async fn trace(
        &self,
        automation: &str,
        input: Option<&[u8]>,
        result: Result<&ExecutionResult, &ExecutionError>,
    ) {
        let Some(trace) = &self.trace else {
            return;
        };
        let mut entry = TraceEntry::new(automation);
        if let Some(input) = input {
            entry = entry.with_input(input);
        }
        entry = match result {
            Ok(execution) => entry.with_output(&execution.output),
            Err(e) => entry.with_error(e),
        };
        trace.record(&entry).await;
    }
}
