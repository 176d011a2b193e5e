//! Wiring global options, configuration and the Shortcuts backend into a
//! [`Dispatcher`].

use crate::cli::{GlobalOpts, InputArgs};
use crate::error::{CliError, CliResult};
use crate::output::OutputMode;
use actuate_config::{Config, ConfigStore};
use actuate_core::{AppMetadata, JsonMetadataFile, MetadataProvider, preferred_locales};
use actuate_runtime::{DispatchRequest, Dispatcher, RetryPolicy, ShortcutsCli, TraceLog};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

pub struct Context {
    pub global: GlobalOpts,
    pub store: ConfigStore,
    pub config: Config,
}

impl Context {
    pub fn load(global: GlobalOpts) -> CliResult<Self> {
        let store = ConfigStore::locate(global.config.as_deref())?;
        let config = store.load()?;
        Ok(Self {
            global,
            store,
            config,
        })
    }

    pub fn output(&self) -> OutputMode {
        OutputMode::new(self.global.json, self.global.pretty)
    }

    /// Flags override the configured execution defaults.
    pub fn retry_policy(&self) -> RetryPolicy {
        let execution = &self.config.execution;
        RetryPolicy::new(
            self.global.retries.unwrap_or(execution.retries),
            self.global.retry_wait.unwrap_or(execution.retry_wait),
            None,
        )
        .with_timeout(self.global.timeout.unwrap_or(execution.timeout))
    }

    pub fn output_type(&self) -> String {
        self.global
            .output_type
            .clone()
            .unwrap_or_else(|| self.config.execution.output_type.clone())
    }

    pub fn metadata(&self) -> AppMetadata {
        match &self.global.metadata {
            Some(path) => JsonMetadataFile::new(path).load_or_empty(),
            None => {
                tracing::debug!("No metadata snapshot given, using titles and aliases");
                AppMetadata::empty()
            }
        }
    }

    pub fn dispatcher(&self, trace: Option<PathBuf>) -> Dispatcher {
        let shortcuts = Arc::new(ShortcutsCli::new());
        let mut dispatcher = Dispatcher::new(shortcuts.clone(), shortcuts)
            .with_metadata(self.metadata())
            .with_mappings(Arc::new(self.config.clone()))
            .with_policy(self.retry_policy())
            .with_output_type(self.output_type())
            .with_locales(preferred_locales());
        if let Some(path) = trace {
            dispatcher = dispatcher.with_trace(TraceLog::new(path));
        }
        dispatcher
    }
}

/// Turn input flags into a [`DispatchRequest`].
pub fn dispatch_request(action: &str, input: &InputArgs) -> CliResult<DispatchRequest> {
    let mut request = DispatchRequest::new(action);
    if let Some(task) = &input.task {
        request = request.with_task(task.as_str());
    }
    if let Some(status) = &input.status {
        request = request.with_parameter("status", status.as_str());
    }
    for (key, value) in &input.params {
        request = request.with_parameter(key.as_str(), value.as_str());
    }
    match input.input.as_deref() {
        Some("-") => {
            let mut raw = Vec::new();
            std::io::stdin().read_to_end(&mut raw)?;
            request = request.with_raw_input(raw);
        }
        Some(raw) => request = request.with_raw_input(raw.as_bytes()),
        None => {}
    }
    Ok(request)
}

/// Reject an empty action id early with a usage error.
pub fn require_action(action: &str) -> CliResult<&str> {
    let action = action.trim();
    if action.is_empty() {
        return Err(CliError::usage("action id must not be empty"));
    }
    Ok(action)
}
