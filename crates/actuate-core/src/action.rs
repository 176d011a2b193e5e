//! Action definitions and the built-in catalog.
//!
//! An action is an abstract operation ("list tasks") independent of the
//! automation that ends up performing it. Each definition carries the data the
//! candidate resolver needs: a title template, the intent keys used to look up
//! localized phrasing, and a list of well-known automation names.

use crate::error::{ResolutionError, ResolutionResult};
use crate::template::contains_task_placeholder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Namespace prefix shared by all intent keys.
pub const INTENT_PREFIX: &str = "AppIntent.";

/// Definition of a single dispatchable action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// Stable identifier, e.g. `task-complete`.
    pub id: String,

    /// Human title. May contain a task placeholder.
    pub title: String,

    /// Whether the action cannot run without a task value.
    pub requires_task: bool,

    /// Intent keys used to look up localized phrasing.
    #[serde(default)]
    pub intent_keys: Vec<String>,

    /// Parameter name to allowed option values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Vec<String>>,

    /// Legacy or well-known automation names tried after localized phrasing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl ActionDefinition {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            requires_task: false,
            intent_keys: Vec::new(),
            parameters: BTreeMap::new(),
            aliases: Vec::new(),
        }
    }

    /// Mark the action as requiring a task value.
    pub fn requiring_task(mut self) -> Self {
        self.requires_task = true;
        self
    }

    pub fn with_intent_key(mut self, key: impl Into<String>) -> Self {
        self.intent_keys.push(key.into());
        self
    }

    pub fn with_parameter<I, S>(mut self, name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters
            .insert(name.into(), options.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Whether the title is eligible as a candidate template.
    ///
    /// A task-requiring action whose title has no placeholder would only
    /// ever produce the literal title, which names no specific task.
    pub fn title_is_candidate(&self) -> bool {
        !self.requires_task || contains_task_placeholder(&self.title)
    }

    /// Intent names derived from the intent keys, sorted and deduplicated.
    ///
    /// `AppIntent.TaskComplete.Mark${task}AsComplete` yields `TaskComplete`.
    pub fn intent_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .intent_keys
            .iter()
            .filter_map(|key| key.strip_prefix(INTENT_PREFIX))
            .filter_map(|rest| rest.split('.').next())
            .filter(|name| !name.is_empty())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Example input payload describing what the action accepts.
    pub fn sample_payload(&self) -> serde_json::Value {
        let mut payload = serde_json::Map::new();
        if self.requires_task {
            payload.insert("task".to_string(), serde_json::Value::from("<task>"));
        }
        for (name, options) in &self.parameters {
            let value = options.first().cloned().unwrap_or_default();
            payload.insert(name.clone(), serde_json::Value::from(value));
        }
        serde_json::Value::Object(payload)
    }
}

/// Ordered collection of action definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionCatalog {
    actions: Vec<ActionDefinition>,
}

impl ActionCatalog {
    pub fn new(actions: Vec<ActionDefinition>) -> Self {
        Self { actions }
    }

    /// The actions exposed by the Streaks app through Shortcuts.
    pub fn builtin() -> Self {
        Self::new(vec![
            ActionDefinition::new("task-complete", "Mark task complete")
                .requiring_task()
                .with_intent_key("AppIntent.TaskComplete.Mark${task}AsComplete")
                .with_intent_key("AppIntent.TaskComplete.Mark%@AsComplete")
                .with_alias("Complete Task"),
            ActionDefinition::new("task-miss", "Mark task missed")
                .requiring_task()
                .with_intent_key("AppIntent.TaskMiss.Mark${task}AsMissed")
                .with_alias("Mark Task Missed"),
            ActionDefinition::new("task-list", "List tasks")
                .with_intent_key("AppIntent.TaskList.AllTasks")
                .with_alias("Task List"),
            ActionDefinition::new("task-status", "Task status")
                .requiring_task()
                .with_intent_key("AppIntent.Status.StatusOf${task}")
                .with_alias("Get Task"),
            ActionDefinition::new("task-reminder", "Task reminder")
                .requiring_task()
                .with_intent_key("AppIntent.Notification.ReminderFor${task}")
                .with_alias("Send Task Reminder"),
            ActionDefinition::new("timer-start", "Start task timer")
                .requiring_task()
                .with_intent_key("AppIntent.StartTimer.Start${task}Timer")
                .with_intent_key("AppIntent.StartTimer.Start%@Timer")
                .with_alias("Start Task Timer"),
            ActionDefinition::new("timer-stop", "Stop task timer")
                .requiring_task()
                .with_intent_key("AppIntent.StopTimer.Stop${task}Timer")
                .with_alias("Stop Task Timer"),
            ActionDefinition::new("pause", "Pause tasks")
                .with_intent_key("AppIntent.Pause.Title")
                .with_parameter("status", ["All", "NotPaused"])
                .with_alias("Pause Tasks"),
            ActionDefinition::new("export-all", "Export all data")
                .with_intent_key("AppIntent.DataExport.ExportAllData")
                .with_alias("Export Data"),
            ActionDefinition::new("export-task", "Export task data")
                .requiring_task()
                .with_intent_key("AppIntent.DataExport.Export${task}Data"),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&ActionDefinition> {
        self.actions.iter().find(|action| action.id == id)
    }

    /// Look up an action, failing with [`ResolutionError::UnknownAction`].
    pub fn find(&self, id: &str) -> ResolutionResult<&ActionDefinition> {
        self.get(id).ok_or_else(|| ResolutionError::unknown_action(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionDefinition> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Action ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.actions.iter().map(|a| a.id.as_str()).collect();
        ids.sort_unstable();
        ids
    }
}

impl<'a> IntoIterator for &'a ActionCatalog {
    type Item = &'a ActionDefinition;
    type IntoIter = std::slice::Iter<'a, ActionDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}
