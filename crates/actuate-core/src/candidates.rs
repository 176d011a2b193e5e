//! Candidate automation names for an action.
//!
//! Candidates are gathered as templates in priority order and then expanded:
//!
//! 1. localized values of each intent key (primary phrase table),
//! 2. secondary phrase-table values whose key names one of the action's
//!    intents,
//! 3. the action title, when it is safe to use (see
//!    [`ActionDefinition::title_is_candidate`]),
//! 4. the action's static aliases.
//!
//! Within a key, values follow [`order_locales`]. Expansion drops templates
//! that need a task when none is given; the first occurrence of a duplicate
//! wins.

use crate::action::{ActionDefinition, INTENT_PREFIX};
use crate::locale::order_locales;
use crate::metadata::{AppMetadata, LocalizedPhrase};
use crate::template::expand;
use serde::Serialize;
use tracing::debug;

/// Ordered, deduplicated list of non-empty candidate names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CandidateList {
    candidates: Vec<String>,
}

impl CandidateList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate. Empty and already-present values are rejected.
    pub fn push(&mut self, candidate: impl Into<String>) -> bool {
        let candidate = candidate.into();
        if candidate.is_empty() || self.contains(&candidate) {
            return false;
        }
        self.candidates.push(candidate);
        true
    }

    pub fn contains(&self, candidate: &str) -> bool {
        self.candidates.iter().any(|c| c == candidate)
    }

    pub fn first(&self) -> Option<&str> {
        self.candidates.first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.candidates
    }
}

impl<S: Into<String>> FromIterator<S> for CandidateList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = Self::new();
        for candidate in iter {
            list.push(candidate);
        }
        list
    }
}

impl<'a> IntoIterator for &'a CandidateList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

/// Produces [`CandidateList`]s from action definitions and app metadata.
#[derive(Debug, Clone)]
pub struct CandidateResolver<'a> {
    metadata: &'a AppMetadata,
    preferred_locale: Option<String>,
}

impl<'a> CandidateResolver<'a> {
    pub fn new(metadata: &'a AppMetadata) -> Self {
        Self {
            metadata,
            preferred_locale: None,
        }
    }

    /// Use the first of `locales` as the preferred locale.
    pub fn with_locales(mut self, locales: &[String]) -> Self {
        self.preferred_locale = locales.first().cloned();
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.preferred_locale = Some(locale.into());
        self
    }

    pub fn preferred_locale(&self) -> Option<&str> {
        self.preferred_locale.as_deref()
    }

    /// Unexpanded templates for `action`, in priority order.
    pub fn templates(&self, action: &ActionDefinition) -> Vec<String> {
        let mut templates: Vec<String> = Vec::new();

        for key in &action.intent_keys {
            let phrases: Vec<&LocalizedPhrase> = self.metadata.phrases.exact(key).collect();
            push_unique(&mut templates, self.by_locale(&phrases));
        }

        for intent in action.intent_names() {
            let fragment = format!("{INTENT_PREFIX}{intent}.");
            let phrases: Vec<&LocalizedPhrase> = self
                .metadata
                .shortcut_phrases
                .containing(&fragment)
                .collect();
            push_unique(&mut templates, self.by_locale(&phrases));
        }

        if action.title_is_candidate() {
            push_unique(&mut templates, [action.title.as_str()]);
        }

        push_unique(&mut templates, action.aliases.iter().map(String::as_str));
        templates
    }

    /// Expanded candidates for `action` with the given task value.
    pub fn resolve(&self, action: &ActionDefinition, task: &str) -> CandidateList {
        let app_name = self.metadata.display_name();
        let candidates: CandidateList = self
            .templates(action)
            .iter()
            .filter_map(|template| expand(template, task, app_name))
            .collect();

        debug!(
            action = %action.id,
            count = candidates.len(),
            candidates = ?candidates.as_slice(),
            "Resolved automation candidates"
        );
        candidates
    }

    /// Values of `phrases` ordered by locale preference, duplicates removed.
    fn by_locale<'p>(&self, phrases: &[&'p LocalizedPhrase]) -> Vec<&'p str> {
        let locales = order_locales(
            phrases.iter().map(|p| p.locale.as_str()),
            self.preferred_locale.as_deref(),
        );

        let mut values: Vec<&'p str> = Vec::new();
        for locale in locales {
            // Keys are visited in table order within one locale.
            for phrase in phrases.iter().copied().filter(|p| p.locale == locale) {
                let value = phrase.value.as_str();
                if !value.is_empty() && !values.contains(&value) {
                    values.push(value);
                }
            }
        }
        values
    }
}

fn push_unique<'s, I>(templates: &mut Vec<String>, values: I)
where
    I: IntoIterator<Item = &'s str>,
{
    for value in values {
        if !value.is_empty() && !templates.iter().any(|t| t == value) {
            templates.push(value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::PhraseTable;

    fn complete_action() -> ActionDefinition {
        ActionDefinition::new("task-complete", "Mark task complete")
            .requiring_task()
            .with_intent_key("AppIntent.TaskComplete.Mark${task}AsComplete")
            .with_alias("Complete Task")
    }

    fn list_action() -> ActionDefinition {
        ActionDefinition::new("task-list", "List tasks")
            .with_intent_key("AppIntent.TaskList.AllTasks")
            .with_alias("Task List")
    }

    fn streaks_metadata() -> AppMetadata {
        let mark = "AppIntent.TaskComplete.Mark${task}AsComplete";
        AppMetadata::empty()
            .with_app_name("Streaks")
            .with_phrases(
                PhraseTable::default()
                    .with_phrase(mark, "en", "Mark ${task} as complete")
                    .with_phrase(mark, "fr-FR", "Marquer ${task} comme terminée")
                    .with_phrase("AppIntent.TaskList.AllTasks", "en", "All Tasks")
                    .with_phrase("AppIntent.TaskList.AllTasks", "de", "Alle Aufgaben"),
            )
            .with_shortcut_phrases(
                PhraseTable::default()
                    .with_phrase(
                        "AppIntent.TaskList.AllTasks.phrase1",
                        "en",
                        "Show tasks in ${applicationName}",
                    )
                    .with_phrase(
                        "AppIntent.TaskComplete.Mark.phrase1",
                        "en",
                        "Complete %@ in ${applicationName}",
                    ),
            )
    }

    #[test]
    fn priority_is_phrases_then_title_then_aliases() {
        let metadata = streaks_metadata();
        let resolver = CandidateResolver::new(&metadata);
        let candidates = resolver.resolve(&list_action(), "");

        assert_eq!(
            candidates.into_vec(),
            vec![
                "All Tasks",
                "Alle Aufgaben",
                "Show tasks in Streaks",
                "List tasks",
                "Task List",
            ]
        );
    }

    #[test]
    fn task_templates_expand_with_task() {
        let metadata = streaks_metadata();
        let resolver = CandidateResolver::new(&metadata).with_locale("fr-FR");
        let candidates = resolver.resolve(&complete_action(), "Read");

        assert_eq!(
            candidates.into_vec(),
            vec![
                "Marquer Read comme terminée",
                "Mark Read as complete",
                "Complete Read in Streaks",
                "Complete Task",
            ]
        );
    }

    #[test]
    fn empty_task_drops_every_task_template() {
        let metadata = streaks_metadata();
        let resolver = CandidateResolver::new(&metadata);
        let candidates = resolver.resolve(&complete_action(), "");

        // The literal title is excluded for task-requiring actions, so only
        // the alias survives.
        assert_eq!(candidates.into_vec(), vec!["Complete Task"]);
    }

    #[test]
    fn templated_title_is_eligible_for_task_actions() {
        let action = ActionDefinition::new("task-miss", "Miss ${task}").requiring_task();
        let metadata = AppMetadata::empty();
        let resolver = CandidateResolver::new(&metadata);

        assert_eq!(resolver.resolve(&action, "Walk").into_vec(), vec!["Miss Walk"]);
        assert!(resolver.resolve(&action, " ").is_empty());
    }

    #[test]
    fn missing_metadata_yields_title_and_aliases() {
        let metadata = AppMetadata::empty();
        let resolver = CandidateResolver::new(&metadata);
        let candidates = resolver.resolve(&list_action(), "");

        assert_eq!(candidates.into_vec(), vec!["List tasks", "Task List"]);
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let action = ActionDefinition::new("task-list", "All Tasks")
            .with_intent_key("AppIntent.TaskList.AllTasks")
            .with_alias("All Tasks");
        let metadata = streaks_metadata();
        let resolver = CandidateResolver::new(&metadata);

        let candidates = resolver.resolve(&action, "");
        assert_eq!(candidates.iter().filter(|c| *c == "All Tasks").count(), 1);
        assert_eq!(candidates.first(), Some("All Tasks"));
    }

    #[test]
    fn expansion_collisions_are_deduplicated() {
        let metadata = AppMetadata::empty()
            .with_phrases(
                PhraseTable::default()
                    .with_phrase("AppIntent.TaskList.AllTasks", "en", "${applicationName} Tasks")
                    .with_phrase("AppIntent.TaskList.AllTasks", "fr", "Streaks Tasks "),
            );
        let resolver = CandidateResolver::new(&metadata);

        assert_eq!(
            resolver.resolve(&list_action(), "").into_vec(),
            vec!["Streaks Tasks", "List tasks", "Task List"]
        );
    }

    #[test]
    fn candidate_list_rejects_empty_and_duplicates() {
        let mut list = CandidateList::new();
        assert!(list.push("A"));
        assert!(!list.push("A"));
        assert!(!list.push(""));
        assert_eq!(list.len(), 1);
    }
}
