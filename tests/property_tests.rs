//! Property-Based Tests for Candidate Resolution
//!
//! Invariants of candidate generation, matching and override handling that
//! should hold for any task value or automation name.

use actuate_core::{
    ActionCatalog, AutomationIndex, AutomationRecord, CandidateResolver, Matcher, NoMappings,
    ResolutionPlanner, ResolutionRequest, ResolutionSource,
};
use actuate_testing::streaks_metadata;
use proptest::prelude::*;

// Whitespace-only strings, including the empty string
fn blank_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ \t\n]{0,8}").unwrap()
}

// Printable names with at least one non-space character
fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ ]{0,2}[A-Za-z0-9][A-Za-z0-9 ]{0,24}").unwrap()
}

proptest! {
    /// Property: a blank task never produces a task-template candidate
    #[test]
    fn prop_blank_task_drops_task_templates(task in blank_strategy()) {
        let metadata = streaks_metadata();
        let catalog = ActionCatalog::builtin();
        let resolver = CandidateResolver::new(&metadata);

        for action in &catalog {
            for candidate in resolver.resolve(action, &task).iter() {
                let task_placeholder = "${task}";
                prop_assert!(!candidate.contains(task_placeholder));
                prop_assert!(!candidate.contains("%@"));
                prop_assert_eq!(candidate.trim(), candidate);
                prop_assert!(!candidate.is_empty());
            }
        }
    }

    /// Property: candidates are unique and task templates carry the task
    #[test]
    fn prop_candidates_are_unique(task in name_strategy()) {
        let metadata = streaks_metadata();
        let catalog = ActionCatalog::builtin();
        let action = catalog.get("task-complete").unwrap();

        let candidates = CandidateResolver::new(&metadata).resolve(action, &task);
        let mut seen = std::collections::HashSet::new();
        for candidate in candidates.iter() {
            prop_assert!(seen.insert(candidate.to_string()));
        }
        prop_assert!(candidates.iter().any(|c| c.contains(task.trim())));
    }

    /// Property: the matcher picks the earliest installed candidate
    #[test]
    fn prop_matcher_returns_first_installed(
        names in prop::collection::vec("[A-Z][a-z]{2,10}", 1..6),
        installed in prop::collection::vec(any::<bool>(), 6),
    ) {
        let index: AutomationIndex = names
            .iter()
            .zip(&installed)
            .filter(|(_, on)| **on)
            .map(|(name, _)| AutomationRecord::named(name.as_str()))
            .collect();
        let matcher = Matcher::new(&index);

        let expected = names
            .iter()
            .position(|name| index.iter().any(|r| r.name.eq_ignore_ascii_case(name)));
        let hit = matcher.first_match(&names);
        prop_assert_eq!(hit.map(|h| h.position), expected);
    }

    /// Property: an override is returned verbatim without consulting the index
    #[test]
    fn prop_override_is_verbatim(name in name_strategy()) {
        let metadata = streaks_metadata();
        let catalog = ActionCatalog::builtin();
        let action = catalog.get("task-list").unwrap();
        let index = AutomationIndex::new();

        let request = ResolutionRequest::new(action).with_override(name.clone());
        let resolution = ResolutionPlanner::new(&metadata, &NoMappings)
            .plan(&request, &index)
            .unwrap();

        prop_assert_eq!(resolution.source, ResolutionSource::Override);
        prop_assert_eq!(resolution.automation, name);
    }
}
