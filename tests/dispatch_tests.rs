//! End-to-End Dispatch Tests
//!
//! Drives the dispatcher against scripted invokers and fixed indexes to
//! check resolution precedence, candidate fallback, output handling and
//! tracing as a caller of the library sees them.

use actuate_config::Config;
use actuate_core::{AutomationRef, ErrorKind, ResolutionSource};
use actuate_runtime::{
    ActuateError, CancellationToken, DispatchRequest, Dispatcher, RetryPolicy, TraceLog,
};
use actuate_testing::{
    FailingIndex, MockInvoker, MockOutcome, StaticIndex, index_with_ids, streaks_metadata,
};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn dispatcher(invoker: &MockInvoker, index: StaticIndex) -> Dispatcher {
    Dispatcher::new(Arc::new(invoker.clone()), Arc::new(index))
        .with_metadata(streaks_metadata())
        .with_locales(vec!["en".to_string()])
        .with_policy(RetryPolicy::default().with_backoff(Duration::from_millis(1)))
}

#[cfg(test)]
mod resolution_precedence {
    use super::*;

    #[tokio::test]
    async fn test_override_runs_verbatim() {
        let invoker = MockInvoker::new().with_output("  My Custom Shortcut ", "[]");
        let dispatcher = dispatcher(&invoker, StaticIndex::default());

        let request = DispatchRequest::new("task-list").with_override("  My Custom Shortcut ");
        let outcome = dispatcher
            .run(&request, &CancellationToken::new())
            .await
            .expect("override should run");

        assert_eq!(outcome.resolution.source, ResolutionSource::Override);
        assert_eq!(outcome.resolution.automation, "  My Custom Shortcut ");
        assert_eq!(invoker.called_names(), vec!["  My Custom Shortcut "]);
    }

    #[tokio::test]
    async fn test_missing_override_is_target_not_found() {
        let invoker = MockInvoker::new();
        let dispatcher = dispatcher(&invoker, StaticIndex::named(["All Tasks"]));

        let request = DispatchRequest::new("task-list").with_override("Ghost");
        let error = dispatcher
            .run(&request, &CancellationToken::new())
            .await
            .expect_err("override is not installed");

        assert_eq!(error.kind(), ErrorKind::TargetNotFound);
        assert_eq!(error.automation(), Some("Ghost"));
        assert!(!invoker.was_called_with("All Tasks"));
    }

    #[tokio::test]
    async fn test_mapping_beats_discovery() {
        let invoker = MockInvoker::new()
            .with_output("My Tasks", "[]")
            .with_output("All Tasks", "[]");
        let mut mappings = BTreeMap::new();
        mappings.insert("task-list".to_string(), AutomationRef::by_name("my tasks"));
        let dispatcher = dispatcher(&invoker, StaticIndex::named(["All Tasks", "My Tasks"]))
            .with_mappings(Arc::new(mappings));

        let outcome = dispatcher
            .run(&DispatchRequest::new("task-list"), &CancellationToken::new())
            .await
            .expect("mapping should run");

        assert_eq!(outcome.resolution.source, ResolutionSource::Mapping);
        assert_eq!(outcome.resolution.automation, "My Tasks");
        assert_eq!(invoker.called_names(), vec!["My Tasks"]);
    }

    #[tokio::test]
    async fn test_mapping_matched_by_identifier() {
        let invoker = MockInvoker::new().with_output("Checklist", "[]");
        let mut config = Config::default();
        config
            .set_mapping("task-list", AutomationRef::by_id("0000-0001"))
            .expect("valid mapping");
        let dispatcher = dispatcher(
            &invoker,
            StaticIndex(index_with_ids(&["Other", "Checklist"])),
        )
        .with_mappings(Arc::new(config));

        let resolution = dispatcher
            .resolve(&DispatchRequest::new("task-list"))
            .await
            .expect("id mapping resolves");

        assert_eq!(resolution.automation, "Checklist");
        assert_eq!(resolution.source, ResolutionSource::Mapping);
    }

    #[tokio::test]
    async fn test_unmatched_mapping_falls_back_to_discovery() {
        let invoker = MockInvoker::new().with_output("All Tasks", "[]");
        let mut mappings = BTreeMap::new();
        mappings.insert("task-list".to_string(), AutomationRef::by_name("Deleted"));
        let dispatcher = dispatcher(&invoker, StaticIndex::named(["All Tasks"]))
            .with_mappings(Arc::new(mappings));

        let resolution = dispatcher
            .resolve(&DispatchRequest::new("task-list"))
            .await
            .expect("discovery resolves");

        assert_eq!(resolution.source, ResolutionSource::Discovered);
        assert_eq!(resolution.automation, "All Tasks");
    }

    #[tokio::test]
    async fn test_mapped_shortcut_missing_at_run_time_is_terminal() {
        let invoker = MockInvoker::new().with_output("All Tasks", "[]");
        let mut mappings = BTreeMap::new();
        mappings.insert("task-list".to_string(), AutomationRef::by_name("My Tasks"));
        let dispatcher = dispatcher(&invoker, StaticIndex::named(["All Tasks", "My Tasks"]))
            .with_mappings(Arc::new(mappings));

        let error = dispatcher
            .run(&DispatchRequest::new("task-list"), &CancellationToken::new())
            .await
            .expect_err("mapped shortcut was deleted after indexing");

        assert_eq!(error.kind(), ErrorKind::TargetNotFound);
        assert_eq!(error.automation(), Some("My Tasks"));
        assert_eq!(invoker.called_names(), vec!["My Tasks"]);
    }

    #[tokio::test]
    async fn test_discovered_shortcut_missing_at_run_time_is_terminal() {
        let invoker = MockInvoker::new()
            .with_script("All Tasks", [MockOutcome::NotFound])
            .with_output("Task List", "[]");
        let dispatcher = dispatcher(&invoker, StaticIndex::named(["All Tasks"]));

        let error = dispatcher
            .run(&DispatchRequest::new("task-list"), &CancellationToken::new())
            .await
            .expect_err("discovered shortcut vanished");

        assert_eq!(error.kind(), ErrorKind::TargetNotFound);
        assert_eq!(error.automation(), Some("All Tasks"));
        assert_eq!(invoker.called_names(), vec!["All Tasks"]);
    }

    #[tokio::test]
    async fn test_preferred_locale_orders_candidates() {
        let invoker = MockInvoker::new();
        let index = StaticIndex::named(["All Tasks", "Toutes les tâches"]);
        let dispatcher = dispatcher(&invoker, index).with_locales(vec!["fr-FR".to_string()]);

        let resolution = dispatcher
            .resolve(&DispatchRequest::new("task-list"))
            .await
            .expect("resolves");

        assert_eq!(resolution.automation, "Toutes les tâches");
        assert_eq!(resolution.candidates.first(), Some("Toutes les tâches"));
    }

    #[tokio::test]
    async fn test_task_is_expanded_into_candidates() {
        let invoker = MockInvoker::new();
        let dispatcher = dispatcher(&invoker, StaticIndex::default());

        let candidates = dispatcher
            .candidates(&DispatchRequest::new("task-complete").with_task(" Read "))
            .expect("known action");

        assert_eq!(candidates.first(), Some("Mark Read as Complete"));
        assert!(candidates.contains("Complete Task"));
        assert!(!candidates.contains("Mark task complete"));
    }

    #[tokio::test]
    async fn test_failing_index_is_resolution_failure() {
        let invoker = MockInvoker::new();
        let dispatcher = Dispatcher::new(Arc::new(invoker.clone()), Arc::new(FailingIndex))
            .with_metadata(streaks_metadata());

        let error = dispatcher
            .run(&DispatchRequest::new("task-list"), &CancellationToken::new())
            .await
            .expect_err("nothing is installed");

        assert_eq!(error.kind(), ErrorKind::ResolutionFailure);
        assert_eq!(invoker.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_action_is_rejected() {
        let invoker = MockInvoker::new();
        let dispatcher = dispatcher(&invoker, StaticIndex::default());

        let error = dispatcher
            .run(&DispatchRequest::new("dance"), &CancellationToken::new())
            .await
            .expect_err("unknown action");

        assert!(matches!(error, ActuateError::Resolution(_)));
        assert_eq!(error.action_id(), "dance");
    }
}

#[cfg(test)]
mod execution {
    use super::*;
    use rstest::rstest;

    #[tokio::test]
    async fn test_plain_text_output_is_wrapped_in_envelope() {
        let invoker = MockInvoker::new().with_output("Mark Read as Complete", "done\n");
        let dispatcher = dispatcher(&invoker, StaticIndex::named(["Mark Read as Complete"]));

        let outcome = dispatcher
            .run(
                &DispatchRequest::new("task-complete").with_task("Read"),
                &CancellationToken::new(),
            )
            .await
            .expect("runs");

        let envelope = serde_json::to_value(outcome.envelope()).expect("serializes");
        assert_eq!(envelope["ok"], json!(true));
        assert_eq!(envelope["action"]["id"], json!("task-complete"));
        assert_eq!(envelope["source"]["name"], json!("Mark Read as Complete"));
        assert_eq!(envelope["attempts"], json!(1));
        assert_eq!(envelope["input"], json!({"task": "Read"}));
        assert_eq!(
            envelope["result"],
            json!({"raw": "done", "format": "text", "source": "Mark Read as Complete"})
        );
    }

    #[rstest]
    #[case("task-complete")]
    #[case("task-miss")]
    #[case("timer-start")]
    #[case("export-task")]
    #[tokio::test]
    async fn test_missing_task_is_invalid_input(#[case] action: &str) {
        let invoker = MockInvoker::new();
        let dispatcher = dispatcher(&invoker, StaticIndex::default());

        let error = dispatcher
            .run(&DispatchRequest::new(action), &CancellationToken::new())
            .await
            .expect_err("task is required");

        assert!(matches!(error, ActuateError::InvalidInput(_)));
        assert_eq!(error.kind(), ErrorKind::Usage);
        assert_eq!(invoker.call_count(), 0);
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let invoker = MockInvoker::new().with_script(
            "All Tasks",
            [
                MockOutcome::fail("busy"),
                MockOutcome::fail("busy"),
                MockOutcome::output("[1]"),
            ],
        );
        let dispatcher = dispatcher(&invoker, StaticIndex::named(["All Tasks"])).with_policy(
            RetryPolicy::default()
                .with_retries(2)
                .with_backoff(Duration::from_millis(1)),
        );

        let outcome = dispatcher
            .run(&DispatchRequest::new("task-list"), &CancellationToken::new())
            .await
            .expect("third attempt succeeds");

        assert_eq!(outcome.execution.attempts, 3);
        assert_eq!(outcome.execution.output, b"[1]");
    }

    #[tokio::test]
    async fn test_exhausted_retries_report_attempts() {
        let invoker = MockInvoker::new().with_failure("All Tasks", "boom");
        let dispatcher = dispatcher(&invoker, StaticIndex::named(["All Tasks"])).with_policy(
            RetryPolicy::default()
                .with_retries(1)
                .with_backoff(Duration::from_millis(1)),
        );

        let error = dispatcher
            .run(&DispatchRequest::new("task-list"), &CancellationToken::new())
            .await
            .expect_err("always fails");

        assert_eq!(error.kind(), ErrorKind::ExecutionFailure);
        assert_eq!(error.attempts(), 2);
        assert_eq!(invoker.call_count(), 2);
    }

    #[tokio::test]
    async fn test_structured_output_required_for_explicit_sources() {
        let invoker = MockInvoker::new().with_output("Mine", "not json");
        let dispatcher =
            dispatcher(&invoker, StaticIndex::named(["Mine"])).require_structured(true);

        let request = DispatchRequest::new("task-list").with_override("Mine");
        let error = dispatcher
            .run(&request, &CancellationToken::new())
            .await
            .expect_err("text is rejected");

        assert_eq!(error.kind(), ErrorKind::MalformedOutput);
        assert_eq!(error.automation(), Some("Mine"));
    }

    #[tokio::test]
    async fn test_structured_output_not_required_for_discovery() {
        let invoker = MockInvoker::new().with_output("All Tasks", "plain");
        let dispatcher =
            dispatcher(&invoker, StaticIndex::named(["All Tasks"])).require_structured(true);

        let outcome = dispatcher
            .run(&DispatchRequest::new("task-list"), &CancellationToken::new())
            .await
            .expect("discovered output is not validated");

        assert_eq!(outcome.execution.output, b"plain");
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let invoker = MockInvoker::new().with_script("All Tasks", [MockOutcome::Hang]);
        let dispatcher = dispatcher(&invoker, StaticIndex::named(["All Tasks"]));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let error = dispatcher
            .run(&DispatchRequest::new("task-list"), &cancel)
            .await
            .expect_err("cancelled");

        assert_eq!(error.kind(), ErrorKind::CancellationFailure);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_during_backoff_is_cancellation() {
        let invoker = MockInvoker::new().with_failure("All Tasks", "busy");
        let policy = RetryPolicy::default()
            .with_retries(3)
            .with_backoff(Duration::from_secs(30))
            .with_timeout(Duration::from_secs(5));
        let dispatcher =
            dispatcher(&invoker, StaticIndex::named(["All Tasks"])).with_policy(policy);

        let error = dispatcher
            .run(&DispatchRequest::new("task-list"), &CancellationToken::new())
            .await
            .expect_err("deadline fires before the retry");

        assert_eq!(error.kind(), ErrorKind::CancellationFailure);
        assert_eq!(error.attempts(), 1);
        assert!(error.elapsed().is_some_and(|e| e < Duration::from_secs(30)));
        assert_eq!(invoker.call_count(), 1);
    }
}

#[cfg(test)]
mod candidates {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_not_found_candidates_are_skipped() {
        let invoker = MockInvoker::new().with_output("Second", "{\"ok\":1}");
        let dispatcher = dispatcher(&invoker, StaticIndex::default());

        let outcome = dispatcher
            .run_candidates(
                &DispatchRequest::new("task-list"),
                &names(&["First", "Second", "Third"]),
                &CancellationToken::new(),
            )
            .await
            .expect("second candidate runs");

        assert_eq!(outcome.resolution.automation, "Second");
        assert_eq!(outcome.resolution.source, ResolutionSource::Candidate);
        assert_eq!(invoker.called_names(), vec!["First", "Second"]);
    }

    #[tokio::test]
    async fn test_other_failures_are_terminal() {
        let invoker = MockInvoker::new()
            .with_failure("First", "crashed")
            .with_output("Second", "[]");
        let dispatcher = dispatcher(&invoker, StaticIndex::default());

        let error = dispatcher
            .run_candidates(
                &DispatchRequest::new("task-list"),
                &names(&["First", "Second"]),
                &CancellationToken::new(),
            )
            .await
            .expect_err("first failure stops the walk");

        assert_eq!(error.kind(), ErrorKind::ExecutionFailure);
        assert!(!invoker.was_called_with("Second"));
    }

    #[tokio::test]
    async fn test_exhausted_candidates_are_resolution_failure() {
        let invoker = MockInvoker::new();
        let dispatcher = dispatcher(&invoker, StaticIndex::default());

        let error = dispatcher
            .run_candidates(
                &DispatchRequest::new("task-list"),
                &names(&["A", "B"]),
                &CancellationToken::new(),
            )
            .await
            .expect_err("nothing installed");
        assert_eq!(error.kind(), ErrorKind::ResolutionFailure);

        let empty = dispatcher
            .run_candidates(
                &DispatchRequest::new("task-list"),
                &[],
                &CancellationToken::new(),
            )
            .await
            .expect_err("empty list");
        assert_eq!(empty.kind(), ErrorKind::ResolutionFailure);
    }
}

#[cfg(test)]
mod reporting {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_does_not_execute() {
        let invoker = MockInvoker::new();
        let dispatcher = dispatcher(&invoker, StaticIndex::named(["Pause All Tasks"]));

        let request = DispatchRequest::new("pause").with_parameter("status", "All");
        let plan = dispatcher.dry_run(&request).await.expect("plans");

        assert_eq!(plan.resolution.automation, "Pause All Tasks");
        let value = serde_json::to_value(&plan).expect("serializes");
        assert_eq!(value["input"], json!({"status": "All"}));
        assert_eq!(invoker.call_count(), 0);
    }

    #[tokio::test]
    async fn test_coverage_partitions_catalog() {
        let invoker = MockInvoker::new();
        let mut mappings = BTreeMap::new();
        mappings.insert("export-all".to_string(), AutomationRef::by_name("Backup"));
        let dispatcher = dispatcher(&invoker, StaticIndex::named(["All Tasks", "Backup"]))
            .with_mappings(Arc::new(mappings));

        let coverage = dispatcher.coverage().await;

        assert_eq!(coverage.available, vec!["export-all", "task-list"]);
        assert!(coverage.missing.contains(&"pause".to_string()));
        assert!(coverage.missing.contains(&"task-complete".to_string()));
        assert!(!coverage.missing.contains(&"export-task".to_string()));
        assert!(coverage.missing.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(invoker.call_count(), 0);
    }

    #[tokio::test]
    async fn test_trace_records_each_execution() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("trace.jsonl");
        let invoker = MockInvoker::new().with_output("All Tasks", "[]");
        let dispatcher = dispatcher(&invoker, StaticIndex::named(["All Tasks"]))
            .with_trace(TraceLog::new(&path));

        dispatcher
            .run(
                &DispatchRequest::new("task-list").with_raw_input("{\"limit\":3}"),
                &CancellationToken::new(),
            )
            .await
            .expect("runs");

        let content = std::fs::read_to_string(&path).expect("trace written");
        let lines: Vec<Value> = content
            .lines()
            .map(|line| serde_json::from_str(line).expect("valid JSON line"))
            .collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["automation"], json!("All Tasks"));
        assert_eq!(lines[0]["input"], json!({"limit": 3}));
        assert_eq!(lines[0]["output"], json!([]));
    }
}
