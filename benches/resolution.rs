//! Resolution Benchmarks
//!
//! Candidate generation and index matching against a catalog-sized workload,
//! plus a full dispatch through a scripted invoker.

use actuate_core::{
    ActionCatalog, AutomationIndex, AutomationRecord, CandidateResolver, Matcher, NoMappings,
    ResolutionPlanner, ResolutionRequest,
};
use actuate_runtime::{CancellationToken, DispatchRequest, Dispatcher};
use actuate_testing::{MockInvoker, StaticIndex, streaks_metadata};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

fn large_index(size: usize) -> AutomationIndex {
    (0..size)
        .map(|i| AutomationRecord::with_id(format!("Shortcut {i}"), format!("{i:08X}")))
        .chain(std::iter::once(AutomationRecord::named("Mark Read as Complete")))
        .collect()
}

/// Benchmark candidate expansion for every catalog action
fn bench_candidates(c: &mut Criterion) {
    let metadata = streaks_metadata();
    let catalog = ActionCatalog::builtin();
    let mut group = c.benchmark_group("candidates");
    group.throughput(Throughput::Elements(catalog.len() as u64));

    group.bench_function("resolve_catalog", |b| {
        let resolver = CandidateResolver::new(&metadata).with_locale("en");
        b.iter(|| {
            for action in &catalog {
                black_box(resolver.resolve(action, black_box("Read")));
            }
        })
    });
    group.finish();
}

/// Benchmark matching against indexes of increasing size
fn bench_matching(c: &mut Criterion) {
    let metadata = streaks_metadata();
    let catalog = ActionCatalog::builtin();
    let Some(action) = catalog.get("task-complete") else {
        return;
    };
    let mut group = c.benchmark_group("matching");
    group.measurement_time(Duration::from_secs(5));

    for size in [10usize, 100, 1000] {
        let index = large_index(size);
        group.bench_with_input(BenchmarkId::new("build_and_match", size), &index, |b, index| {
            let request = ResolutionRequest::new(action).with_task("Read");
            let planner = ResolutionPlanner::new(&metadata, &NoMappings);
            b.iter(|| black_box(planner.plan(&request, index)))
        });
        group.bench_with_input(BenchmarkId::new("lookup_only", size), &index, |b, index| {
            let matcher = Matcher::new(index);
            b.iter(|| black_box(matcher.find(black_box("mark read as complete"))))
        });
    }
    group.finish();
}

/// Benchmark a full dispatch through a scripted invoker
fn bench_dispatch(c: &mut Criterion) {
    let Ok(runtime) = tokio::runtime::Runtime::new() else {
        return;
    };
    let invoker = MockInvoker::new().with_output("All Tasks", "[]");
    let dispatcher = Dispatcher::new(
        Arc::new(invoker.clone()),
        Arc::new(StaticIndex::named(["All Tasks"])),
    )
    .with_metadata(streaks_metadata());
    let request = DispatchRequest::new("task-list");
    let cancel = CancellationToken::new();

    c.bench_function("dispatch_run", |b| {
        b.to_async(&runtime).iter(|| async {
            invoker.reset();
            black_box(dispatcher.run(&request, &cancel).await)
        })
    });
}

criterion_group!(benches, bench_candidates, bench_matching, bench_dispatch);
criterion_main!(benches);
