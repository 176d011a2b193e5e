//! # Mock Invoker for Testing
//!
//! A scripted [`AutomationInvoker`] that returns predictable outcomes per
//! automation name and records every call, plus index providers with fixed
//! contents.

use actuate_core::{AutomationIndex, AutomationRecord};
use actuate_runtime::{
    AutomationInvoker, IndexProvider, InvocationRequest, InvokeError, OutputArtifact,
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// One scripted response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOutcome {
    /// Succeed with the given artifacts.
    Artifacts(Vec<OutputArtifact>),
    /// Fail with a generic error message.
    Fail(String),
    /// Fail the way the host does for an unknown automation.
    NotFound,
    /// Sleep, then produce the inner outcome.
    Delayed(Duration, Box<MockOutcome>),
    /// Never complete.
    Hang,
}

impl MockOutcome {
    /// Succeed with a single `output` artifact.
    pub fn output(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Artifacts(vec![OutputArtifact::new("output", bytes)])
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }

    pub fn delayed(delay: Duration, outcome: MockOutcome) -> Self {
        Self::Delayed(delay, Box::new(outcome))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scripted invoker.
///
/// Each automation has a queue of outcomes consumed one per call; the last
/// outcome repeats once the queue is down to it. Unscripted names fail as
/// not found.
#[derive(Debug, Clone, Default)]
pub struct MockInvoker {
    scripts: Arc<Mutex<HashMap<String, VecDeque<MockOutcome>>>>,
    calls: Arc<Mutex<Vec<InvocationRequest>>>,
}

impl MockInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append outcomes for `automation`.
    pub fn with_script<I>(self, automation: impl Into<String>, outcomes: I) -> Self
    where
        I: IntoIterator<Item = MockOutcome>,
    {
        lock(&self.scripts)
            .entry(automation.into())
            .or_default()
            .extend(outcomes);
        self
    }

    /// `automation` always succeeds with `output`.
    pub fn with_output(self, automation: impl Into<String>, output: impl Into<Vec<u8>>) -> Self {
        self.with_script(automation, [MockOutcome::output(output)])
    }

    /// `automation` always fails with `message`.
    pub fn with_failure(self, automation: impl Into<String>, message: impl Into<String>) -> Self {
        self.with_script(automation, [MockOutcome::fail(message)])
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<InvocationRequest> {
        lock(&self.calls).clone()
    }

    /// Automation names called so far, in order.
    pub fn called_names(&self) -> Vec<String> {
        lock(&self.calls)
            .iter()
            .map(|call| call.automation.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn was_called_with(&self, automation: &str) -> bool {
        lock(&self.calls).iter().any(|call| call.automation == automation)
    }

    pub fn reset(&self) {
        lock(&self.calls).clear();
    }

    fn next_outcome(&self, automation: &str) -> MockOutcome {
        let mut scripts = lock(&self.scripts);
        match scripts.get_mut(automation) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(MockOutcome::NotFound),
            Some(queue) => queue.front().cloned().unwrap_or(MockOutcome::NotFound),
            None => MockOutcome::NotFound,
        }
    }
}

#[async_trait]
impl AutomationInvoker for MockInvoker {
    async fn invoke(
        &self,
        request: &InvocationRequest,
    ) -> Result<Vec<OutputArtifact>, InvokeError> {
        lock(&self.calls).push(request.clone());
        let mut outcome = self.next_outcome(&request.automation);
        while let MockOutcome::Delayed(delay, inner) = outcome {
            tokio::time::sleep(delay).await;
            outcome = *inner;
        }

        match outcome {
            MockOutcome::Artifacts(artifacts) => Ok(artifacts),
            MockOutcome::Fail(message) => Err(InvokeError::failed(
                request.automation.as_str(),
                "exit status: 1",
                message,
            )),
            MockOutcome::NotFound => Err(InvokeError::failed(
                request.automation.as_str(),
                "exit status: 1",
                format!("Error: Couldn't find shortcut \"{}\"", request.automation),
            )),
            MockOutcome::Delayed(..) | MockOutcome::Hang => std::future::pending().await,
        }
    }
}

/// Index provider with fixed contents.
#[derive(Debug, Clone, Default)]
pub struct StaticIndex(pub AutomationIndex);

impl StaticIndex {
    /// Index of name-only records.
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(AutomationRecord::named).collect())
    }
}

#[async_trait]
impl IndexProvider for StaticIndex {
    async fn list(&self) -> Result<AutomationIndex, InvokeError> {
        Ok(self.0.clone())
    }
}

/// Index provider that always fails.
#[derive(Debug, Clone, Default)]
pub struct FailingIndex;

#[async_trait]
impl IndexProvider for FailingIndex {
    async fn list(&self) -> Result<AutomationIndex, InvokeError> {
        Err(InvokeError::other("index unavailable"))
    }
}
