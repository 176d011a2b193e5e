//! Retrying execution of a resolved automation.
//!
//! Attempts are strictly sequential. The policy's timeout is one deadline over
//! the whole call. It and the caller's [`CancellationToken`] both govern the
//! in-flight invocation and the backoff wait between attempts.

use crate::invoker::{AutomationInvoker, InvocationRequest, InvokeError};
use crate::output::OutputNormalizer;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Payload sent when the caller supplies none.
pub const EMPTY_PAYLOAD: &[u8] = b"{}";

/// Output preference used when none is configured.
pub const DEFAULT_OUTPUT_TYPE: &str = "public.plain-text";

/// Retry, backoff and timeout settings for one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first.
    pub retries: u32,
    /// Wait before the second attempt; doubles after every failure.
    pub initial_backoff: Duration,
    /// Wall-clock deadline for the whole execution, backoff included.
    /// `None` disables it.
    pub timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 0,
            initial_backoff: Duration::from_secs(1),
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, initial_backoff: Duration, timeout: Option<Duration>) -> Self {
        Self {
            retries,
            initial_backoff,
            timeout,
        }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Set the overall deadline; zero disables it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// First backoff, with a zero value replaced by one second.
    pub fn first_backoff(&self) -> Duration {
        if self.initial_backoff.is_zero() {
            Duration::from_secs(1)
        } else {
            self.initial_backoff
        }
    }
}

/// Successful execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Merged output bytes.
    pub output: Vec<u8>,
    /// 1-based index of the attempt that succeeded.
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Failure of a single attempt.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error(transparent)]
    Invoke(#[from] InvokeError),
}

impl AttemptError {
    pub fn is_target_not_found(&self) -> bool {
        matches!(self, Self::Invoke(e) if e.is_target_not_found())
    }
}

/// Terminal failure of [`Executor::execute`].
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("automation {automation} failed after {attempts} attempt(s): {source}")]
    Exhausted {
        automation: String,
        attempts: u32,
        elapsed: Duration,
        #[source]
        source: AttemptError,
    },

    #[error(
        "automation {automation} cancelled after {attempts} attempt(s){}",
        deadline_note(.deadline)
    )]
    Cancelled {
        automation: String,
        attempts: u32,
        elapsed: Duration,
        /// Set when the policy deadline fired rather than the caller's token.
        deadline: Option<Duration>,
    },
}

fn deadline_note(deadline: &Option<Duration>) -> String {
    deadline
        .map(|limit| format!(": deadline of {} exceeded", humantime::format_duration(limit)))
        .unwrap_or_default()
}

impl ExecutionError {
    pub fn automation(&self) -> &str {
        match self {
            Self::Exhausted { automation, .. } | Self::Cancelled { automation, .. } => automation,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } | Self::Cancelled { attempts, .. } => *attempts,
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            Self::Exhausted { elapsed, .. } | Self::Cancelled { elapsed, .. } => *elapsed,
        }
    }

    /// Whether the policy deadline, not the caller, stopped the execution.
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Self::Cancelled { deadline: Some(_), .. })
    }

    /// Whether the last attempt failed because the automation does not exist.
    pub fn is_target_not_found(&self) -> bool {
        matches!(self, Self::Exhausted { source, .. } if source.is_target_not_found())
    }
}

/// Invokes automations under a [`RetryPolicy`].
#[derive(Clone)]
pub struct Executor {
    invoker: Arc<dyn AutomationInvoker>,
    policy: RetryPolicy,
    output_type: Option<String>,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("policy", &self.policy)
            .field("output_type", &self.output_type)
            .finish_non_exhaustive()
    }
}

impl Executor {
    pub fn new(invoker: Arc<dyn AutomationInvoker>) -> Self {
        Self {
            invoker,
            policy: RetryPolicy::default(),
            output_type: Some(DEFAULT_OUTPUT_TYPE.to_string()),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Output preference forwarded to the invoker; blank clears it.
    pub fn with_output_type(mut self, output_type: impl Into<String>) -> Self {
        let output_type = output_type.into().trim().to_string();
        self.output_type = (!output_type.is_empty()).then_some(output_type);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `automation` until it succeeds or attempts run out.
    ///
    /// Stops early with [`ExecutionError::Cancelled`] when `cancel` fires or
    /// the policy deadline passes.
    pub async fn execute(
        &self,
        automation: &str,
        payload: Option<&[u8]>,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, ExecutionError> {
        let request = InvocationRequest {
            automation: automation.to_string(),
            payload: payload.unwrap_or(EMPTY_PAYLOAD).to_vec(),
            output_type: self.output_type.clone(),
        };
        let max_attempts = self.policy.max_attempts();
        let mut backoff = self.policy.first_backoff();
        let start = Instant::now();
        let cancelled = |attempts: u32, deadline: Option<Duration>| ExecutionError::Cancelled {
            automation: automation.to_string(),
            attempts,
            elapsed: start.elapsed(),
            deadline,
        };
        let limit = self.policy.timeout;
        let deadline = limit.and_then(|limit| start.checked_add(limit));
        let expired = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(expired);

        let mut attempt = 1;
        loop {
            debug!(automation = %automation, attempt, max_attempts, "Invoking automation");

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled(attempt, None)),
                _ = &mut expired => return Err(cancelled(attempt, limit)),
                outcome = self.attempt(&request) => outcome,
            };

            let error = match outcome {
                Ok(output) => {
                    let elapsed = start.elapsed();
                    info!(
                        automation = %automation,
                        attempts = attempt,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Automation succeeded"
                    );
                    return Ok(ExecutionResult {
                        output,
                        attempts: attempt,
                        elapsed,
                    });
                }
                Err(error) => error,
            };

            if attempt >= max_attempts {
                return Err(ExecutionError::Exhausted {
                    automation: automation.to_string(),
                    attempts: attempt,
                    elapsed: start.elapsed(),
                    source: error,
                });
            }

            warn!(
                automation = %automation,
                attempt,
                backoff_ms = backoff.as_millis() as u64,
                error = %error,
                "Attempt failed, retrying"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled(attempt, None)),
                _ = &mut expired => return Err(cancelled(attempt, limit)),
                _ = tokio::time::sleep(backoff) => {}
            }

            backoff = backoff.checked_mul(2).unwrap_or(Duration::MAX);
            attempt += 1;
        }
    }

    async fn attempt(&self, request: &InvocationRequest) -> Result<Vec<u8>, AttemptError> {
        let artifacts = self.invoker.invoke(request).await?;
        Ok(OutputNormalizer::merge(artifacts))
    }
}
