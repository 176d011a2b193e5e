//! # Actuate Runtime
//!
//! Execution side of Actuate: invoking resolved automations with retry,
//! backoff and timeout, merging their output, and wrapping it in response
//! envelopes.
//!
//! The host automation system is reached through two traits,
//! [`AutomationInvoker`] and [`IndexProvider`]. [`ShortcutsCli`] implements
//! both on top of the macOS `shortcuts` tool; tests substitute scripted
//! implementations.
//!
//! [`Dispatcher`] ties resolution (from `actuate-core`) and execution
//! together.

pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod executor;
pub mod invoker;
pub mod output;
pub mod shortcuts;
pub mod trace;

pub use dispatch::{Coverage, DispatchOutcome, DispatchRequest, Dispatcher, DryRun};
pub use envelope::{ErrorEnvelope, ResponseEnvelope, normalize_input, normalize_output};
pub use error::{ActuateError, ActuateResult};
pub use executor::{
    AttemptError, DEFAULT_OUTPUT_TYPE, EMPTY_PAYLOAD, ExecutionError, ExecutionResult, Executor,
    RetryPolicy,
};
pub use invoker::{
    AutomationInvoker, IndexProvider, InvocationRequest, InvokeError, OutputArtifact,
    is_not_found_text,
};
pub use output::OutputNormalizer;
pub use shortcuts::{SHORTCUTS_BIN, ShortcutsCli, parse_list};
pub use trace::{TraceEntry, TraceLog};

pub use tokio_util::sync::CancellationToken;
