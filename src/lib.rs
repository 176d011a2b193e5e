//! # Actuate
//!
//! Drive the Streaks app through installed macOS Shortcuts: pick an
//! abstract action, resolve it to an installed automation, run it with
//! retry and timeout, and get back a normalized response envelope.
//!
//! This crate re-exports the workspace members:
//!
//! - [`core`]: action catalog, candidate resolution and matching
//! - [`runtime`]: execution, output normalization and dispatch
//! - [`config`]: persisted mappings and execution defaults

pub use actuate_config as config;
pub use actuate_core as core;
pub use actuate_runtime as runtime;

pub use actuate_config::{Config, ConfigStore, ExecutionSettings};
pub use actuate_core::{
    ActionCatalog, ActionDefinition, AppMetadata, AutomationIndex, AutomationRecord,
    AutomationRef, ErrorKind, Resolution, ResolutionSource,
};
pub use actuate_runtime::{
    ActuateError, ActuateResult, CancellationToken, DispatchOutcome, DispatchRequest, Dispatcher,
    ResponseEnvelope, RetryPolicy,
};
