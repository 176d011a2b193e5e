//! # Actuate Config
//!
//! TOML configuration: execution defaults and persisted action mappings.
//!
//! ```toml
//! [execution]
//! timeout = "30s"
//! retries = 0
//! retry_wait = "1s"
//! output_type = "public.plain-text"
//!
//! [mappings.task-list]
//! name = "All Tasks"
//! ```
//!
//! Resolution only ever reads mappings (through [`actuate_core::MappingSource`]);
//! writing is left to explicit link/unlink flows.

pub mod error;
pub mod settings;
pub mod store;

pub use error::{ConfigError, ConfigResult};
pub use settings::{Config, DEFAULT_OUTPUT_TYPE, ExecutionSettings};
pub use store::{CONFIG_ENV, ConfigStore, resolve_path};
