//! # Actuate Core
//!
//! Pure, synchronous building blocks for turning an abstract action
//! ("list tasks", "complete task") into the name of an installed automation.
//!
//! ## Resolution pipeline
//!
//! 1. [`CandidateResolver`] expands an [`ActionDefinition`] and a task value
//!    against [`AppMetadata`] into an ordered, deduplicated [`CandidateList`].
//! 2. [`Matcher`] looks the candidates up in an [`AutomationIndex`] and
//!    returns the first candidate that is installed.
//! 3. [`ResolutionPlanner`] applies precedence: explicit override, then a
//!    persisted mapping, then resolver + matcher.
//!
//! Nothing in this crate performs I/O besides [`JsonMetadataFile`], and no
//! state is cached between calls.
//!
//! ## Example
//!
//! ```rust
//! use actuate_core::{
//!     ActionCatalog, AppMetadata, AutomationIndex, AutomationRecord, NoMappings,
//!     ResolutionPlanner, ResolutionRequest, ResolutionSource,
//! };
//!
//! let catalog = ActionCatalog::builtin();
//! let action = catalog.get("task-list").unwrap();
//! let metadata = AppMetadata::empty();
//! let index = AutomationIndex::from_records(vec![AutomationRecord::named("Task List")]);
//!
//! let planner = ResolutionPlanner::new(&metadata, &NoMappings);
//! let resolution = planner.plan(&ResolutionRequest::new(action), &index).unwrap();
//!
//! assert_eq!(resolution.automation, "Task List");
//! assert_eq!(resolution.source, ResolutionSource::Discovered);
//! ```

pub mod action;
pub mod candidates;
pub mod error;
pub mod index;
pub mod input;
pub mod locale;
pub mod matcher;
pub mod metadata;
pub mod planner;
pub mod template;

pub use action::{ActionCatalog, ActionDefinition};
pub use candidates::{CandidateList, CandidateResolver};
pub use error::{ErrorKind, InputError, MetadataError, ResolutionError, ResolutionResult};
pub use index::{AutomationIndex, AutomationRecord};
pub use input::{build_input, task_from_input};
pub use locale::{order_locales, preferred_locales, preferred_locales_from};
pub use matcher::{MatchHit, MatchKind, Matcher};
pub use metadata::{
    AppMetadata, JsonMetadataFile, LocalizedPhrase, MetadataProvider, NoMetadata, PhraseTable,
    StaticMetadata,
};
pub use planner::{
    AutomationRef, MappingSource, NoMappings, Resolution, ResolutionPlanner, ResolutionRequest,
    ResolutionSource,
};
