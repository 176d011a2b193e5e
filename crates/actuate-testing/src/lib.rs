//! # Actuate Testing
//!
//! Test doubles for the runtime's collaborator traits and a few fixtures.
//!
//! ```rust
//! use actuate_testing::{MockInvoker, MockOutcome};
//!
//! let invoker = MockInvoker::new()
//!     .with_script("All Tasks", [MockOutcome::fail("busy"), MockOutcome::output("[]")]);
//! assert_eq!(invoker.call_count(), 0);
//! ```

pub mod fixtures;
pub mod mock_invoker;

pub use fixtures::{index_with_ids, streaks_metadata};
pub use mock_invoker::{FailingIndex, MockInvoker, MockOutcome, StaticIndex};
