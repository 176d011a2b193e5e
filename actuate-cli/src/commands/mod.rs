mod actions;
mod coverage;
mod links;
mod run;

pub use actions::actions;
pub use coverage::coverage;
pub use links::{link, links, unlink};
pub use run::{run, try_candidates};
