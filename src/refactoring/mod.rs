//! From detected issues to an auditable plan, and from a plan to new text.

pub mod assessment;
pub mod edits;
pub mod executor;
pub mod plan;

pub use assessment::{assess, Policy};
pub use edits::{apply_line_edits, LineEdit};
pub use executor::Executor;
pub use plan::{compute_complexity, compute_safe_to_apply, PlanBuilder};
