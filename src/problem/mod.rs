//! Problem management -- recurring-pattern detection over incident lists and
//! the autonomous problem-creation decision.

pub mod decision;
pub mod patterns;

pub use decision::{create_problem, decide, meets_problem_criteria};
pub use patterns::{detect_patterns, IncidentPattern, PatternKind};
