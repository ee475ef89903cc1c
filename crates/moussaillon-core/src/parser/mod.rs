//! The three strategies that map operator text to an instruction.
//!
//! `explicit` and `natural` are pure: `Ok(None)` means "not mine", `Err`
//! means the operator clearly used that syntax but got it wrong.

pub mod explicit;
pub mod natural;
pub mod planner;

pub use explicit::parse_explicit;
pub use natural::NaturalLanguageParser;
pub use planner::{PlannerOutcome, PlannerParser};
