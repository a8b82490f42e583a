//! The day phase: nominations, day records and transitions.

mod controller;
#[allow(clippy::module_inception)]
mod day;

pub use controller::NominationOutcome;
pub use day::{AboutToDie, Day, Nomination, NominationKind};
