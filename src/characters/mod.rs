//! Characters: the role catalog, hook records and composable abilities.
//!
//! ## Key Types
//!
//! - `RoleKind`: every role in the catalog, with name and team
//! - `RoleHooks`: the optional handlers a role fills
//! - `Character`: a role instance in play, possibly hosting others
//! - `DeathPriority`: resolution order of death hooks

mod catalog;
pub mod character;
pub mod hooks;
pub mod role;
pub mod rules;

pub use catalog::RoleKind;
pub use character::{AbilityPath, AbilityState, Character};
pub use hooks::{DeathPriority, RoleHooks};
pub use role::{Alignment, Team};
