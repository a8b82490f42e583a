//! The game aggregate and everything seated in it.
//!
//! ## Key Types
//!
//! - `Game`: seating, whisper mode, day records and the event outbox
//! - `Player`: identity, character, alignment and per-game status
//! - `AbilityRef`: names one ability in play for hook dispatch
//! - `GameEvent`: committed changes for the referee to publish

mod dispatch;
mod events;
#[allow(clippy::module_inception)]
mod game;
mod persist;
mod player;

pub use dispatch::AbilityRef;
pub use events::GameEvent;
pub use game::{Game, GameBuilder, WhisperMode};
pub use player::Player;
