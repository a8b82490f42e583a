//! Core engine types: identities, configuration, seating RNG.
//!
//! Everything here is independent of the game rules. The rest of the crate
//! refers to participants by `UserId` and to votes by `VoteId`.

pub mod ids;
pub mod config;
pub mod rng;

pub use ids::{UserId, VoteId};
pub use config::{DefaultVote, RefereeConfig};
pub use rng::SeatRng;
