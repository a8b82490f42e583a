//! The vote engine.
//!
//! ## Key Types
//!
//! - `Vote`: order, weights, majority, ballots and the commit lock
//! - `VoteSetup`: a vote under construction, rewritten by vote-beginning hooks
//! - `NextStep`: what the current turn needs
//!
//! ## Majority
//!
//! Half the living players, rounded up. Exile votes count every player.
//! A live Voudon drops it to 1.

mod protocol;
mod setup;
#[allow(clippy::module_inception)]
mod vote;

pub use protocol::NextStep;
pub(crate) use setup::build_vote;
pub use setup::{majority_for, VoteSetup};
pub use vote::{Ballot, Operator, Vote, VoteOutcome, VoteState, VoteWeight};
