//! # townsquare
//!
//! A referee and state engine for Clocktower-style social deduction games.
//!
//! ## Design Principles
//!
//! 1. **Roles Are Data Plus Hooks**: A role is a catalog entry with a record
//!    of optional handlers. Nothing dispatches on a role by name outside the
//!    hook table.
//!
//! 2. **Composition Over Inheritance**: A character may host other
//!    characters. Hooks reach hosted abilities by walking the tree, and
//!    poison on a host silences everything below it.
//!
//! 3. **One Source of Truth per Turn**: The vote engine decides whose turn
//!    it is. Every commit re-validates against it, so late replies and
//!    expired timers fail cleanly instead of double-counting.
//!
//! ## Architecture
//!
//! - **Synchronous Core**: `Game` and everything under it is plain data with
//!   synchronous methods. Commands validate before they mutate and record
//!   what they changed as `GameEvent`s.
//!
//! - **Async Referee**: `Referee` owns the active game, prompts voters,
//!   routes replies and runs default-vote timers. Collaborators sit behind
//!   the `Transport` and `Topology` ports.
//!
//! - **Persistent Data Structures**: Day records live in an `im::Vector` so
//!   snapshot clones of a long game stay cheap.
//!
//! ## Modules
//!
//! - `core`: identities, referee configuration, seating RNG
//! - `characters`: role catalog, hook records, composable characters
//! - `game`: the game aggregate, players, hook dispatch, persistence
//! - `death`: the death resolution pipeline
//! - `day`: day records, nominations and transitions
//! - `vote`: vote construction and the sequential voting protocol
//! - `referee`: the async driver and its ports

pub mod core;
pub mod characters;
pub mod game;
pub mod death;
pub mod day;
pub mod vote;
pub mod referee;
pub mod error;

// Re-export commonly used types
pub use crate::core::{DefaultVote, RefereeConfig, SeatRng, UserId, VoteId};

pub use crate::characters::{Alignment, Character, DeathPriority, RoleHooks, RoleKind, Team};

pub use crate::game::{AbilityRef, Game, GameBuilder, GameEvent, Player, WhisperMode};

pub use crate::day::{AboutToDie, Day, Nomination, NominationKind, NominationOutcome};

pub use crate::vote::{Ballot, NextStep, Operator, Vote, VoteOutcome, VoteState, VoteWeight};

pub use crate::referee::{ActiveGame, Conversation, Intent, NullTopology, Question, Referee, Topology, Transport};

pub use crate::error::{PersistError, RefereeError, TransportError, ValidationError};
