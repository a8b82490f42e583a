//! Events the game emits as it changes.
//!
//! The game appends to an outbox; the referee drains it after each command
//! and turns each event into transport and topology calls. Events describe
//! state that is already committed.

use crate::characters::{Alignment, RoleKind};
use crate::core::{UserId, VoteId};
use crate::vote::VoteOutcome;

use super::WhisperMode;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    DayStarted { day: usize },
    DayEnded { day: usize, about_to_die: Option<UserId> },
    NominationsOpened,
    NominationsClosed,
    PmsOpened,
    PmsClosed,

    Nominated {
        vote: VoteId,
        nominee: Option<UserId>,
        nominator: Option<UserId>,
        exile: bool,
    },
    /// A nomination hook stopped the vote from happening.
    NominationBlocked {
        nominee: Option<UserId>,
        nominator: Option<UserId>,
    },
    NominationCancelled { vote: VoteId },
    VoteCast {
        vote: VoteId,
        voter: UserId,
        yes: bool,
        votes: i32,
    },
    HandChanged { voter: UserId, raised: bool },
    VoteFinished {
        vote: VoteId,
        outcome: VoteOutcome,
        votes: i32,
        majority: u32,
    },

    Died { player: UserId, announce: bool },
    Revived { player: UserId },
    Executed { player: UserId, died: bool },

    SeatingChanged { order: Vec<UserId> },
    TravelerJoined { player: UserId, role: RoleKind },
    TravelerLeft { player: UserId },
    RoleChanged { player: UserId, role: RoleKind },
    AlignmentChanged { player: UserId, alignment: Alignment },
    WhisperModeChanged { mode: WhisperMode },
}
