//! Error types.
//!
//! - [`ValidationError`]: an action attempted outside protocol state. Always
//!   recoverable; returned before any mutation.
//! - [`RefereeError`]: everything the async driver can report, including vote
//!   conflicts (the vote moved on between prompt and commit) and timeouts.
//! - [`PersistError`]: snapshot encode/decode failures.
//! - [`TransportError`]: collaborator failures. These are logged by the
//!   referee and never roll back committed state.
//!
//! Invariant violations (negative dead votes, a seat whose recorded position
//! disagrees with the seating order) are defects and panic.

use thiserror::Error;

use crate::characters::RoleKind;
use crate::core::{UserId, VoteId};

/// An action attempted outside protocol state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no such player: {0}")]
    UnknownPlayer(UserId),

    #[error("{0} is already seated")]
    DuplicatePlayer(UserId),

    #[error("it is not currently day")]
    NotDay,

    #[error("it is already day")]
    AlreadyDay,

    #[error("nominations are closed")]
    NominationsClosed,

    #[error("a vote is already in progress")]
    VoteInProgress,

    #[error("no vote is in progress")]
    NoVoteInProgress,

    #[error("{0} may not nominate right now")]
    CannotNominate(UserId),

    #[error("{0} has already been nominated today")]
    AlreadyNominated(UserId),

    #[error("it is {expected}'s turn to vote, not {voter}'s")]
    NotYourTurn { voter: UserId, expected: UserId },

    #[error("{0} has no dead vote to spend")]
    NoDeadVote(UserId),

    #[error("{0} may not vote in this vote")]
    VoteRestricted(UserId),

    #[error("{voter} may not vote yes: {reason}")]
    VoteForbidden { voter: UserId, reason: &'static str },

    #[error("{0}'s turn to vote has already passed")]
    TurnPassed(UserId),

    #[error("{0}'s hand is locked")]
    HandLocked(UserId),

    #[error("{0} is not a traveler")]
    NotTraveler(UserId),

    #[error("{0} cannot host another ability")]
    NotComposite(RoleKind),

    #[error("seating order must contain every player exactly once")]
    InvalidSeating,

    #[error("{from} may not whisper to {to}")]
    WhisperBlocked { from: UserId, to: UserId },

    #[error("private messages are closed")]
    PmsClosed,

    #[error("there is no nomination to cancel")]
    NothingToCancel,

    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// Snapshot encode/decode failure.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to encode game: {0}")]
    Encode(#[source] bincode::Error),

    #[error("failed to decode game: {0}")]
    Decode(#[source] bincode::Error),
}

/// Collaborator failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("collaborator unavailable")]
    Unavailable,
}

/// Errors reported by the referee.
#[derive(Debug, Error)]
pub enum RefereeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The vote advanced, finished or was cancelled before this action landed.
    #[error("{0} has already ended")]
    Conflict(VoteId),

    #[error("timed out waiting for {0} to reply")]
    Timeout(UserId),

    #[error("no game is running")]
    NoActiveGame,

    #[error("a game is already running")]
    GameAlreadyRunning,

    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl RefereeError {
    /// True when the action lost a race with another actor on the same vote.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        matches!(
            self,
            RefereeError::Conflict(_)
                | RefereeError::Validation(ValidationError::NotYourTurn { .. })
        )
    }
}
