//! Port traits for the referee's collaborators.
//!
//! The referee owns game state and nothing else. Delivery of announcements
//! and prompts goes through a [`Transport`]; channel permissions and seating
//! layout go through a [`Topology`]. Both are told about changes after the
//! state is committed, and their failures are logged rather than rolled back.

use async_trait::async_trait;

use crate::core::{UserId, VoteId};
use crate::error::TransportError;
use crate::game::GameEvent;

// =============================================================================
// Conversations
// =============================================================================

/// The exchange a reply belongs to.
///
/// Vote prompts are keyed by vote and turn, so a reply to a turn that has
/// already passed cannot land on a later one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Conversation {
    Vote { vote: VoteId, position: usize },
    Question(u32),
}

impl Conversation {
    #[must_use]
    pub fn vote(&self) -> Option<VoteId> {
        match self {
            Self::Vote { vote, .. } => Some(*vote),
            Self::Question(_) => None,
        }
    }
}

/// What a prompt asks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Question {
    /// Yes or no on a nomination.
    Vote {
        vote: VoteId,
        nominee: Option<UserId>,
        votes: i32,
        majority: u32,
    },
    FreeText(String),
}

/// Something the referee wants the transport to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Tell the town.
    Announce(GameEvent),
    /// Ask one user and route their reply back through `deliver_reply`.
    Prompt {
        user: UserId,
        conversation: Conversation,
        question: Question,
    },
    /// Keep the announcement for this vote visible while it runs.
    Pin { vote: VoteId },
    Unpin { vote: VoteId },
}

// =============================================================================
// Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, intent: Intent) -> Result<(), TransportError>;
}

/// Channel permissions and seating layout.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Topology: Send + Sync {
    async fn player_died(&self, player: UserId) -> Result<(), TransportError>;
    async fn player_revived(&self, player: UserId) -> Result<(), TransportError>;
    async fn seating_changed(&self, order: Vec<UserId>) -> Result<(), TransportError>;
}

/// A topology that manages nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullTopology;

#[async_trait]
impl Topology for NullTopology {
    async fn player_died(&self, _player: UserId) -> Result<(), TransportError> {
        Ok(())
    }

    async fn player_revived(&self, _player: UserId) -> Result<(), TransportError> {
        Ok(())
    }

    async fn seating_changed(&self, _order: Vec<UserId>) -> Result<(), TransportError> {
        Ok(())
    }
}
