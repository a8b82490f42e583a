//! The player entity.
//!
//! Seat position, ghost status and dead votes are private: they only change
//! through the game so the seating and dead-vote invariants hold. Flags the
//! storyteller toggles freely (nomination eligibility, hands, inactivity) are
//! public fields.

use serde::{Deserialize, Serialize};

use crate::characters::{Alignment, Character, RoleKind, Team};
use crate::core::UserId;

/// A seated participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    id: UserId,
    /// Character in play. Replaced wholesale on role change.
    pub character: Character,
    pub alignment: Alignment,
    position: usize,
    ghost: bool,
    dead_votes: u8,
    /// May nominate today.
    pub can_nominate: bool,
    /// May be nominated today.
    pub can_be_nominated: bool,
    /// Provisional or committed hand during a vote.
    pub hand_raised: bool,
    /// Set once the player's vote is committed.
    pub hand_locked: bool,
    pub is_traveler: bool,
    /// Marked by the storyteller as not participating. Their vote turns are
    /// entered as no unless they queued a vote.
    pub is_inactive: bool,
}

impl Player {
    /// Seat `id` as `role` with the role's default alignment.
    #[must_use]
    pub fn new(id: UserId, role: RoleKind) -> Self {
        Self {
            id,
            character: Character::new(role),
            alignment: role.default_alignment(),
            position: 0,
            ghost: false,
            dead_votes: 0,
            can_nominate: true,
            can_be_nominated: true,
            hand_raised: false,
            hand_locked: false,
            is_traveler: role.team() == Team::Traveler,
            is_inactive: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Index in the seating order.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn is_ghost(&self) -> bool {
        self.ghost
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.ghost
    }

    /// Spendable dead votes. Always zero while alive.
    #[must_use]
    pub fn dead_votes(&self) -> u8 {
        self.dead_votes
    }

    #[must_use]
    pub fn role(&self) -> RoleKind {
        self.character.role()
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    pub(crate) fn die(&mut self) {
        self.ghost = true;
        self.dead_votes = 1;
        self.can_nominate = false;
    }

    pub(crate) fn revive(&mut self) {
        self.ghost = false;
        self.dead_votes = 0;
        self.can_nominate = true;
        self.can_be_nominated = true;
    }

    pub(crate) fn spend_dead_vote(&mut self) {
        self.dead_votes = self
            .dead_votes
            .checked_sub(1)
            .unwrap_or_else(|| panic!("{} spent a dead vote they did not have", self.id));
    }

    pub(crate) fn refund_dead_vote(&mut self) {
        self.dead_votes += 1;
    }

    pub(crate) fn reset_hand(&mut self) {
        self.hand_raised = false;
        self.hand_locked = false;
    }
}
