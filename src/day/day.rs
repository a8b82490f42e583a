//! Day records and nominations.

use serde::{Deserialize, Serialize};

use crate::core::{UserId, VoteId};
use crate::vote::Vote;

/// What a nomination puts to the vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NominationKind {
    /// A call on the storytellers. Nobody is executed.
    Storytellers,
    /// A call to exile a traveler.
    Exile(UserId),
    /// A call to execute a player.
    Player(UserId),
}

/// A nomination as the hooks see it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nomination {
    pub kind: NominationKind,
    /// `None` when the storytellers made the call.
    pub nominator: Option<UserId>,
}

impl Nomination {
    /// The player on the block, if any.
    #[must_use]
    pub fn nominee(&self) -> Option<UserId> {
        match self.kind {
            NominationKind::Storytellers => None,
            NominationKind::Exile(user) | NominationKind::Player(user) => Some(user),
        }
    }

    #[must_use]
    pub fn is_exile(&self) -> bool {
        matches!(self.kind, NominationKind::Exile(_))
    }
}

/// The leading execution candidate of the day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AboutToDie {
    pub nominee: UserId,
    pub vote: VoteId,
    pub votes: i32,
}

/// One day.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Day {
    number: usize,
    pub(crate) noms_open: bool,
    pub(crate) pms_open: bool,
    pub(crate) votes: Vec<Vote>,
    pub(crate) about_to_die: Option<AboutToDie>,
    /// Total of a tie that cleared the block. Still the bar to beat.
    pub(crate) tied_votes: Option<i32>,
    pub(crate) executed: Option<UserId>,
}

impl Day {
    /// PMs open, nominations not yet called.
    #[must_use]
    pub fn new(number: usize) -> Self {
        Self {
            number,
            noms_open: false,
            pms_open: true,
            votes: Vec::new(),
            about_to_die: None,
            tied_votes: None,
            executed: None,
        }
    }

    /// 1-based day number.
    #[must_use]
    pub fn number(&self) -> usize {
        self.number
    }

    #[must_use]
    pub fn noms_open(&self) -> bool {
        self.noms_open
    }

    #[must_use]
    pub fn pms_open(&self) -> bool {
        self.pms_open
    }

    /// Every vote held today, finished or not.
    #[must_use]
    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    #[must_use]
    pub fn vote(&self, id: VoteId) -> Option<&Vote> {
        self.votes.iter().find(|v| v.id() == id)
    }

    pub(crate) fn vote_mut(&mut self, id: VoteId) -> Option<&mut Vote> {
        self.votes.iter_mut().find(|v| v.id() == id)
    }

    /// The vote still being held, if any.
    #[must_use]
    pub fn current_vote(&self) -> Option<&Vote> {
        self.votes.last().filter(|v| !v.is_done())
    }

    #[must_use]
    pub fn about_to_die(&self) -> Option<&AboutToDie> {
        self.about_to_die.as_ref()
    }

    /// Votes a nomination must strictly exceed to go on the block.
    ///
    /// The about-to-die's total, or the total of the tie that cleared it.
    #[must_use]
    pub fn votes_to_beat(&self) -> Option<i32> {
        self.about_to_die.map(|a| a.votes).or(self.tied_votes)
    }

    /// Who was executed today.
    #[must_use]
    pub fn executed(&self) -> Option<UserId> {
        self.executed
    }
}
