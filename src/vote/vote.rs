//! The vote record.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::VoteSetup;
use crate::core::{UserId, VoteId};
use crate::day::Nomination;

/// Contribution of a voter's no and yes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteWeight {
    pub no: i32,
    pub yes: i32,
}

impl Default for VoteWeight {
    fn default() -> Self {
        Self { no: 0, yes: 1 }
    }
}

/// Who entered a ballot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// The voter, through the transport or a command.
    Voter,
    /// A storyteller on the voter's behalf.
    Storyteller,
    /// A vote queued before the voter's turn.
    Preset,
    /// The voter's configured default after their delay ran out.
    Default,
    /// Entered automatically for a voter who may not vote.
    Auto,
}

/// One committed ballot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub voter: UserId,
    pub yes: bool,
    /// Amount added to the running total.
    pub weight: i32,
    pub operator: Operator,
    pub spent_dead_vote: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteOutcome {
    /// Reached majority and beat the day's leading candidate.
    Passed,
    /// Matched the day's leading candidate; neither is on the block.
    Tied,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteState {
    Created,
    InProgress,
    Done(VoteOutcome),
}

/// A vote on one nomination.
///
/// `order` and `weights` are parallel: entry `i` is the voter whose turn
/// comes `i`th and what their no and yes are worth. A voter whose votes
/// count twice appears in two consecutive entries.
///
/// Commits are serialized through `lock`, which every clone of the vote
/// shares. The lock is not persisted; a restored vote gets a fresh one.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vote {
    id: VoteId,
    nomination: Nomination,
    pub(crate) order: Vec<UserId>,
    pub(crate) weights: Vec<VoteWeight>,
    majority: u32,
    free_dead_votes: bool,
    restricted_to: Option<Vec<UserId>>,
    pub(crate) position: usize,
    pub(crate) votes: i32,
    pub(crate) history: Vec<Ballot>,
    pub(crate) preset_votes: FxHashMap<UserId, bool>,
    pub(crate) state: VoteState,
    #[serde(skip)]
    lock: Arc<Mutex<()>>,
}

impl Vote {
    pub(crate) fn new(id: VoteId, nomination: Nomination, setup: VoteSetup) -> Self {
        debug_assert_eq!(setup.order.len(), setup.weights.len());
        Self {
            id,
            nomination,
            order: setup.order,
            weights: setup.weights,
            majority: setup.majority,
            free_dead_votes: setup.free_dead_votes,
            restricted_to: setup.restricted_to,
            position: 0,
            votes: 0,
            history: Vec::new(),
            preset_votes: FxHashMap::default(),
            state: VoteState::Created,
            lock: Arc::default(),
        }
    }

    #[must_use]
    pub fn id(&self) -> VoteId {
        self.id
    }

    #[must_use]
    pub fn nomination(&self) -> Nomination {
        self.nomination
    }

    #[must_use]
    pub fn nominee(&self) -> Option<UserId> {
        self.nomination.nominee()
    }

    /// Voting order, one entry per turn.
    #[must_use]
    pub fn order(&self) -> &[UserId] {
        &self.order
    }

    #[must_use]
    pub fn weights(&self) -> &[VoteWeight] {
        &self.weights
    }

    #[must_use]
    pub fn majority(&self) -> u32 {
        self.majority
    }

    /// The dead vote without spending dead votes.
    #[must_use]
    pub fn free_dead_votes(&self) -> bool {
        self.free_dead_votes
    }

    /// Whether `voter` may vote yes at all in this vote.
    #[must_use]
    pub fn may_vote(&self, voter: UserId) -> bool {
        self.restricted_to
            .as_ref()
            .map_or(true, |allowed| allowed.contains(&voter))
    }

    /// Index into `order` of the voter whose turn it is.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Running total.
    #[must_use]
    pub fn votes(&self) -> i32 {
        self.votes
    }

    #[must_use]
    pub fn history(&self) -> &[Ballot] {
        &self.history
    }

    #[must_use]
    pub fn state(&self) -> VoteState {
        self.state
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self.state, VoteState::Done(_))
    }

    #[must_use]
    pub fn outcome(&self) -> Option<VoteOutcome> {
        match self.state {
            VoteState::Done(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// The voter whose turn it is, until the vote is done.
    #[must_use]
    pub fn current_voter(&self) -> Option<UserId> {
        if self.is_done() {
            return None;
        }
        self.order.get(self.position).copied()
    }

    /// True when `voter` has already committed a yes in this vote.
    #[must_use]
    pub fn voted_yes(&self, voter: UserId) -> bool {
        self.history.iter().any(|b| b.voter == voter && b.yes)
    }

    /// True when `voter` has already committed any ballot in this vote.
    #[must_use]
    pub fn has_voted(&self, voter: UserId) -> bool {
        self.history.iter().any(|b| b.voter == voter)
    }

    #[must_use]
    pub fn preset_for(&self, voter: UserId) -> Option<bool> {
        self.preset_votes.get(&voter).copied()
    }

    /// Lock serializing commits on this vote.
    #[must_use]
    pub fn lock(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.lock)
    }
}
