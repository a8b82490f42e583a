//! Building a vote: order, weights and majority.

use super::{Vote, VoteWeight};
use crate::core::{UserId, VoteId};
use crate::day::{Nomination, NominationKind};
use crate::game::Game;

/// A vote under construction, handed to vote-beginning hooks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteSetup {
    pub order: Vec<UserId>,
    /// Parallel to `order`.
    pub weights: Vec<VoteWeight>,
    pub majority: u32,
    pub free_dead_votes: bool,
    /// When set, only these players may vote yes.
    pub restricted_to: Option<Vec<UserId>>,
}

impl VoteSetup {
    /// Multiply every yes-weight entry of `target`.
    pub fn scale_yes(&mut self, target: UserId, factor: i32) {
        for (voter, weight) in self.order.iter().zip(&mut self.weights) {
            if *voter == target {
                weight.yes *= factor;
            }
        }
    }

    /// Make `target`'s yes count for nothing.
    pub fn zero_yes(&mut self, target: UserId) {
        self.scale_yes(target, 0);
    }

    /// Total yes-weight `voter` holds across their entries.
    #[must_use]
    pub fn yes_weight(&self, voter: UserId) -> i32 {
        self.order
            .iter()
            .zip(&self.weights)
            .filter(|(v, _)| **v == voter)
            .map(|(_, w)| w.yes)
            .sum()
    }
}

/// Votes needed to pass with `voters` counted: half, rounded up.
///
/// ```
/// use townsquare::vote::majority_for;
///
/// assert_eq!(majority_for(5), 3);
/// assert_eq!(majority_for(6), 3);
/// assert_eq!(majority_for(7), 4);
/// ```
#[must_use]
pub fn majority_for(voters: usize) -> u32 {
    voters.div_ceil(2) as u32
}

/// Seating rotated so the seat after `origin` comes first.
fn rotate_after(seating: &[UserId], origin: UserId) -> Vec<UserId> {
    let start = seating
        .iter()
        .position(|id| *id == origin)
        .map_or(0, |seat| seat + 1);
    seating[start..].iter().chain(&seating[..start]).copied().collect()
}

/// Build the vote for an accepted nomination.
///
/// - Player and storyteller calls count only the living towards majority,
///   enter double votes twice, and let vote-beginning hooks rewrite the setup.
/// - Exile votes start after the nominator, count everyone towards majority,
///   let the dead vote freely and skip hooks and double votes.
pub(crate) fn build_vote(game: &Game, id: VoteId, nomination: Nomination) -> Vote {
    let seating = game.seating();

    let setup = match nomination.kind {
        NominationKind::Exile(traveler) => {
            let origin = nomination.nominator.unwrap_or(traveler);
            let order = rotate_after(&seating, origin);
            VoteSetup {
                weights: vec![VoteWeight::default(); order.len()],
                order,
                majority: majority_for(game.player_count()),
                free_dead_votes: true,
                restricted_to: None,
            }
        }
        NominationKind::Player(_) | NominationKind::Storytellers => {
            let rotated = match nomination.kind {
                NominationKind::Player(nominee) => rotate_after(&seating, nominee),
                _ => seating,
            };
            let mut order = Vec::with_capacity(rotated.len());
            for voter in rotated {
                order.push(voter);
                if game.votes_twice(voter) {
                    order.push(voter);
                }
            }
            let mut setup = VoteSetup {
                weights: vec![VoteWeight::default(); order.len()],
                order,
                majority: majority_for(game.alive_count()),
                free_dead_votes: false,
                restricted_to: None,
            };
            game.run_vote_beginning_hooks(&mut setup);
            setup
        }
    };

    tracing::debug!(
        vote = %id,
        voters = setup.order.len(),
        majority = setup.majority,
        "vote built"
    );
    Vote::new(id, nomination, setup)
}
