//! The sequential voting protocol.
//!
//! Voters are asked strictly in order. [`Game::next_step`] reports what the
//! current turn needs (a preset to apply, a barred voter to skip, or a human
//! to prompt) and [`Game::cast_vote`] commits one ballot after
//! re-validating that the vote is still open and the turn still belongs to
//! the voter. The referee serializes `cast_vote` calls through the vote's
//! lock; the checks here make a late or duplicate commit fail cleanly.

use super::{Ballot, Operator, Vote, VoteOutcome, VoteState};
use crate::core::{UserId, VoteId};
use crate::day::{AboutToDie, NominationKind};
use crate::error::{RefereeError, ValidationError};
use crate::game::{Game, GameEvent};

/// What the current turn of the current vote needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextStep {
    /// No vote is waiting on anyone.
    Finished,
    /// A queued vote to commit for the voter. The queue entry is consumed.
    Preset {
        vote: VoteId,
        voter: UserId,
        position: usize,
        yes: bool,
    },
    /// The voter may not vote yes here, or sits out as inactive; commit a
    /// no for them.
    Barred {
        vote: VoteId,
        voter: UserId,
        position: usize,
    },
    /// Ask the voter.
    Prompt { vote: VoteId, voter: UserId, position: usize },
}

impl Game {
    /// The vote still being held today, if any.
    #[must_use]
    pub fn current_vote(&self) -> Option<&Vote> {
        self.current_day()?.current_vote()
    }

    fn current_vote_mut(&mut self) -> Option<&mut Vote> {
        self.current_day_mut()
            .ok()?
            .votes
            .last_mut()
            .filter(|v| !v.is_done())
    }

    /// Dead without a dead vote to spend, or shut out by a restriction.
    fn is_barred(&self, vote: &Vote, voter: UserId) -> bool {
        let Ok(player) = self.player(voter) else {
            return true;
        };
        let out_of_dead_votes = player.is_ghost()
            && player.dead_votes() == 0
            && !vote.free_dead_votes()
            && !vote.voted_yes(voter);
        out_of_dead_votes || !vote.may_vote(voter)
    }

    /// Start or continue the current vote and report what its turn needs.
    ///
    /// A preset for the current voter is taken out of the queue here, so it
    /// is applied at most once. Inactive players are not asked; only a
    /// queued vote speaks for them.
    pub fn next_step(&mut self) -> NextStep {
        let Some(vote) = self.current_vote() else {
            return NextStep::Finished;
        };
        let Some(voter) = vote.current_voter() else {
            return NextStep::Finished;
        };
        let barred = self.is_barred(vote, voter);
        let inactive = self.player(voter).is_ok_and(|p| p.is_inactive);

        let Some(vote) = self.current_vote_mut() else {
            return NextStep::Finished;
        };
        if vote.state == VoteState::Created {
            vote.state = VoteState::InProgress;
        }
        let (id, position) = (vote.id(), vote.position());
        let preset = vote.preset_votes.remove(&voter);

        match preset {
            _ if barred => NextStep::Barred {
                vote: id,
                voter,
                position,
            },
            Some(yes) => NextStep::Preset {
                vote: id,
                voter,
                position,
                yes,
            },
            None if inactive => NextStep::Barred {
                vote: id,
                voter,
                position,
            },
            None => NextStep::Prompt { vote: id, voter, position },
        }
    }

    /// Commit `voter`'s ballot on vote `id`.
    ///
    /// Returns the outcome when this ballot was the last one.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the vote is finished, cancelled or unknown
    /// - `NotYourTurn` if the turn belongs to someone else
    /// - `NoDeadVote`, `VoteRestricted` or a role's own refusal for a yes
    ///   the voter may not give
    pub fn cast_vote(
        &mut self,
        id: VoteId,
        voter: UserId,
        yes: bool,
        operator: Operator,
    ) -> Result<Option<VoteOutcome>, RefereeError> {
        let vote = self
            .current_day()
            .and_then(|day| day.vote(id))
            .filter(|vote| !vote.is_done())
            .ok_or(RefereeError::Conflict(id))?;
        let expected = vote.current_voter().ok_or(RefereeError::Conflict(id))?;
        if voter != expected {
            return Err(ValidationError::NotYourTurn { voter, expected }.into());
        }

        let player = self.player(voter)?;
        let spends_dead_vote =
            yes && player.is_ghost() && !vote.free_dead_votes() && !vote.voted_yes(voter);
        if yes {
            if spends_dead_vote && player.dead_votes() == 0 {
                return Err(ValidationError::NoDeadVote(voter).into());
            }
            if !vote.may_vote(voter) {
                return Err(ValidationError::VoteRestricted(voter).into());
            }
        }
        self.check_vote_hooks(vote, voter, yes)?;

        let position = vote.position();
        let weight = vote.weights()[position];

        // Validated; commit.
        let player = self.player_mut(voter)?;
        if spends_dead_vote {
            player.spend_dead_vote();
        }
        player.hand_raised = yes;
        player.hand_locked = true;

        let vote = self
            .current_day_mut()?
            .vote_mut(id)
            .ok_or(RefereeError::Conflict(id))?;
        let contribution = if yes { weight.yes } else { weight.no };
        vote.history.push(Ballot {
            voter,
            yes,
            weight: contribution,
            operator,
            spent_dead_vote: spends_dead_vote,
        });
        vote.votes += contribution;
        vote.position += 1;
        vote.state = VoteState::InProgress;
        let total = vote.votes;
        let finished = vote.position >= vote.order.len();

        tracing::info!(vote = %id, %voter, yes, ?operator, total, "vote cast");
        self.emit(GameEvent::VoteCast {
            vote: id,
            voter,
            yes,
            votes: total,
        });

        if finished {
            return self.finish_vote(id).map(Some);
        }
        Ok(None)
    }

    /// Decide the outcome and reopen the day.
    fn finish_vote(&mut self, id: VoteId) -> Result<VoteOutcome, RefereeError> {
        let day = self.current_day_mut()?;
        let vote = day.vote(id).ok_or(RefereeError::Conflict(id))?;
        let (kind, total, majority) = (vote.nomination().kind, vote.votes(), vote.majority());
        let reached = total >= majority as i32;

        let outcome = match kind {
            NominationKind::Player(nominee) => {
                let leading = day.votes_to_beat();
                if reached && leading.map_or(true, |votes| total > votes) {
                    day.about_to_die = Some(AboutToDie {
                        nominee,
                        vote: id,
                        votes: total,
                    });
                    day.tied_votes = None;
                    VoteOutcome::Passed
                } else if leading == Some(total) {
                    day.about_to_die = None;
                    day.tied_votes = Some(total);
                    VoteOutcome::Tied
                } else {
                    VoteOutcome::Failed
                }
            }
            NominationKind::Storytellers | NominationKind::Exile(_) => {
                if reached {
                    VoteOutcome::Passed
                } else {
                    VoteOutcome::Failed
                }
            }
        };

        if let Some(vote) = day.vote_mut(id) {
            vote.state = VoteState::Done(outcome);
        }
        day.noms_open = true;
        for player in self.players_mut() {
            player.reset_hand();
        }

        tracing::info!(vote = %id, ?outcome, total, majority, "vote finished");
        self.emit(GameEvent::VoteFinished {
            vote: id,
            outcome,
            votes: total,
            majority,
        });
        Ok(outcome)
    }

    /// Queue `voter`'s vote for when their turn comes.
    pub fn preset_vote(&mut self, voter: UserId, yes: bool) -> Result<(), ValidationError> {
        self.player(voter)?;
        let vote = self
            .current_vote_mut()
            .ok_or(ValidationError::NoVoteInProgress)?;
        let last_turn = vote
            .order
            .iter()
            .rposition(|v| *v == voter)
            .ok_or(ValidationError::VoteRestricted(voter))?;
        if last_turn < vote.position {
            return Err(ValidationError::TurnPassed(voter));
        }
        vote.preset_votes.insert(voter, yes);
        tracing::debug!(vote = %vote.id(), %voter, yes, "preset vote queued");
        Ok(())
    }

    /// Withdraw a queued vote. Returns whether one was queued.
    pub fn cancel_preset(&mut self, voter: UserId) -> Result<bool, ValidationError> {
        let vote = self
            .current_vote_mut()
            .ok_or(ValidationError::NoVoteInProgress)?;
        Ok(vote.preset_votes.remove(&voter).is_some())
    }

    /// Raise a provisional hand while waiting for a turn.
    pub fn hand_up(&mut self, voter: UserId) -> Result<(), ValidationError> {
        self.set_hand(voter, true)
    }

    pub fn hand_down(&mut self, voter: UserId) -> Result<(), ValidationError> {
        self.set_hand(voter, false)
    }

    fn set_hand(&mut self, voter: UserId, raised: bool) -> Result<(), ValidationError> {
        if self.current_vote().is_none() {
            return Err(ValidationError::NoVoteInProgress);
        }
        let player = self.player_mut(voter)?;
        if player.hand_locked {
            return Err(ValidationError::HandLocked(voter));
        }
        player.hand_raised = raised;
        self.emit(GameEvent::HandChanged { voter, raised });
        Ok(())
    }
}
