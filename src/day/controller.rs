//! Day phase transitions and nominations.

use crate::core::{UserId, VoteId};
use crate::error::ValidationError;
use crate::game::{Game, GameEvent};
use crate::vote::build_vote;

use super::{AboutToDie, Nomination, NominationKind};

/// What became of an accepted nomination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NominationOutcome {
    /// A vote was attached to the day and is ready for its first voter.
    Started(VoteId),
    /// A nomination hook stopped it. Nominations stay closed.
    Blocked,
}

impl Game {
    /// End the night.
    ///
    /// Overnight `kills` go through the death pipeline after nomination
    /// flags reset, then day-start hooks fire.
    pub fn start_day(&mut self, kills: &[UserId]) -> Result<(), ValidationError> {
        if self.is_day() {
            return Err(ValidationError::AlreadyDay);
        }
        for target in kills {
            self.player(*target)?;
        }

        let number = self.begin_day();
        tracing::info!(day = number, kills = kills.len(), "day started");
        self.emit(GameEvent::DayStarted { day: number });

        for player in self.players_mut() {
            player.can_nominate = player.is_alive();
            player.can_be_nominated = true;
            player.reset_hand();
        }
        for target in kills {
            self.kill(*target, false, false)?;
        }
        self.run_day_start_hooks();
        Ok(())
    }

    /// Call for nominations.
    pub fn open_noms(&mut self) -> Result<(), ValidationError> {
        if self.current_vote().is_some() {
            return Err(ValidationError::VoteInProgress);
        }
        self.current_day_mut()?.noms_open = true;
        self.run_noms_called_hooks();
        tracing::debug!("nominations opened");
        self.emit(GameEvent::NominationsOpened);
        Ok(())
    }

    pub fn close_noms(&mut self) -> Result<(), ValidationError> {
        self.current_day_mut()?.noms_open = false;
        tracing::debug!("nominations closed");
        self.emit(GameEvent::NominationsClosed);
        Ok(())
    }

    pub fn open_pms(&mut self) -> Result<(), ValidationError> {
        self.current_day_mut()?.pms_open = true;
        self.emit(GameEvent::PmsOpened);
        Ok(())
    }

    pub fn close_pms(&mut self) -> Result<(), ValidationError> {
        self.current_day_mut()?.pms_open = false;
        self.emit(GameEvent::PmsClosed);
        Ok(())
    }

    /// End the day. Returns the player the day's votes left on the block.
    pub fn end_day(&mut self) -> Result<Option<AboutToDie>, ValidationError> {
        if self.current_vote().is_some() {
            return Err(ValidationError::VoteInProgress);
        }
        self.current_day_mut()?;
        self.run_day_end_hooks();

        let day = self.current_day_mut()?;
        day.noms_open = false;
        day.pms_open = false;
        let number = day.number();
        let about_to_die = day.about_to_die;
        self.finish_day();
        for player in self.players_mut() {
            player.reset_hand();
        }

        tracing::info!(day = number, about_to_die = ?about_to_die.map(|a| a.nominee), "day ended");
        self.emit(GameEvent::DayEnded {
            day: number,
            about_to_die: about_to_die.map(|a| a.nominee),
        });
        Ok(about_to_die)
    }

    /// Nominate `nominee` (`None` calls the storytellers).
    ///
    /// On acceptance nominations close, the nominator's and nominee's
    /// eligibility is spent, and every nomination hook sees the call. Only
    /// if they all let it proceed is a vote attached to the day.
    pub fn nominate(
        &mut self,
        nominee: Option<UserId>,
        nominator: Option<UserId>,
    ) -> Result<NominationOutcome, ValidationError> {
        let day = self.current_day().ok_or(ValidationError::NotDay)?;
        if !day.noms_open() {
            return Err(ValidationError::NominationsClosed);
        }
        if day.current_vote().is_some() {
            return Err(ValidationError::VoteInProgress);
        }

        let kind = match nominee {
            None => NominationKind::Storytellers,
            Some(user) => {
                let player = self.player(user)?;
                if !player.can_be_nominated {
                    return Err(ValidationError::AlreadyNominated(user));
                }
                if player.is_traveler {
                    NominationKind::Exile(user)
                } else {
                    NominationKind::Player(user)
                }
            }
        };
        let nomination = Nomination { kind, nominator };

        // Anyone, living or dead, may call for a traveler's exile.
        if let Some(user) = nominator {
            let player = self.player(user)?;
            if !nomination.is_exile() && !player.can_nominate {
                return Err(ValidationError::CannotNominate(user));
            }
        }

        self.current_day_mut()?.noms_open = false;
        if let (Some(user), false) = (nominator, nomination.is_exile()) {
            self.player_mut(user)?.can_nominate = false;
        }
        if let Some(user) = nominee {
            self.player_mut(user)?.can_be_nominated = false;
        }

        tracing::info!(nominee = ?nominee, nominator = ?nominator, kind = ?kind, "nomination");
        if !self.run_nomination_hooks(&nomination) {
            tracing::info!(nominee = ?nominee, "nomination blocked");
            self.emit(GameEvent::NominationBlocked { nominee, nominator });
            return Ok(NominationOutcome::Blocked);
        }

        let id = self.next_vote_id();
        let vote = build_vote(self, id, nomination);
        self.current_day_mut()?.votes.push(vote);
        self.emit(GameEvent::Nominated {
            vote: id,
            nominee,
            nominator,
            exile: nomination.is_exile(),
        });
        Ok(NominationOutcome::Started(id))
    }

    /// Withdraw the vote still being held.
    pub fn cancel_nomination(&mut self) -> Result<VoteId, ValidationError> {
        let id = self
            .current_vote()
            .map(|vote| vote.id())
            .ok_or(ValidationError::NothingToCancel)?;
        self.cancel_vote(id)?;
        Ok(id)
    }

    /// Withdraw vote `id`, provided it is still the one being held.
    ///
    /// Spent dead votes are refunded, the nominator and nominee get their
    /// eligibility back and nominations reopen.
    pub fn cancel_vote(&mut self, id: VoteId) -> Result<(), ValidationError> {
        let day = self.current_day_mut()?;
        if day.current_vote().map(|vote| vote.id()) != Some(id) {
            return Err(ValidationError::NothingToCancel);
        }
        let Some(vote) = day.votes.pop() else {
            return Err(ValidationError::NothingToCancel);
        };
        day.noms_open = true;

        for ballot in vote.history().iter().filter(|b| b.spent_dead_vote) {
            if let Ok(player) = self.player_mut(ballot.voter) {
                player.refund_dead_vote();
            }
        }
        let nomination = vote.nomination();
        if let (Some(user), false) = (nomination.nominator, nomination.is_exile()) {
            if let Ok(player) = self.player_mut(user) {
                player.can_nominate = player.is_alive();
            }
        }
        if let Some(user) = nomination.nominee() {
            if let Ok(player) = self.player_mut(user) {
                player.can_be_nominated = true;
            }
        }
        for player in self.players_mut() {
            player.reset_hand();
        }

        tracing::info!(vote = %id, "nomination cancelled");
        self.emit(GameEvent::NominationCancelled { vote: id });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characters::RoleKind;
    use crate::game::AbilityRef;

    fn id(n: u64) -> UserId {
        UserId::new(n)
    }

    fn day_game(roles: &[RoleKind]) -> Game {
        let mut builder = Game::builder();
        for (i, role) in roles.iter().enumerate() {
            builder = builder.player(id(i as u64 + 1), *role);
        }
        let mut game = builder.build().unwrap();
        game.start_day(&[]).unwrap();
        game.open_noms().unwrap();
        game.drain_events();
        game
    }

    #[test]
    fn test_start_day_twice() {
        let mut game = day_game(&[RoleKind::Chef, RoleKind::Imp]);
        assert_eq!(game.start_day(&[]), Err(ValidationError::AlreadyDay));
    }

    #[test]
    fn test_start_day_applies_kills() {
        let mut game = Game::builder()
            .player(id(1), RoleKind::Chef)
            .player(id(2), RoleKind::Soldier)
            .player(id(3), RoleKind::Imp)
            .build()
            .unwrap();
        game.start_day(&[id(1)]).unwrap();
        assert!(game.player(id(1)).unwrap().is_ghost());
        assert!(!game.player(id(1)).unwrap().can_nominate);
        assert!(game.player(id(2)).unwrap().can_nominate);
        assert_eq!(game.current_day().unwrap().number(), 1);
    }

    #[test]
    fn test_nominate_requires_open_noms() {
        let mut game = day_game(&[RoleKind::Chef, RoleKind::Imp, RoleKind::Monk]);
        game.close_noms().unwrap();
        assert_eq!(
            game.nominate(Some(id(2)), Some(id(1))),
            Err(ValidationError::NominationsClosed)
        );
    }

    #[test]
    fn test_nominate_starts_vote() {
        let mut game = day_game(&[RoleKind::Chef, RoleKind::Imp, RoleKind::Monk]);
        let outcome = game.nominate(Some(id(2)), Some(id(1))).unwrap();
        let NominationOutcome::Started(vote) = outcome else {
            panic!("expected a vote");
        };

        let day = game.current_day().unwrap();
        assert!(!day.noms_open());
        assert_eq!(day.current_vote().map(|v| v.id()), Some(vote));
        assert!(!game.player(id(1)).unwrap().can_nominate);
        assert!(!game.player(id(2)).unwrap().can_be_nominated);
        assert_eq!(
            game.nominate(Some(id(3)), Some(id(2))),
            Err(ValidationError::NominationsClosed)
        );
    }

    #[test]
    fn test_double_nomination_rejected() {
        let mut game = day_game(&[RoleKind::Chef, RoleKind::Imp, RoleKind::Monk]);
        game.nominate(Some(id(2)), Some(id(1))).unwrap();
        game.cancel_nomination().unwrap();
        game.nominate(Some(id(2)), Some(id(1))).unwrap();
        game.cancel_nomination().unwrap();

        game.player_mut(id(2)).unwrap().can_be_nominated = false;
        assert_eq!(
            game.nominate(Some(id(2)), Some(id(3))),
            Err(ValidationError::AlreadyNominated(id(2)))
        );
    }

    #[test]
    fn test_dead_cannot_nominate() {
        let mut game = day_game(&[RoleKind::Chef, RoleKind::Imp, RoleKind::Monk]);
        game.kill(id(1), false, false).unwrap();
        assert_eq!(
            game.nominate(Some(id(2)), Some(id(1))),
            Err(ValidationError::CannotNominate(id(1)))
        );
    }

    #[test]
    fn test_virgin_executes_townsfolk_nominator() {
        let mut game = day_game(&[RoleKind::Chef, RoleKind::Virgin, RoleKind::Imp]);
        assert_eq!(
            game.nominate(Some(id(2)), Some(id(1))),
            Ok(NominationOutcome::Blocked)
        );
        assert!(game.player(id(1)).unwrap().is_ghost());
        let day = game.current_day().unwrap();
        assert!(day.current_vote().is_none());
        assert!(!day.noms_open());
        assert_eq!(day.executed(), Some(id(1)));
    }

    #[test]
    fn test_virgin_ignores_non_townsfolk() {
        let mut game = day_game(&[RoleKind::Butler, RoleKind::Virgin, RoleKind::Imp]);
        assert!(matches!(
            game.nominate(Some(id(2)), Some(id(1))),
            Ok(NominationOutcome::Started(_))
        ));
        assert!(game.player(id(1)).unwrap().is_alive());
        let me = AbilityRef::root(id(2));
        assert!(game.ability_state(&me).unwrap().used);
    }

    #[test]
    fn test_poisoned_virgin_still_spends() {
        let mut game = day_game(&[RoleKind::Chef, RoleKind::Virgin, RoleKind::Imp]);
        game.poison(id(2)).unwrap();
        assert!(matches!(
            game.nominate(Some(id(2)), Some(id(1))),
            Ok(NominationOutcome::Started(_))
        ));
        assert!(game.player(id(1)).unwrap().is_alive());
        assert!(game.ability_state(&AbilityRef::root(id(2))).unwrap().used);
    }

    #[test]
    fn test_witch_curse_kills_nominator_but_vote_proceeds() {
        let mut game = day_game(&[RoleKind::Chef, RoleKind::Witch, RoleKind::Imp, RoleKind::Monk]);
        game.ability_state_mut(&AbilityRef::root(id(2))).unwrap().target = Some(id(1));

        assert!(matches!(
            game.nominate(Some(id(3)), Some(id(1))),
            Ok(NominationOutcome::Started(_))
        ));
        assert!(game.player(id(1)).unwrap().is_ghost());

        game.cancel_nomination().unwrap();
        game.end_day().unwrap();
        assert!(game.ability_state(&AbilityRef::root(id(2))).unwrap().target.is_none());
    }

    #[test]
    fn test_witch_loses_ability_at_three_alive() {
        let mut game = Game::builder()
            .player(id(1), RoleKind::Chef)
            .player(id(2), RoleKind::Witch)
            .player(id(3), RoleKind::Imp)
            .player(id(4), RoleKind::Monk)
            .build()
            .unwrap();
        game.start_day(&[id(4)]).unwrap();
        assert!(game.ability_state(&AbilityRef::root(id(2))).unwrap().used);
    }

    #[test]
    fn test_golem_kills_non_demon() {
        let mut game = day_game(&[RoleKind::Golem, RoleKind::Chef, RoleKind::Imp]);
        assert_eq!(
            game.nominate(Some(id(2)), Some(id(1))),
            Ok(NominationOutcome::Blocked)
        );
        assert!(game.player(id(2)).unwrap().is_ghost());
    }

    #[test]
    fn test_golem_nominating_demon() {
        let mut game = day_game(&[RoleKind::Golem, RoleKind::Chef, RoleKind::Imp]);
        assert!(matches!(
            game.nominate(Some(id(3)), Some(id(1))),
            Ok(NominationOutcome::Started(_))
        ));
        assert!(game.player(id(3)).unwrap().is_alive());
    }

    #[test]
    fn test_banshee_nominates_twice() {
        let mut game = day_game(&[RoleKind::Banshee, RoleKind::Chef, RoleKind::Imp, RoleKind::Monk]);
        game.ability_state_mut(&AbilityRef::root(id(1))).unwrap().active = true;

        game.nominate(Some(id(2)), Some(id(1))).unwrap();
        assert!(game.player(id(1)).unwrap().can_nominate);
        game.cancel_nomination().unwrap();

        game.nominate(Some(id(3)), Some(id(1))).unwrap();
        assert!(!game.player(id(1)).unwrap().can_nominate);
    }

    #[test]
    fn test_screaming_banshee_ghost_nominates() {
        let mut game = Game::builder()
            .player(id(1), RoleKind::Banshee)
            .player(id(2), RoleKind::Chef)
            .player(id(3), RoleKind::Imp)
            .build()
            .unwrap();
        game.ability_state_mut(&AbilityRef::root(id(1))).unwrap().active = true;
        game.start_day(&[id(1)]).unwrap();
        assert!(!game.player(id(1)).unwrap().can_nominate);

        game.open_noms().unwrap();
        assert!(game.player(id(1)).unwrap().can_nominate);
    }

    #[test]
    fn test_exile_open_to_the_dead() {
        let mut game = day_game(&[RoleKind::Chef, RoleKind::Imp, RoleKind::Beggar]);
        game.kill(id(1), false, false).unwrap();
        let outcome = game.nominate(Some(id(3)), Some(id(1))).unwrap();
        assert!(matches!(outcome, NominationOutcome::Started(_)));
        assert!(game.current_vote().unwrap().nomination().is_exile());
    }

    #[test]
    fn test_cancel_restores_eligibility() {
        let mut game = day_game(&[RoleKind::Chef, RoleKind::Imp, RoleKind::Monk]);
        assert_eq!(game.cancel_nomination(), Err(ValidationError::NothingToCancel));

        game.nominate(Some(id(2)), Some(id(1))).unwrap();
        let vote = game.cancel_nomination().unwrap();
        assert!(game.player(id(1)).unwrap().can_nominate);
        assert!(game.player(id(2)).unwrap().can_be_nominated);
        assert!(game.current_day().unwrap().noms_open());
        assert!(game
            .drain_events()
            .contains(&GameEvent::NominationCancelled { vote }));
    }

    #[test]
    fn test_cancel_vote_only_current() {
        let mut game = day_game(&[RoleKind::Chef, RoleKind::Imp, RoleKind::Monk]);
        let NominationOutcome::Started(first) = game.nominate(Some(id(2)), Some(id(1))).unwrap() else {
            panic!("nomination blocked");
        };
        for voter in [3, 1, 2] {
            game.cast_vote(first, id(voter), false, crate::vote::Operator::Voter).unwrap();
        }
        game.nominate(Some(id(3)), Some(id(2))).unwrap();

        assert_eq!(game.cancel_vote(first), Err(ValidationError::NothingToCancel));
        assert_eq!(game.current_day().unwrap().votes().len(), 2);
        assert!(game.current_vote().is_some());
    }

    #[test]
    fn test_end_day() {
        let mut game = day_game(&[RoleKind::Chef, RoleKind::Imp]);
        assert_eq!(game.end_day(), Ok(None));
        assert!(!game.is_day());
        assert_eq!(game.end_day(), Err(ValidationError::NotDay));
        assert_eq!(game.days().len(), 1);
    }
}
