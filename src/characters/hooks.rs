//! Hook slots a role may fill.
//!
//! A role is not a type hierarchy: it is a record holding one optional
//! handler per hook kind. Dispatch iterates the populated handlers of every
//! in-play character (and of whatever those characters currently host).
//!
//! Handlers are plain `fn` pointers taking the game and an [`AbilityRef`]
//! naming the ability being asked. They read and write their own bookkeeping
//! through `game.ability_mut(me)`, so no borrow of the character is held
//! while the game is mutated.
//!
//! Every handler checks `game.sober(me)` first and returns its pass-through
//! value when the ability is poisoned.

use serde::{Deserialize, Serialize};

use crate::core::UserId;
use crate::day::Nomination;
use crate::error::ValidationError;
use crate::game::{AbilityRef, Game};
use crate::vote::{Vote, VoteSetup};

/// Resolution order of death hooks. Lower resolves earlier.
///
/// Ties are broken by seating order. Forced kills resolve last so they see
/// the value every protection already adjudicated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeathPriority {
    ProtectsOthers = 1,
    ProtectsSelf = 2,
    KillsSelf = 3,
    KillsOthers = 4,
    Unset = 999,
    ForcesKill = 1000,
}

impl DeathPriority {
    /// Numeric value on the priority scale.
    #[must_use]
    pub const fn value(self) -> u16 {
        self as u16
    }
}

/// Fires after every reseat.
pub type SeatingHook = fn(&mut Game, &AbilityRef);

/// Fires once when a day begins.
pub type DayStartHook = fn(&mut Game, &AbilityRef);

/// Fires when nominations are opened.
pub type NomsCalledHook = fn(&mut Game, &AbilityRef);

/// Threads `proceed` through a nomination. Must return `proceed` unchanged
/// when the rule does not apply.
pub type NominationHook = fn(&mut Game, &AbilityRef, &Nomination, bool) -> bool;

/// Fires once when a day ends.
pub type DayEndHook = fn(&mut Game, &AbilityRef);

/// May rewrite order, weights and majority of a vote being built.
pub type VoteBeginningHook = fn(&Game, &AbilityRef, &mut VoteSetup);

/// Restricts how the owner may vote. Consulted only for the owner's own turns.
pub type VoteHook = fn(&Game, &AbilityRef, &Vote, bool) -> Result<(), ValidationError>;

/// Folds a death decision: receives the target and the value so far.
pub type DeathHook = fn(&mut Game, &AbilityRef, UserId, bool) -> bool;

/// Reports whether the owner's votes are entered twice.
pub type DoubleVoteHook = fn(&Game, &AbilityRef) -> bool;

/// The hook record of a role.
#[derive(Clone, Copy, Debug, Default)]
pub struct RoleHooks {
    pub seating: Option<SeatingHook>,
    pub day_start: Option<DayStartHook>,
    pub noms_called: Option<NomsCalledHook>,
    pub nomination: Option<NominationHook>,
    pub day_end: Option<DayEndHook>,
    pub vote_beginning: Option<VoteBeginningHook>,
    pub vote: Option<VoteHook>,
    pub death: Option<(DeathPriority, DeathHook)>,
    pub double_vote: Option<DoubleVoteHook>,
}

impl RoleHooks {
    /// A role with no adjudicated rules.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_seating(mut self, hook: SeatingHook) -> Self {
        self.seating = Some(hook);
        self
    }

    #[must_use]
    pub fn on_day_start(mut self, hook: DayStartHook) -> Self {
        self.day_start = Some(hook);
        self
    }

    #[must_use]
    pub fn on_noms_called(mut self, hook: NomsCalledHook) -> Self {
        self.noms_called = Some(hook);
        self
    }

    #[must_use]
    pub fn on_nomination(mut self, hook: NominationHook) -> Self {
        self.nomination = Some(hook);
        self
    }

    #[must_use]
    pub fn on_day_end(mut self, hook: DayEndHook) -> Self {
        self.day_end = Some(hook);
        self
    }

    #[must_use]
    pub fn on_vote_beginning(mut self, hook: VoteBeginningHook) -> Self {
        self.vote_beginning = Some(hook);
        self
    }

    #[must_use]
    pub fn on_vote(mut self, hook: VoteHook) -> Self {
        self.vote = Some(hook);
        self
    }

    #[must_use]
    pub fn on_death(mut self, priority: DeathPriority, hook: DeathHook) -> Self {
        self.death = Some((priority, hook));
        self
    }

    #[must_use]
    pub fn votes_twice(mut self, hook: DoubleVoteHook) -> Self {
        self.double_vote = Some(hook);
        self
    }

    /// True when no slot is filled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seating.is_none()
            && self.day_start.is_none()
            && self.noms_called.is_none()
            && self.nomination.is_none()
            && self.day_end.is_none()
            && self.vote_beginning.is_none()
            && self.vote.is_none()
            && self.death.is_none()
            && self.double_vote.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn never_dies(_: &mut Game, _: &AbilityRef, _: UserId, _: bool) -> bool {
        false
    }

    #[test]
    fn test_priority_scale() {
        assert_eq!(DeathPriority::ProtectsOthers.value(), 1);
        assert_eq!(DeathPriority::ProtectsSelf.value(), 2);
        assert_eq!(DeathPriority::KillsSelf.value(), 3);
        assert_eq!(DeathPriority::Unset.value(), 999);
        assert_eq!(DeathPriority::ForcesKill.value(), 1000);
    }

    #[test]
    fn test_priority_ordering() {
        let mut priorities = vec![
            DeathPriority::ForcesKill,
            DeathPriority::Unset,
            DeathPriority::ProtectsSelf,
            DeathPriority::ProtectsOthers,
            DeathPriority::KillsSelf,
        ];
        priorities.sort();
        assert_eq!(
            priorities,
            vec![
                DeathPriority::ProtectsOthers,
                DeathPriority::ProtectsSelf,
                DeathPriority::KillsSelf,
                DeathPriority::Unset,
                DeathPriority::ForcesKill,
            ]
        );
    }

    #[test]
    fn test_builder() {
        let hooks = RoleHooks::none();
        assert!(hooks.is_empty());

        let hooks = hooks.on_death(DeathPriority::ProtectsSelf, never_dies);
        assert!(!hooks.is_empty());
        assert_eq!(hooks.death.map(|(p, _)| p), Some(DeathPriority::ProtectsSelf));
    }
}
