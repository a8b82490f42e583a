//! Hook dispatch.
//!
//! Every dispatch walks the table in seating order and, within a player,
//! walks their ability chain depth first. Handlers are collected before any
//! of them runs, so a handler that reseats or kills does not disturb the
//! traversal. A reference whose ability has since gone away simply finds
//! nothing at its path.

use serde::{Deserialize, Serialize};

use super::Game;
use crate::characters::hooks::{DeathHook, DeathPriority};
use crate::characters::{AbilityPath, AbilityState, Character, RoleHooks};
use crate::core::UserId;
use crate::day::Nomination;
use crate::error::ValidationError;
use crate::vote::{Vote, VoteSetup};

/// Names one ability in play: the player holding it and its path in their
/// hosted chain (empty for the root character).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbilityRef {
    pub owner: UserId,
    pub path: AbilityPath,
}

impl AbilityRef {
    /// The root character of `owner`.
    #[must_use]
    pub fn root(owner: UserId) -> Self {
        Self {
            owner,
            path: AbilityPath::new(),
        }
    }
}

impl Game {
    /// The ability `me` refers to, if it is still in play.
    #[must_use]
    pub fn ability(&self, me: &AbilityRef) -> Option<&Character> {
        self.player(me.owner).ok()?.character.at_path(&me.path)
    }

    pub fn ability_mut(&mut self, me: &AbilityRef) -> Option<&mut Character> {
        self.player_mut(me.owner).ok()?.character.at_path_mut(&me.path)
    }

    #[must_use]
    pub fn ability_state(&self, me: &AbilityRef) -> Option<&AbilityState> {
        self.ability(me).map(Character::state)
    }

    pub fn ability_state_mut(&mut self, me: &AbilityRef) -> Option<&mut AbilityState> {
        self.ability_mut(me).map(Character::state_mut)
    }

    /// True when the ability is in play and not poisoned.
    #[must_use]
    pub fn sober(&self, me: &AbilityRef) -> bool {
        self.ability(me).is_some_and(|c| !c.is_poisoned())
    }

    fn chain_of(&self, owner: UserId, out: &mut Vec<(AbilityRef, RoleHooks)>) {
        let Ok(player) = self.player(owner) else {
            return;
        };
        player
            .character
            .walk(&mut AbilityPath::new(), &mut |path, character| {
                out.push((
                    AbilityRef {
                        owner,
                        path: path.clone(),
                    },
                    character.role().hooks(),
                ));
            });
    }

    /// Every ability in play with its hooks, in dispatch order.
    #[must_use]
    pub fn abilities_in_play(&self) -> Vec<(AbilityRef, RoleHooks)> {
        let mut out = Vec::new();
        for player in self.players() {
            self.chain_of(player.id(), &mut out);
        }
        out
    }

    pub(crate) fn run_seating_hooks(&mut self) {
        for (me, hooks) in self.abilities_in_play() {
            if let Some(hook) = hooks.seating {
                hook(self, &me);
            }
        }
    }

    pub(crate) fn run_day_start_hooks(&mut self) {
        for (me, hooks) in self.abilities_in_play() {
            if let Some(hook) = hooks.day_start {
                hook(self, &me);
            }
        }
    }

    pub(crate) fn run_noms_called_hooks(&mut self) {
        for (me, hooks) in self.abilities_in_play() {
            if let Some(hook) = hooks.noms_called {
                hook(self, &me);
            }
        }
    }

    pub(crate) fn run_day_end_hooks(&mut self) {
        for (me, hooks) in self.abilities_in_play() {
            if let Some(hook) = hooks.day_end {
                hook(self, &me);
            }
        }
    }

    /// Thread `proceed` through every nomination hook.
    ///
    /// No hook is skipped once `proceed` turns false: a later rule may still
    /// need its side effect (a Virgin spending her ability, a Witch's curse).
    pub(crate) fn run_nomination_hooks(&mut self, nomination: &Nomination) -> bool {
        let mut proceed = true;
        for (me, hooks) in self.abilities_in_play() {
            if let Some(hook) = hooks.nomination {
                proceed = hook(self, &me, nomination, proceed);
            }
        }
        proceed
    }

    pub(crate) fn run_vote_beginning_hooks(&self, setup: &mut VoteSetup) {
        for (me, hooks) in self.abilities_in_play() {
            if let Some(hook) = hooks.vote_beginning {
                hook(self, &me, setup);
            }
        }
    }

    /// True when any ability `voter` holds enters their vote twice.
    #[must_use]
    pub fn votes_twice(&self, voter: UserId) -> bool {
        let mut chain = Vec::new();
        self.chain_of(voter, &mut chain);
        chain
            .iter()
            .any(|(me, hooks)| hooks.double_vote.is_some_and(|hook| hook(self, me)))
    }

    /// Ask the voter's own abilities whether this vote is allowed.
    pub(crate) fn check_vote_hooks(&self, vote: &Vote, voter: UserId, yes: bool) -> Result<(), ValidationError> {
        let mut chain = Vec::new();
        self.chain_of(voter, &mut chain);
        for (me, hooks) in &chain {
            if let Some(hook) = hooks.vote {
                hook(self, me, vote, yes)?;
            }
        }
        Ok(())
    }

    /// Death hooks in the order a kill folds through them.
    ///
    /// Each player contributes their chain's hooks as one entry at the
    /// priority their character reports. Entries are stable-sorted, so equal
    /// priorities keep seating order.
    #[must_use]
    pub fn death_resolution_order(&self) -> Vec<(AbilityRef, DeathHook)> {
        let mut entries: Vec<(DeathPriority, Vec<(AbilityRef, DeathHook)>)> = Vec::new();
        for player in self.players() {
            let mut chain = Vec::new();
            self.chain_of(player.id(), &mut chain);
            let hooks: Vec<_> = chain
                .into_iter()
                .filter_map(|(me, hooks)| hooks.death.map(|(_, hook)| (me, hook)))
                .collect();
            if hooks.is_empty() {
                continue;
            }
            entries.push((player.character.death_priority(player.is_alive()), hooks));
        }
        entries.sort_by_key(|(priority, _)| *priority);
        entries.into_iter().flat_map(|(_, hooks)| hooks).collect()
    }
}
