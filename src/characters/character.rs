//! Character instances and the hosted-ability chain.
//!
//! A [`Character`] is one role token in play. Composite roles (Philosopher,
//! Apprentice, Cannibal, Alchemist) additionally own the abilities they
//! borrowed, which may themselves be composites. The chain is a plain owned
//! tree; a node is addressed by its path of child indices from the root.
//!
//! ## Poison
//!
//! `poison()` and `unpoison()` broadcast down the tree. A hosted ability
//! never looks at its host, so the flag on each node is authoritative.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::hooks::DeathPriority;
use super::RoleKind;
use crate::core::UserId;
use crate::error::ValidationError;

/// Path of child indices from a player's root character.
pub type AbilityPath = SmallVec<[u8; 4]>;

/// Per-ability bookkeeping.
///
/// One shape serves every adjudicated role; each role documents which fields
/// it reads.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityState {
    /// Chosen player (Monk's protectee, Witch's curse, Butler's master, ...).
    pub target: Option<UserId>,
    /// Further chosen players (Innkeeper's pair, Empath's neighbours).
    pub extra_targets: SmallVec<[UserId; 2]>,
    /// Once-per-game ability spent.
    pub used: bool,
    /// Storyteller-controlled switch (Banshee screaming, Beggar holding a token).
    pub active: bool,
    /// Times the ability fired since it was last reset.
    pub count: u8,
}

/// A role instance in play.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    role: RoleKind,
    poisoned: bool,
    state: AbilityState,
    hosted: Vec<Character>,
}

impl Character {
    /// Fresh, sober instance of `role`.
    #[must_use]
    pub fn new(role: RoleKind) -> Self {
        Self {
            role,
            poisoned: false,
            state: AbilityState::default(),
            hosted: Vec::new(),
        }
    }

    #[must_use]
    pub fn role(&self) -> RoleKind {
        self.role
    }

    #[must_use]
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    #[must_use]
    pub fn is_composite(&self) -> bool {
        self.role.is_composite()
    }

    /// Poison this ability and everything it hosts.
    pub fn poison(&mut self) {
        self.poisoned = true;
        for hosted in &mut self.hosted {
            hosted.poison();
        }
    }

    /// Remove poison from this ability and everything it hosts.
    pub fn unpoison(&mut self) {
        self.poisoned = false;
        for hosted in &mut self.hosted {
            hosted.unpoison();
        }
    }

    /// Reset per-game bookkeeping on this ability and everything it hosts.
    ///
    /// Idempotent. Poison and the hosted chain itself are kept.
    pub fn refresh(&mut self) {
        self.state = AbilityState::default();
        for hosted in &mut self.hosted {
            hosted.refresh();
        }
    }

    #[must_use]
    pub fn state(&self) -> &AbilityState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AbilityState {
        &mut self.state
    }

    /// Abilities hosted directly by this one.
    #[must_use]
    pub fn hosted(&self) -> &[Character] {
        &self.hosted
    }

    /// Host `role` on this composite.
    ///
    /// If a composite is already hosted the call is forwarded into it, so
    /// chains of any depth grow at the tail. The new ability inherits this
    /// node's poison.
    pub fn add_ability(&mut self, role: RoleKind) -> Result<(), ValidationError> {
        if !self.is_composite() {
            return Err(ValidationError::NotComposite(self.role));
        }

        if let Some(nested) = self.hosted.iter_mut().rev().find(|c| c.is_composite()) {
            return nested.add_ability(role);
        }

        let mut ability = Character::new(role);
        if self.poisoned {
            ability.poison();
        }
        self.hosted.push(ability);
        Ok(())
    }

    /// Remove the most recently hosted ability at the tail of the chain.
    ///
    /// Falls back to this node's own last ability when the nested composite
    /// has nothing to give up.
    pub fn clear_ability(&mut self) -> Option<Character> {
        if let Some(nested) = self.hosted.iter_mut().rev().find(|c| c.is_composite()) {
            if let Some(removed) = nested.clear_ability() {
                return Some(removed);
            }
        }
        self.hosted.pop()
    }

    /// Where this character's death hooks sit in the resolution order.
    ///
    /// A composite reports the most urgent priority among what it hosts, or
    /// `Unset` when its player is dead, it is poisoned, or nothing it hosts
    /// has a death hook.
    #[must_use]
    pub fn death_priority(&self, alive: bool) -> DeathPriority {
        if !self.is_composite() {
            return self
                .role
                .hooks()
                .death
                .map_or(DeathPriority::Unset, |(priority, _)| priority);
        }
        if !alive || self.poisoned {
            return DeathPriority::Unset;
        }
        self.hosted
            .iter()
            .map(|c| c.death_priority(alive))
            .filter(|p| *p != DeathPriority::Unset)
            .min()
            .unwrap_or(DeathPriority::Unset)
    }

    /// Ability at `path` below this node.
    #[must_use]
    pub fn at_path(&self, path: &[u8]) -> Option<&Character> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => self.hosted.get(usize::from(*first))?.at_path(rest),
        }
    }

    pub fn at_path_mut(&mut self, path: &[u8]) -> Option<&mut Character> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => self.hosted.get_mut(usize::from(*first))?.at_path_mut(rest),
        }
    }

    /// Visit this node and, while unpoisoned, everything it hosts, depth first.
    ///
    /// Poisoned nodes are visited so their own bookkeeping still runs, but a
    /// poisoned host does not forward to its hosted abilities.
    pub(crate) fn walk(&self, path: &mut AbilityPath, visit: &mut impl FnMut(&AbilityPath, &Character)) {
        visit(path, self);
        if self.poisoned {
            return;
        }
        for (index, hosted) in self.hosted.iter().enumerate() {
            path.push(index as u8);
            hosted.walk(path, visit);
            path.pop();
        }
    }

    /// Roles in the chain, root first.
    #[must_use]
    pub fn chain(&self) -> Vec<RoleKind> {
        let mut roles = vec![self.role];
        for hosted in &self.hosted {
            roles.extend(hosted.chain());
        }
        roles
    }

    /// Storyteller-facing notes about this ability and what it hosts.
    #[must_use]
    pub fn extra_info(&self) -> Option<String> {
        let mut info = String::new();
        let state = &self.state;

        match self.role {
            RoleKind::Monk | RoleKind::Innkeeper if state.target.is_some() || !state.extra_targets.is_empty() => {
                let _ = write!(info, "Protecting: {}", list(state.target.iter().chain(&state.extra_targets)));
            }
            RoleKind::Witch => match state.target {
                Some(cursed) if !state.used => {
                    let _ = write!(info, "Cursed: {}", cursed);
                }
                _ if state.used => info.push_str("Ability lost"),
                _ => {}
            },
            RoleKind::Butler => {
                if let Some(master) = state.target {
                    let _ = write!(info, "Master: {}", master);
                }
            }
            RoleKind::Grandmother => {
                if let Some(grandchild) = state.target {
                    let _ = write!(info, "Grandchild: {}", grandchild);
                }
            }
            RoleKind::Lleech => {
                if let Some(host) = state.target {
                    let _ = write!(info, "Host: {}", host);
                }
            }
            RoleKind::Thief | RoleKind::Bureaucrat | RoleKind::Assassin => {
                if let Some(target) = state.target {
                    let _ = write!(info, "Target: {}", target);
                }
            }
            RoleKind::Empath if !state.extra_targets.is_empty() => {
                let _ = write!(info, "Neighbours: {}", list(state.extra_targets.iter()));
            }
            RoleKind::Banshee if state.active => info.push_str("Screaming"),
            RoleKind::Beggar if state.active => info.push_str("Holding a vote token"),
            RoleKind::Virgin | RoleKind::Golem | RoleKind::Fool | RoleKind::Zombuul if state.used => {
                info.push_str("Ability used");
            }
            _ => {}
        }

        if self.poisoned {
            if !info.is_empty() {
                info.push('\n');
            }
            info.push_str("Poisoned");
        }

        for hosted in &self.hosted {
            if !info.is_empty() {
                info.push('\n');
            }
            let _ = write!(info, "Hosting {}", hosted.role);
            if let Some(nested) = hosted.extra_info() {
                let _ = write!(info, ": {}", nested.replace('\n', "; "));
            }
        }

        (!info.is_empty()).then_some(info)
    }
}

fn list<'a>(users: impl Iterator<Item = &'a UserId>) -> String {
    users.map(ToString::to_string).collect::<Vec<_>>().join(", ")
}
