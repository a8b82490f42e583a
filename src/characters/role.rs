//! Teams, alignments and the adjudicated hook table.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::hooks::{DeathPriority, RoleHooks};
use super::rules;
use super::RoleKind;
use crate::error::ValidationError;

/// Character type printed on the token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Townsfolk,
    Outsider,
    Minion,
    Demon,
    Traveler,
}

impl Team {
    /// Alignment a character of this type starts with.
    ///
    /// Travelers are seated good; the storyteller changes their alignment
    /// explicitly when they are evil.
    #[must_use]
    pub const fn default_alignment(self) -> Alignment {
        match self {
            Team::Townsfolk | Team::Outsider | Team::Traveler => Alignment::Good,
            Team::Minion | Team::Demon => Alignment::Evil,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Team::Townsfolk => "Townsfolk",
            Team::Outsider => "Outsider",
            Team::Minion => "Minion",
            Team::Demon => "Demon",
            Team::Traveler => "Traveler",
        };
        f.write_str(name)
    }
}

/// Which side a player wins with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    Good,
    Evil,
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alignment::Good => f.write_str("good"),
            Alignment::Evil => f.write_str("evil"),
        }
    }
}

impl RoleKind {
    /// Hook record for this role.
    ///
    /// Storyteller-run roles return an empty record.
    #[must_use]
    pub fn hooks(self) -> RoleHooks {
        use DeathPriority::*;

        let hooks = RoleHooks::none();
        match self {
            RoleKind::Virgin => hooks.on_nomination(rules::virgin_nomination),
            RoleKind::Witch => hooks
                .on_day_start(rules::witch_day_start)
                .on_nomination(rules::witch_nomination)
                .on_day_end(rules::witch_day_end),
            RoleKind::Golem => hooks.on_nomination(rules::golem_nomination),
            RoleKind::Banshee => hooks
                .on_noms_called(rules::banshee_noms_called)
                .on_nomination(rules::banshee_nomination)
                .on_day_end(rules::banshee_day_end)
                .votes_twice(rules::banshee_double_vote),
            RoleKind::TeaLady => hooks.on_death(ProtectsOthers, rules::tea_lady_death),
            RoleKind::Monk => hooks.on_death(ProtectsOthers, rules::monk_death),
            RoleKind::Innkeeper => hooks.on_death(ProtectsOthers, rules::innkeeper_death),
            RoleKind::Fool => hooks.on_death(ProtectsSelf, rules::fool_death),
            RoleKind::Sailor => hooks.on_death(ProtectsSelf, rules::sailor_death),
            RoleKind::Zombuul => hooks.on_death(ProtectsSelf, rules::zombuul_death),
            RoleKind::Grandmother => hooks.on_death(KillsSelf, rules::grandmother_death),
            RoleKind::Lleech => hooks.on_death(KillsSelf, rules::lleech_death),
            RoleKind::Assassin => hooks.on_death(ForcesKill, rules::assassin_death),
            RoleKind::Empath => hooks.on_seating(rules::empath_seating),
            RoleKind::Butler => hooks.on_vote(rules::butler_vote),
            RoleKind::Thief => hooks.on_vote_beginning(rules::thief_vote_beginning),
            RoleKind::Bureaucrat => hooks.on_vote_beginning(rules::bureaucrat_vote_beginning),
            RoleKind::Beggar => hooks.on_vote_beginning(rules::beggar_vote_beginning),
            RoleKind::Voudon => hooks.on_vote_beginning(rules::voudon_vote_beginning),
            _ => hooks,
        }
    }

    /// True for roles that host a borrowed ability.
    #[must_use]
    pub const fn is_composite(self) -> bool {
        matches!(
            self,
            RoleKind::Philosopher | RoleKind::Apprentice | RoleKind::Cannibal | RoleKind::Alchemist
        )
    }

    /// Alignment a player with this role starts with.
    #[must_use]
    pub const fn default_alignment(self) -> Alignment {
        self.team().default_alignment()
    }

    /// Look a role up by display name.
    ///
    /// Matching ignores case, spaces and punctuation, so `"tea lady"`,
    /// `"TeaLady"` and `"Tea-Lady"` all resolve.
    pub fn from_name(name: &str) -> Result<RoleKind, ValidationError> {
        let wanted = normalize(name);
        RoleKind::ALL
            .iter()
            .copied()
            .find(|role| normalize(role.name()) == wanted)
            .ok_or_else(|| ValidationError::UnknownRole(name.to_string()))
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(RoleKind::from_name("tea lady"), Ok(RoleKind::TeaLady));
        assert_eq!(RoleKind::from_name("TeaLady"), Ok(RoleKind::TeaLady));
        assert_eq!(RoleKind::from_name("devils advocate"), Ok(RoleKind::DevilsAdvocate));
        assert_eq!(RoleKind::from_name("pit hag"), Ok(RoleKind::PitHag));
        assert_eq!(
            RoleKind::from_name("jester"),
            Err(ValidationError::UnknownRole("jester".to_string()))
        );
    }

    #[test]
    fn test_name_round_trip() {
        for role in RoleKind::ALL {
            assert_eq!(RoleKind::from_name(role.name()), Ok(*role));
        }
    }

    #[test]
    fn test_default_alignment() {
        assert_eq!(RoleKind::Chef.default_alignment(), Alignment::Good);
        assert_eq!(RoleKind::Drunk.default_alignment(), Alignment::Good);
        assert_eq!(RoleKind::Baron.default_alignment(), Alignment::Evil);
        assert_eq!(RoleKind::Imp.default_alignment(), Alignment::Evil);
        assert_eq!(RoleKind::Gunslinger.default_alignment(), Alignment::Good);
    }

    #[test]
    fn test_storyteller_roles_have_no_hooks() {
        assert!(RoleKind::Chef.hooks().is_empty());
        assert!(RoleKind::Imp.hooks().is_empty());
        assert!(RoleKind::Philosopher.hooks().is_empty());
    }

    #[test]
    fn test_adjudicated_roles() {
        assert!(RoleKind::Virgin.hooks().nomination.is_some());
        assert_eq!(
            RoleKind::Assassin.hooks().death.map(|(p, _)| p),
            Some(DeathPriority::ForcesKill)
        );
        assert_eq!(
            RoleKind::TeaLady.hooks().death.map(|(p, _)| p),
            Some(DeathPriority::ProtectsOthers)
        );
        assert!(RoleKind::Banshee.hooks().double_vote.is_some());
        assert!(RoleKind::Voudon.hooks().vote_beginning.is_some());
    }

    #[test]
    fn test_composites() {
        assert!(RoleKind::Philosopher.is_composite());
        assert!(RoleKind::Apprentice.is_composite());
        assert!(RoleKind::Cannibal.is_composite());
        assert!(!RoleKind::Virgin.is_composite());
    }
}
