//! The role catalog.
//!
//! Most roles are storyteller-run: the engine only needs their name and team.
//! They are listed here as data. Roles whose rules the engine adjudicates get
//! their hook record from [`RoleKind::hooks`](super::RoleKind::hooks).

use serde::{Deserialize, Serialize};

use super::role::Team;

macro_rules! define_roles {
    ($($variant:ident => $name:literal, $team:ident;)*) => {
        /// Every role the engine knows.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum RoleKind {
            $($variant,)*
        }

        impl RoleKind {
            /// All roles in catalog order.
            pub const ALL: &'static [RoleKind] = &[$(RoleKind::$variant,)*];

            /// Display name.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(RoleKind::$variant => $name,)*
                }
            }

            /// Character type.
            #[must_use]
            pub const fn team(self) -> Team {
                match self {
                    $(RoleKind::$variant => Team::$team,)*
                }
            }
        }
    };
}

define_roles! {
    // Trouble Brewing
    Washerwoman => "Washerwoman", Townsfolk;
    Librarian => "Librarian", Townsfolk;
    Investigator => "Investigator", Townsfolk;
    Chef => "Chef", Townsfolk;
    Empath => "Empath", Townsfolk;
    FortuneTeller => "Fortune Teller", Townsfolk;
    Undertaker => "Undertaker", Townsfolk;
    Monk => "Monk", Townsfolk;
    Ravenkeeper => "Ravenkeeper", Townsfolk;
    Virgin => "Virgin", Townsfolk;
    Slayer => "Slayer", Townsfolk;
    Soldier => "Soldier", Townsfolk;
    Mayor => "Mayor", Townsfolk;
    Butler => "Butler", Outsider;
    Drunk => "Drunk", Outsider;
    Recluse => "Recluse", Outsider;
    Saint => "Saint", Outsider;
    Poisoner => "Poisoner", Minion;
    Spy => "Spy", Minion;
    ScarletWoman => "Scarlet Woman", Minion;
    Baron => "Baron", Minion;
    Imp => "Imp", Demon;

    // Bad Moon Rising
    Grandmother => "Grandmother", Townsfolk;
    Sailor => "Sailor", Townsfolk;
    Chambermaid => "Chambermaid", Townsfolk;
    Exorcist => "Exorcist", Townsfolk;
    Innkeeper => "Innkeeper", Townsfolk;
    Gambler => "Gambler", Townsfolk;
    Gossip => "Gossip", Townsfolk;
    Courtier => "Courtier", Townsfolk;
    Professor => "Professor", Townsfolk;
    Minstrel => "Minstrel", Townsfolk;
    TeaLady => "Tea Lady", Townsfolk;
    Pacifist => "Pacifist", Townsfolk;
    Fool => "Fool", Townsfolk;
    Tinker => "Tinker", Outsider;
    Moonchild => "Moonchild", Outsider;
    Goon => "Goon", Outsider;
    Lunatic => "Lunatic", Outsider;
    Godfather => "Godfather", Minion;
    DevilsAdvocate => "Devil's Advocate", Minion;
    Assassin => "Assassin", Minion;
    Mastermind => "Mastermind", Minion;
    Zombuul => "Zombuul", Demon;
    Pukka => "Pukka", Demon;
    Shabaloth => "Shabaloth", Demon;
    Po => "Po", Demon;

    // Sects & Violets
    Clockmaker => "Clockmaker", Townsfolk;
    Dreamer => "Dreamer", Townsfolk;
    SnakeCharmer => "Snake Charmer", Townsfolk;
    Mathematician => "Mathematician", Townsfolk;
    Flowergirl => "Flowergirl", Townsfolk;
    TownCrier => "Town Crier", Townsfolk;
    Oracle => "Oracle", Townsfolk;
    Savant => "Savant", Townsfolk;
    Seamstress => "Seamstress", Townsfolk;
    Philosopher => "Philosopher", Townsfolk;
    Artist => "Artist", Townsfolk;
    Juggler => "Juggler", Townsfolk;
    Sage => "Sage", Townsfolk;
    Mutant => "Mutant", Outsider;
    Sweetheart => "Sweetheart", Outsider;
    Barber => "Barber", Outsider;
    Klutz => "Klutz", Outsider;
    EvilTwin => "Evil Twin", Minion;
    Witch => "Witch", Minion;
    Cerenovus => "Cerenovus", Minion;
    PitHag => "Pit-Hag", Minion;
    FangGu => "Fang Gu", Demon;
    Vigormortis => "Vigormortis", Demon;
    NoDashii => "No Dashii", Demon;
    Vortox => "Vortox", Demon;

    // Experimental
    Noble => "Noble", Townsfolk;
    BountyHunter => "Bounty Hunter", Townsfolk;
    Pixie => "Pixie", Townsfolk;
    General => "General", Townsfolk;
    Preacher => "Preacher", Townsfolk;
    King => "King", Townsfolk;
    Balloonist => "Balloonist", Townsfolk;
    CultLeader => "Cult Leader", Townsfolk;
    Lycanthrope => "Lycanthrope", Townsfolk;
    Amnesiac => "Amnesiac", Townsfolk;
    Nightwatchman => "Nightwatchman", Townsfolk;
    Engineer => "Engineer", Townsfolk;
    Fisherman => "Fisherman", Townsfolk;
    Huntsman => "Huntsman", Townsfolk;
    Alchemist => "Alchemist", Townsfolk;
    Farmer => "Farmer", Townsfolk;
    Magician => "Magician", Townsfolk;
    Choirboy => "Choirboy", Townsfolk;
    PoppyGrower => "Poppy Grower", Townsfolk;
    Atheist => "Atheist", Townsfolk;
    Cannibal => "Cannibal", Townsfolk;
    Banshee => "Banshee", Townsfolk;
    HighPriestess => "High Priestess", Townsfolk;
    Steward => "Steward", Townsfolk;
    Knight => "Knight", Townsfolk;
    Shugenja => "Shugenja", Townsfolk;
    VillageIdiot => "Village Idiot", Townsfolk;
    Golem => "Golem", Outsider;
    Damsel => "Damsel", Outsider;
    Snitch => "Snitch", Outsider;
    Heretic => "Heretic", Outsider;
    Puzzlemaster => "Puzzlemaster", Outsider;
    Hatter => "Hatter", Outsider;
    PlagueDoctor => "Plague Doctor", Outsider;
    Politician => "Politician", Outsider;
    Ogre => "Ogre", Outsider;
    Zealot => "Zealot", Outsider;
    Goblin => "Goblin", Minion;
    Boomdandy => "Boomdandy", Minion;
    Fearmonger => "Fearmonger", Minion;
    Psychopath => "Psychopath", Minion;
    Widow => "Widow", Minion;
    Harpy => "Harpy", Minion;
    Marionette => "Marionette", Minion;
    Mezepheles => "Mezepheles", Minion;
    OrganGrinder => "Organ Grinder", Minion;
    Vizier => "Vizier", Minion;
    Wraith => "Wraith", Minion;
    Summoner => "Summoner", Minion;
    Boffin => "Boffin", Minion;
    Lleech => "Lleech", Demon;
    AlHadikhia => "Al-Hadikhia", Demon;
    Legion => "Legion", Demon;
    Leviathan => "Leviathan", Demon;
    Riot => "Riot", Demon;
    LilMonsta => "Lil' Monsta", Demon;
    Kazali => "Kazali", Demon;
    Ojo => "Ojo", Demon;
    Yaggababble => "Yaggababble", Demon;
    LordOfTyphon => "Lord of Typhon", Demon;

    // Travelers
    Scapegoat => "Scapegoat", Traveler;
    Gunslinger => "Gunslinger", Traveler;
    Beggar => "Beggar", Traveler;
    Bureaucrat => "Bureaucrat", Traveler;
    Thief => "Thief", Traveler;
    Butcher => "Butcher", Traveler;
    BoneCollector => "Bone Collector", Traveler;
    Harlot => "Harlot", Traveler;
    Barista => "Barista", Traveler;
    Deviant => "Deviant", Traveler;
    Apprentice => "Apprentice", Traveler;
    Matron => "Matron", Traveler;
    Voudon => "Voudon", Traveler;
    Judge => "Judge", Traveler;
    Bishop => "Bishop", Traveler;
    Gangster => "Gangster", Traveler;
    Cacklejack => "Cacklejack", Traveler;
    Gnome => "Gnome", Traveler;
}
