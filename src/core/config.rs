//! Referee configuration.
//!
//! Hosts configure the referee at startup by providing a `RefereeConfig`:
//! - whether deaths are adjudicated by role hooks or left to the storyteller
//! - per-user default votes (value + delay before it is entered)
//! - a fallback prompt timeout after which an unanswered voter votes no
//! - an optional seed for shuffling the seating at game start
//!
//! The config derives serde so hosts can keep it next to their own settings.

use std::time::Duration;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::UserId;

/// A vote entered on a player's behalf if they have not answered in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultVote {
    /// The value entered when the delay runs out.
    pub yes: bool,
    /// How long to wait for the player before entering it.
    pub after: Duration,
}

impl DefaultVote {
    /// Create a default vote.
    #[must_use]
    pub const fn new(yes: bool, after: Duration) -> Self {
        Self { yes, after }
    }
}

/// Complete referee configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RefereeConfig {
    /// Run death hooks when a player is killed. When false, every kill succeeds.
    pub automated_deaths: bool,

    /// Wait this long for an unanswered voter before entering "no".
    ///
    /// Per-user default votes take precedence. `None` waits until the voter
    /// acts or the vote is cancelled.
    pub prompt_timeout: Option<Duration>,

    /// Per-user default votes.
    pub default_votes: FxHashMap<UserId, DefaultVote>,

    /// Shuffle seating with this seed when a game starts.
    pub seating_seed: Option<u64>,
}

impl Default for RefereeConfig {
    fn default() -> Self {
        Self {
            automated_deaths: true,
            prompt_timeout: None,
            default_votes: FxHashMap::default(),
            seating_seed: None,
        }
    }
}

impl RefereeConfig {
    /// Create a configuration with automated deaths and no timers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable automated death resolution.
    #[must_use]
    pub fn with_automated_deaths(mut self, enabled: bool) -> Self {
        self.automated_deaths = enabled;
        self
    }

    /// Set the fallback prompt timeout.
    #[must_use]
    pub fn with_prompt_timeout(mut self, timeout: Duration) -> Self {
        self.prompt_timeout = Some(timeout);
        self
    }

    /// Register a default vote for a user.
    #[must_use]
    pub fn with_default_vote(mut self, user: UserId, yes: bool, after: Duration) -> Self {
        self.default_votes.insert(user, DefaultVote::new(yes, after));
        self
    }

    /// Shuffle seating with a fixed seed at game start.
    #[must_use]
    pub fn with_seating_seed(mut self, seed: u64) -> Self {
        self.seating_seed = Some(seed);
        self
    }

    /// Register or replace a default vote at runtime.
    pub fn set_default_vote(&mut self, user: UserId, vote: Option<DefaultVote>) {
        match vote {
            Some(vote) => {
                self.default_votes.insert(user, vote);
            }
            None => {
                self.default_votes.remove(&user);
            }
        }
    }

    /// The vote to enter for `user` if they stay silent, and when.
    ///
    /// Falls back to "no" after `prompt_timeout` when the user has no
    /// default of their own.
    #[must_use]
    pub fn default_vote_for(&self, user: UserId) -> Option<DefaultVote> {
        self.default_votes
            .get(&user)
            .copied()
            .or_else(|| self.prompt_timeout.map(|after| DefaultVote::new(false, after)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RefereeConfig::new();
        assert!(config.automated_deaths);
        assert!(config.prompt_timeout.is_none());
        assert!(config.default_vote_for(UserId::new(1)).is_none());
    }

    #[test]
    fn test_builder() {
        let config = RefereeConfig::new()
            .with_automated_deaths(false)
            .with_prompt_timeout(Duration::from_secs(60))
            .with_default_vote(UserId::new(1), true, Duration::from_secs(5))
            .with_seating_seed(9);

        assert!(!config.automated_deaths);
        assert_eq!(config.seating_seed, Some(9));
        assert_eq!(
            config.default_vote_for(UserId::new(1)),
            Some(DefaultVote::new(true, Duration::from_secs(5)))
        );
    }

    #[test]
    fn test_prompt_timeout_fallback_is_no() {
        let config = RefereeConfig::new().with_prompt_timeout(Duration::from_secs(30));
        let fallback = config.default_vote_for(UserId::new(2)).unwrap();
        assert!(!fallback.yes);
        assert_eq!(fallback.after, Duration::from_secs(30));
    }

    #[test]
    fn test_set_default_vote() {
        let mut config = RefereeConfig::new();
        let user = UserId::new(4);

        config.set_default_vote(user, Some(DefaultVote::new(true, Duration::from_secs(1))));
        assert!(config.default_vote_for(user).is_some());

        config.set_default_vote(user, None);
        assert!(config.default_vote_for(user).is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = RefereeConfig::new().with_default_vote(UserId::new(1), false, Duration::from_millis(500));
        let json = serde_json::to_string(&config).unwrap();
        let restored: RefereeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.default_votes, config.default_votes);
    }
}
