//! Identity types.
//!
//! ## UserId
//!
//! Participants are identified by an opaque key handed to the engine by the
//! roster provider. The engine never interprets it beyond equality and hashing;
//! display names live in the command layer.
//!
//! ## VoteId
//!
//! Every vote gets a game-unique id when its nomination is accepted. Prompts,
//! default-vote timers and pinned announcements are keyed by it, so a vote that
//! was cancelled or already finished can be told apart from the current one.

use serde::{Deserialize, Serialize};

/// Opaque participant identity.
///
/// ```
/// use townsquare::core::UserId;
///
/// let alice = UserId::new(42);
/// assert_eq!(alice.raw(), 42);
/// assert_eq!(format!("{}", alice), "User(42)");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl UserId {
    /// Create a new user ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "User({})", self.0)
    }
}

/// Game-unique vote identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoteId(pub u32);

impl VoteId {
    /// Create a new vote ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for VoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Vote({})", self.0)
    }
}
