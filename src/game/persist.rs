//! Snapshot and restore.
//!
//! The whole graph (players, characters, days, votes) encodes with bincode.
//! Vote locks, the outbox and pending chained deaths are not part of the
//! snapshot; they come back empty. Prompts that were waiting on a human are
//! lost and resume when the referee calls the next voter again.

use super::Game;
use crate::error::PersistError;

impl Game {
    /// Encode the game.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PersistError> {
        bincode::serialize(self).map_err(PersistError::Encode)
    }

    /// Decode a game.
    ///
    /// # Panics
    ///
    /// If a player's recorded position disagrees with its seat. That can only
    /// come from a corrupted snapshot.
    pub fn from_bytes(bytes: &[u8]) -> Result<Game, PersistError> {
        let game: Game = bincode::deserialize(bytes).map_err(PersistError::Decode)?;
        game.assert_seating();
        tracing::debug!(players = game.player_count(), days = game.days().len(), "game restored");
        Ok(game)
    }
}
