//! Kill, revive and execute.

use crate::core::UserId;
use crate::error::ValidationError;
use crate::game::{Game, GameEvent};

impl Game {
    /// Try to kill `target`. Returns whether they died.
    ///
    /// With automated deaths on, the decision folds through every death hook
    /// in resolution order. A forced kill ghosts the target whatever the
    /// hooks decided. `suppress` keeps the death out of public announcements.
    ///
    /// Deaths the hooks chain onto this one are resolved afterwards, and only
    /// if the target actually died. Killing a ghost does nothing.
    pub fn kill(&mut self, target: UserId, suppress: bool, force: bool) -> Result<bool, ValidationError> {
        if self.player(target)?.is_ghost() {
            return Ok(false);
        }

        let outer = std::mem::take(&mut self.pending_deaths);
        let dies = if self.automated_deaths() {
            let mut dies = true;
            for (me, hook) in self.death_resolution_order() {
                dies = hook(self, &me, target, dies);
            }
            dies
        } else {
            true
        };
        let chained = std::mem::replace(&mut self.pending_deaths, outer);

        if !dies && !force {
            tracing::info!(%target, "death prevented");
            return Ok(false);
        }

        self.player_mut(target)?.die();
        tracing::info!(%target, forced = force && !dies, "player died");
        self.emit(GameEvent::Died {
            player: target,
            announce: !suppress,
        });

        for follower in chained {
            tracing::debug!(%target, %follower, "chained death");
            self.kill(follower, suppress, false)?;
        }
        Ok(true)
    }

    /// Bring a ghost back to life.
    pub fn revive(&mut self, target: UserId) -> Result<(), ValidationError> {
        let player = self.player_mut(target)?;
        if player.is_alive() {
            return Ok(());
        }
        player.revive();
        tracing::info!(%target, "player revived");
        self.emit(GameEvent::Revived { player: target });
        Ok(())
    }

    /// Execute `target`. Nominations close for the rest of the day.
    pub fn execute(&mut self, target: UserId, force: bool) -> Result<bool, ValidationError> {
        self.player(target)?;
        self.current_day_mut()?;

        let died = self.kill(target, false, force)?;
        let day = self.current_day_mut()?;
        day.noms_open = false;
        day.executed = Some(target);
        day.about_to_die = None;
        day.tied_votes = None;

        tracing::info!(%target, died, "execution");
        self.emit(GameEvent::Executed { player: target, died });
        Ok(died)
    }

    /// Chain a death onto the kill being adjudicated.
    pub(crate) fn queue_death(&mut self, follower: UserId) {
        if !self.pending_deaths.contains(&follower) {
            self.pending_deaths.push(follower);
        }
    }
}
