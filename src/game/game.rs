//! The game aggregate.
//!
//! ## Game
//!
//! Root of the state graph:
//! - Players in seating order (a player's `position` is its index)
//! - Whisper mode
//! - Day records, newest last
//! - Outbox of [`GameEvent`]s for the referee
//!
//! `Game` is a synchronous state machine. Every operation validates before
//! it mutates; a returned `ValidationError` means nothing changed.
//!
//! Days live in an `im::Vector` so cloning a game for a snapshot or a bench
//! iteration shares finished days instead of copying them.

use im::Vector;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::player::Player;
use crate::characters::{Alignment, Character, RoleKind, Team};
use crate::core::{SeatRng, UserId, VoteId};
use crate::day::Day;
use crate::error::ValidationError;

/// Who may whisper to whom.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WhisperMode {
    /// Any player to any player.
    #[default]
    All,
    /// Only to the players seated directly either side.
    Neighbors,
    /// Only to the storytellers.
    Storytellers,
}

/// The active game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Game {
    players: Vec<Player>,
    whisper_mode: WhisperMode,
    days: Vector<Day>,
    is_day: bool,
    automated_deaths: bool,
    next_vote: u32,

    /// Deaths chained by hooks while a kill is being adjudicated.
    #[serde(skip)]
    pub(crate) pending_deaths: Vec<UserId>,

    #[serde(skip)]
    outbox: Vec<GameEvent>,
}

impl Game {
    /// Start building a game.
    #[must_use]
    pub fn builder() -> GameBuilder {
        GameBuilder::new()
    }

    // === Players ===

    /// Players in seating order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: UserId) -> Result<&Player, ValidationError> {
        self.players
            .iter()
            .find(|p| p.id() == id)
            .ok_or(ValidationError::UnknownPlayer(id))
    }

    pub(crate) fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    pub fn player_mut(&mut self, id: UserId) -> Result<&mut Player, ValidationError> {
        self.players
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or(ValidationError::UnknownPlayer(id))
    }

    #[must_use]
    pub fn contains(&self, id: UserId) -> bool {
        self.players.iter().any(|p| p.id() == id)
    }

    /// Identities in seating order.
    #[must_use]
    pub fn seating(&self) -> Vec<UserId> {
        self.players.iter().map(Player::id).collect()
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_alive()).count()
    }

    /// Nearest living players to the left and right of `id`.
    ///
    /// Both sides are the same player when only one other player lives.
    /// `None` when nobody else is alive or `id` is not seated.
    #[must_use]
    pub fn living_neighbors(&self, id: UserId) -> Option<(UserId, UserId)> {
        let seat = self.players.iter().position(|p| p.id() == id)?;
        let n = self.players.len();

        let left = (1..n)
            .map(|step| &self.players[(seat + n - step) % n])
            .find(|p| p.is_alive())?;
        let right = (1..n)
            .map(|step| &self.players[(seat + step) % n])
            .find(|p| p.is_alive())?;
        Some((left.id(), right.id()))
    }

    // === Days ===

    #[must_use]
    pub fn is_day(&self) -> bool {
        self.is_day
    }

    /// Every day so far, oldest first.
    #[must_use]
    pub fn days(&self) -> &Vector<Day> {
        &self.days
    }

    /// The day in progress.
    #[must_use]
    pub fn current_day(&self) -> Option<&Day> {
        if self.is_day {
            self.days.back()
        } else {
            None
        }
    }

    pub(crate) fn current_day_mut(&mut self) -> Result<&mut Day, ValidationError> {
        if !self.is_day {
            return Err(ValidationError::NotDay);
        }
        self.days.back_mut().ok_or(ValidationError::NotDay)
    }

    pub(crate) fn begin_day(&mut self) -> usize {
        let number = self.days.len() + 1;
        self.days.push_back(Day::new(number));
        self.is_day = true;
        number
    }

    pub(crate) fn finish_day(&mut self) {
        self.is_day = false;
    }

    pub(crate) fn next_vote_id(&mut self) -> VoteId {
        self.next_vote += 1;
        VoteId::new(self.next_vote)
    }

    // === Settings ===

    #[must_use]
    pub fn automated_deaths(&self) -> bool {
        self.automated_deaths
    }

    pub fn set_automated_deaths(&mut self, enabled: bool) {
        self.automated_deaths = enabled;
    }

    #[must_use]
    pub fn whisper_mode(&self) -> WhisperMode {
        self.whisper_mode
    }

    pub fn set_whisper_mode(&mut self, mode: WhisperMode) {
        if self.whisper_mode != mode {
            self.whisper_mode = mode;
            self.emit(GameEvent::WhisperModeChanged { mode });
        }
    }

    /// Check whether `from` may whisper to `to` right now.
    pub fn can_whisper(&self, from: UserId, to: UserId) -> Result<(), ValidationError> {
        let sender = self.player(from)?;
        let receiver = self.player(to)?;

        if self.current_day().is_some_and(|day| !day.pms_open()) {
            return Err(ValidationError::PmsClosed);
        }

        let allowed = match self.whisper_mode {
            WhisperMode::All => true,
            WhisperMode::Neighbors => {
                let n = self.players.len();
                let (a, b) = (sender.position(), receiver.position());
                (a + 1) % n == b || (b + 1) % n == a
            }
            WhisperMode::Storytellers => false,
        };
        if allowed {
            Ok(())
        } else {
            Err(ValidationError::WhisperBlocked { from, to })
        }
    }

    // === Seating ===

    /// Reseat every player in `order`.
    ///
    /// `order` must name every seated player exactly once. Positions are
    /// re-indexed and seating hooks fire.
    pub fn reseat(&mut self, order: &[UserId]) -> Result<(), ValidationError> {
        let distinct: FxHashSet<UserId> = order.iter().copied().collect();
        if order.len() != self.players.len()
            || distinct.len() != order.len()
            || !self.players.iter().all(|p| distinct.contains(&p.id()))
        {
            return Err(ValidationError::InvalidSeating);
        }
        self.seat_in_order(order);
        Ok(())
    }

    /// Shuffle the seating with `rng`.
    pub fn randomize_seating(&mut self, rng: &mut SeatRng) {
        let mut order = self.seating();
        rng.shuffle(&mut order);
        self.seat_in_order(&order);
    }

    fn seat_in_order(&mut self, order: &[UserId]) {
        self.players
            .sort_by_key(|p| order.iter().position(|id| *id == p.id()));
        self.reindex();
        self.run_seating_hooks();
        tracing::debug!(players = order.len(), "seating changed");
        self.emit(GameEvent::SeatingChanged { order: self.seating() });
    }

    fn reindex(&mut self) {
        for (position, player) in self.players.iter_mut().enumerate() {
            player.set_position(position);
        }
    }

    /// Panic if any player's recorded position disagrees with its seat.
    pub fn assert_seating(&self) {
        for (seat, player) in self.players.iter().enumerate() {
            assert_eq!(
                player.position(),
                seat,
                "{} records position {} but sits at {}",
                player.id(),
                player.position(),
                seat
            );
        }
    }

    // === Roster ===

    /// Seat a traveler at `position` (clamped to the end of the table).
    pub fn add_traveler(
        &mut self,
        id: UserId,
        role: RoleKind,
        alignment: Alignment,
        position: usize,
    ) -> Result<(), ValidationError> {
        if self.contains(id) {
            return Err(ValidationError::DuplicatePlayer(id));
        }
        if role.team() != Team::Traveler {
            return Err(ValidationError::NotTraveler(id));
        }

        let mut player = Player::new(id, role);
        player.alignment = alignment;
        let position = position.min(self.players.len());
        self.players.insert(position, player);
        self.reindex();

        tracing::info!(player = %id, %role, position, "traveler joined");
        self.emit(GameEvent::TravelerJoined { player: id, role });
        self.run_seating_hooks();
        self.emit(GameEvent::SeatingChanged { order: self.seating() });
        Ok(())
    }

    /// Remove a traveler from the table.
    pub fn remove_traveler(&mut self, id: UserId) -> Result<Player, ValidationError> {
        if !self.player(id)?.is_traveler {
            return Err(ValidationError::NotTraveler(id));
        }
        if self.current_vote().is_some() {
            return Err(ValidationError::VoteInProgress);
        }

        let seat = self.player(id)?.position();
        let player = self.players.remove(seat);
        self.reindex();

        tracing::info!(player = %id, "traveler left");
        self.emit(GameEvent::TravelerLeft { player: id });
        self.run_seating_hooks();
        self.emit(GameEvent::SeatingChanged { order: self.seating() });
        Ok(player)
    }

    /// Replace a player's character with a fresh instance of `role`.
    pub fn change_role(&mut self, id: UserId, role: RoleKind) -> Result<(), ValidationError> {
        let player = self.player_mut(id)?;
        player.character = Character::new(role);

        tracing::info!(player = %id, %role, "role changed");
        self.emit(GameEvent::RoleChanged { player: id, role });
        self.run_seating_hooks();
        Ok(())
    }

    pub fn change_alignment(&mut self, id: UserId, alignment: Alignment) -> Result<(), ValidationError> {
        self.player_mut(id)?.alignment = alignment;
        tracing::info!(player = %id, %alignment, "alignment changed");
        self.emit(GameEvent::AlignmentChanged { player: id, alignment });
        Ok(())
    }

    // === Abilities ===

    /// Poison a player's character and everything it hosts.
    pub fn poison(&mut self, id: UserId) -> Result<(), ValidationError> {
        self.player_mut(id)?.character.poison();
        tracing::debug!(player = %id, "poisoned");
        Ok(())
    }

    pub fn unpoison(&mut self, id: UserId) -> Result<(), ValidationError> {
        self.player_mut(id)?.character.unpoison();
        tracing::debug!(player = %id, "unpoisoned");
        Ok(())
    }

    /// Give a composite character another borrowed ability.
    pub fn add_ability(&mut self, id: UserId, role: RoleKind) -> Result<(), ValidationError> {
        self.player_mut(id)?.character.add_ability(role)?;
        tracing::info!(player = %id, %role, "ability added");
        self.run_seating_hooks();
        Ok(())
    }

    /// Take back the most recently borrowed ability.
    pub fn clear_ability(&mut self, id: UserId) -> Result<Option<Character>, ValidationError> {
        let removed = self.player_mut(id)?.character.clear_ability();
        if let Some(ability) = &removed {
            tracing::info!(player = %id, role = %ability.role(), "ability cleared");
        }
        Ok(removed)
    }

    // === Events ===

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.outbox.push(event);
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbox)
    }
}

/// Builder for [`Game`].
///
/// ```
/// use townsquare::characters::RoleKind;
/// use townsquare::core::UserId;
/// use townsquare::game::Game;
///
/// let game = Game::builder()
///     .player(UserId::new(1), RoleKind::Chef)
///     .player(UserId::new(2), RoleKind::Imp)
///     .player(UserId::new(3), RoleKind::Virgin)
///     .build()
///     .unwrap();
///
/// assert_eq!(game.player_count(), 3);
/// assert_eq!(game.alive_count(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct GameBuilder {
    players: Vec<Player>,
    automated_deaths: bool,
}

impl Default for GameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GameBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            players: Vec::new(),
            automated_deaths: true,
        }
    }

    /// Seat `id` as `role` with the role's default alignment.
    #[must_use]
    pub fn player(mut self, id: UserId, role: RoleKind) -> Self {
        self.players.push(Player::new(id, role));
        self
    }

    /// Seat `id` as `role` with an explicit alignment.
    #[must_use]
    pub fn player_with_alignment(mut self, id: UserId, role: RoleKind, alignment: Alignment) -> Self {
        let mut player = Player::new(id, role);
        player.alignment = alignment;
        self.players.push(player);
        self
    }

    #[must_use]
    pub fn automated_deaths(mut self, enabled: bool) -> Self {
        self.automated_deaths = enabled;
        self
    }

    /// Seat everyone, refresh every character and fire seating hooks.
    pub fn build(self) -> Result<Game, ValidationError> {
        if self.players.is_empty() {
            return Err(ValidationError::InvalidSeating);
        }
        let mut seen = FxHashSet::default();
        for player in &self.players {
            if !seen.insert(player.id()) {
                return Err(ValidationError::DuplicatePlayer(player.id()));
            }
        }

        let mut game = Game {
            players: self.players,
            whisper_mode: WhisperMode::default(),
            days: Vector::new(),
            is_day: false,
            automated_deaths: self.automated_deaths,
            next_vote: 0,
            pending_deaths: Vec::new(),
            outbox: Vec::new(),
        };
        for player in &mut game.players {
            player.character.refresh();
        }
        let order = game.seating();
        game.seat_in_order(&order);
        Ok(game)
    }
}
