//! The async referee.
//!
//! [`Referee`] owns the single active game and drives it: it runs commands
//! against the game, publishes the events they produce, prompts voters in
//! turn, routes their replies back, and enters default votes when a voter's
//! delay runs out.
//!
//! ## Locking
//!
//! The game sits behind a plain mutex that is never held across an await.
//! Ballots on a vote are serialized through that vote's own async lock,
//! held across validate, commit and the outbound notifications for the
//! commit. Waiting for a human holds no lock; when the wait ends the turn is
//! re-checked before anything is entered.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use townsquare::characters::RoleKind;
//! use townsquare::core::{RefereeConfig, UserId};
//! use townsquare::referee::{NullTopology, Referee, Transport};
//! use townsquare::Game;
//!
//! # async fn run(transport: Arc<dyn Transport>) -> Result<(), townsquare::RefereeError> {
//! let referee = Referee::new(RefereeConfig::new(), transport, Arc::new(NullTopology));
//! let game = Game::builder()
//!     .player(UserId::new(1), RoleKind::Chef)
//!     .player(UserId::new(2), RoleKind::Imp)
//!     .player(UserId::new(3), RoleKind::Monk)
//!     .build()?;
//!
//! referee.start_game(game).await?;
//! referee.command(|game| game.start_day(&[])).await?;
//! referee.command(|game| game.open_noms()).await?;
//! referee.nominate(Some(UserId::new(2)), Some(UserId::new(1))).await?;
//! # Ok(())
//! # }
//! ```

pub mod ports;
mod replies;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use tokio::sync::oneshot;
use tokio::time::Instant;

pub use ports::{Conversation, Intent, NullTopology, Question, Topology, Transport};
use replies::{parse_vote, ReplyRouter};

use crate::core::{DefaultVote, RefereeConfig, SeatRng, UserId, VoteId};
use crate::day::NominationOutcome;
use crate::error::{RefereeError, ValidationError};
use crate::game::{Game, GameEvent};
use crate::vote::{NextStep, Operator, Vote, VoteOutcome};

/// The game the referee is running, if any.
#[derive(Debug, Default)]
pub enum ActiveGame {
    #[default]
    NoGame,
    Running(Box<Game>),
}

impl ActiveGame {
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running(_))
    }

    pub fn get(&self) -> Result<&Game, RefereeError> {
        match self {
            Self::Running(game) => Ok(game),
            Self::NoGame => Err(RefereeError::NoActiveGame),
        }
    }

    pub fn get_mut(&mut self) -> Result<&mut Game, RefereeError> {
        match self {
            Self::Running(game) => Ok(game),
            Self::NoGame => Err(RefereeError::NoActiveGame),
        }
    }
}

struct Shared {
    game: Mutex<ActiveGame>,
    config: Mutex<RefereeConfig>,
    replies: ReplyRouter,
    transport: Arc<dyn Transport>,
    topology: Arc<dyn Topology>,
    next_question: AtomicU32,
}

/// Handle to the referee. Clones share the same game.
#[derive(Clone)]
pub struct Referee {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for Referee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Referee")
            .field("running", &self.is_running())
            .field("pending_replies", &self.shared.replies.pending())
            .finish()
    }
}

impl Referee {
    pub fn new(config: RefereeConfig, transport: Arc<dyn Transport>, topology: Arc<dyn Topology>) -> Self {
        Self {
            shared: Arc::new(Shared {
                game: Mutex::new(ActiveGame::NoGame),
                config: Mutex::new(config),
                replies: ReplyRouter::default(),
                transport,
                topology,
                next_question: AtomicU32::new(0),
            }),
        }
    }

    fn active(&self) -> MutexGuard<'_, ActiveGame> {
        self.shared.game.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn config_guard(&self) -> MutexGuard<'_, RefereeConfig> {
        self.shared.config.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn config(&self) -> RefereeConfig {
        self.config_guard().clone()
    }

    /// Register or clear a user's default vote. Applies to prompts sent
    /// after the call.
    pub fn set_default_vote(&self, user: UserId, vote: Option<DefaultVote>) {
        self.config_guard().set_default_vote(user, vote);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.active().is_running()
    }

    /// Read the running game.
    pub fn read<R>(&self, f: impl FnOnce(&Game) -> R) -> Result<R, RefereeError> {
        Ok(f(self.active().get()?))
    }

    /// Run `f` on the game and take the events it produced.
    fn apply<R, E>(&self, f: impl FnOnce(&mut Game) -> Result<R, E>) -> Result<(R, Vec<GameEvent>), RefereeError>
    where
        RefereeError: From<E>,
    {
        let mut active = self.active();
        let game = active.get_mut()?;
        let result = f(game)?;
        Ok((result, game.drain_events()))
    }

    // =========================================================================
    // Game lifecycle
    // =========================================================================

    /// Make `game` the active game.
    ///
    /// The configured death automation overrides the game's own setting, and
    /// the seating is shuffled when a seed is configured.
    pub async fn start_game(&self, mut game: Game) -> Result<(), RefereeError> {
        let config = self.config();
        game.set_automated_deaths(config.automated_deaths);
        if let Some(seed) = config.seating_seed {
            game.randomize_seating(&mut SeatRng::new(seed));
        }

        let events = {
            let mut active = self.active();
            if active.is_running() {
                return Err(RefereeError::GameAlreadyRunning);
            }
            let events = game.drain_events();
            tracing::info!(players = game.player_count(), "game started");
            *active = ActiveGame::Running(Box::new(game));
            events
        };
        self.publish(events).await;
        Ok(())
    }

    /// Stop running the game and hand it back. Pending prompts are dropped.
    pub fn end_game(&self) -> Result<Game, RefereeError> {
        let previous = std::mem::take(&mut *self.active());
        self.shared.replies.clear();
        match previous {
            ActiveGame::Running(game) => {
                tracing::info!("game ended");
                Ok(*game)
            }
            ActiveGame::NoGame => Err(RefereeError::NoActiveGame),
        }
    }

    /// Snapshot the running game.
    pub fn save(&self) -> Result<Vec<u8>, RefereeError> {
        Ok(self.read(Game::to_bytes)??)
    }

    /// Load a snapshot as the active game and resume any vote it was in.
    pub async fn restore(&self, bytes: &[u8]) -> Result<(), RefereeError> {
        let game = Game::from_bytes(bytes)?;
        {
            let mut active = self.active();
            if active.is_running() {
                return Err(RefereeError::GameAlreadyRunning);
            }
            *active = ActiveGame::Running(Box::new(game));
        }
        tracing::info!("game restored");
        self.call_next().await
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Run a synchronous game command and publish what it changed.
    ///
    /// ```no_run
    /// # async fn run(referee: townsquare::referee::Referee) -> Result<(), townsquare::RefereeError> {
    /// use townsquare::core::UserId;
    ///
    /// let died = referee.command(|game| game.kill(UserId::new(3), false, false)).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn command<R, E>(&self, f: impl FnOnce(&mut Game) -> Result<R, E>) -> Result<R, RefereeError>
    where
        RefereeError: From<E>,
    {
        let (result, events) = self.apply(f)?;
        self.publish(events).await;
        Ok(result)
    }

    /// Nominate and, if the nomination stands, start asking voters.
    pub async fn nominate(
        &self,
        nominee: Option<UserId>,
        nominator: Option<UserId>,
    ) -> Result<NominationOutcome, RefereeError> {
        let outcome = self.command(|game| game.nominate(nominee, nominator)).await?;
        if let NominationOutcome::Started(vote) = outcome {
            tracing::info!(%vote, "voting started");
            self.call_next().await?;
        }
        Ok(outcome)
    }

    /// Enter `voter`'s vote on the current turn.
    ///
    /// Returns the outcome when this vote ended it.
    pub async fn vote(&self, voter: UserId, yes: bool, operator: Operator) -> Result<Option<VoteOutcome>, RefereeError> {
        let vote = self
            .read(|game| game.current_vote().map(Vote::id))?
            .ok_or(ValidationError::NoVoteInProgress)?;
        let outcome = self.commit(vote, voter, yes, operator, None).await?;
        if outcome.is_none() {
            self.call_next().await?;
        }
        Ok(outcome)
    }

    /// Queue a vote. If it is already `voter`'s turn, it is entered now.
    pub async fn preset_vote(&self, voter: UserId, yes: bool) -> Result<(), RefereeError> {
        let current = self
            .command(|game| {
                game.preset_vote(voter, yes)?;
                Ok::<_, ValidationError>(game.current_vote().and_then(Vote::current_voter))
            })
            .await?;
        if current == Some(voter) {
            self.call_next().await?;
        }
        Ok(())
    }

    pub async fn cancel_preset(&self, voter: UserId) -> Result<bool, RefereeError> {
        self.command(|game| game.cancel_preset(voter)).await
    }

    /// Cancel the running nomination and drop every prompt waiting on it.
    ///
    /// Fails with `Conflict` if the vote finished while the cancel waited
    /// for its lock.
    pub async fn cancel_nomination(&self) -> Result<VoteId, RefereeError> {
        let (vote, lock) = self
            .read(|game| game.current_vote().map(|v| (v.id(), v.lock())))?
            .ok_or(ValidationError::NothingToCancel)?;
        let _turn = lock.lock().await;

        let ((), events) = self.apply(|game| {
            if game.current_vote().map(Vote::id) != Some(vote) {
                return Err(RefereeError::Conflict(vote));
            }
            game.cancel_vote(vote).map_err(RefereeError::from)
        })?;
        self.shared.replies.cancel_vote(vote);
        self.publish(events).await;
        Ok(vote)
    }

    // =========================================================================
    // Replies
    // =========================================================================

    /// Route a user's reply to whoever is waiting on it.
    ///
    /// Returns false when nothing is waiting, e.g. the turn already passed.
    pub fn deliver_reply(&self, user: UserId, conversation: Conversation, text: impl Into<String>) -> bool {
        let delivered = self.shared.replies.deliver(user, conversation, text.into());
        if !delivered {
            tracing::debug!(%user, ?conversation, "reply with nobody waiting");
        }
        delivered
    }

    /// Ask `user` a free-text question and wait for the answer.
    pub async fn ask(&self, user: UserId, question: impl Into<String>, timeout: Duration) -> Result<String, RefereeError> {
        let conversation = Conversation::Question(self.shared.next_question.fetch_add(1, Ordering::Relaxed));
        let rx = self.shared.replies.register(user, conversation);
        self.send(Intent::Prompt {
            user,
            conversation,
            question: Question::FreeText(question.into()),
        })
        .await;

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(answer)) => Ok(answer),
            Ok(Err(_)) => Err(RefereeError::Timeout(user)),
            Err(_) => {
                self.shared.replies.cancel(user, conversation);
                tracing::debug!(%user, "question timed out");
                Err(RefereeError::Timeout(user))
            }
        }
    }

    // =========================================================================
    // Voting protocol
    // =========================================================================

    /// Move the current vote forward until it needs a human or ends.
    ///
    /// Presets and barred voters are entered straight away. A prompted voter
    /// is answered from a background task, which continues the vote itself.
    pub fn call_next(&self) -> BoxFuture<'static, Result<(), RefereeError>> {
        let referee = self.clone();
        async move { referee.advance().await }.boxed()
    }

    async fn advance(&self) -> Result<(), RefereeError> {
        loop {
            let (step, _) = self.apply(|game| Ok::<_, ValidationError>(game.next_step()))?;
            let (vote, voter, position, yes, operator) = match step {
                NextStep::Finished => return Ok(()),
                NextStep::Prompt { vote, voter, position } => return self.prompt(vote, voter, position).await,
                NextStep::Preset {
                    vote,
                    voter,
                    position,
                    yes,
                } => (vote, voter, position, yes, Operator::Preset),
                NextStep::Barred { vote, voter, position } => (vote, voter, position, false, Operator::Auto),
            };

            match self.commit(vote, voter, yes, operator, Some(position)).await {
                Ok(Some(_)) => return Ok(()),
                Ok(None) => {}
                Err(err) if err.is_stale() => {
                    tracing::debug!(%vote, %voter, "turn moved on before commit");
                    return Ok(());
                }
                Err(RefereeError::Validation(err)) if operator == Operator::Preset => {
                    tracing::warn!(%vote, %voter, %err, "preset vote rejected");
                    return self.prompt(vote, voter, position).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Commit one ballot under the vote's lock.
    ///
    /// With `at`, the commit only lands if the vote is still on that turn.
    async fn commit(
        &self,
        vote: VoteId,
        voter: UserId,
        yes: bool,
        operator: Operator,
        at: Option<usize>,
    ) -> Result<Option<VoteOutcome>, RefereeError> {
        let lock = self
            .read(|game| game.current_vote().filter(|v| v.id() == vote).map(Vote::lock))?
            .ok_or(RefereeError::Conflict(vote))?;
        let _turn = lock.lock().await;

        let (outcome, events) = self.apply(|game| {
            if let Some(at) = at {
                let position = game.current_vote().filter(|v| v.id() == vote).map(Vote::position);
                if position != Some(at) {
                    return Err(RefereeError::Conflict(vote));
                }
            }
            game.cast_vote(vote, voter, yes, operator)
        })?;
        self.shared.replies.cancel_voter(vote, voter);
        self.publish(events).await;
        Ok(outcome)
    }

    /// Commit and keep the vote going.
    async fn enter(&self, vote: VoteId, voter: UserId, position: usize, yes: bool, operator: Operator) -> Result<(), RefereeError> {
        if self.commit(vote, voter, yes, operator, Some(position)).await?.is_none() {
            self.call_next().await?;
        }
        Ok(())
    }

    async fn prompt(&self, vote: VoteId, voter: UserId, position: usize) -> Result<(), RefereeError> {
        let question = self.read(|game| {
            game.current_vote()
                .filter(|v| v.id() == vote && v.position() == position)
                .map(|v| Question::Vote {
                    vote,
                    nominee: v.nominee(),
                    votes: v.votes(),
                    majority: v.majority(),
                })
        })?;
        let Some(question) = question else {
            return Ok(());
        };

        let conversation = Conversation::Vote { vote, position };
        let rx = self.shared.replies.register(voter, conversation);
        let default = self.config_guard().default_vote_for(voter);
        self.send(Intent::Prompt {
            user: voter,
            conversation,
            question: question.clone(),
        })
        .await;
        tracing::debug!(%vote, %voter, position, default = ?default, "voter prompted");

        tokio::spawn(self.clone().await_vote(voter, vote, position, question, rx, default));
        Ok(())
    }

    /// Wait for a prompted voter, entering their default when it falls due.
    async fn await_vote(
        self,
        voter: UserId,
        vote: VoteId,
        position: usize,
        question: Question,
        mut rx: oneshot::Receiver<String>,
        default: Option<DefaultVote>,
    ) {
        let conversation = Conversation::Vote { vote, position };
        let deadline = default.map(|d| (Instant::now() + d.after, d.yes));

        loop {
            let reply = match deadline {
                Some((deadline, yes)) => match tokio::time::timeout_at(deadline, &mut rx).await {
                    Ok(reply) => reply,
                    Err(_) => {
                        self.shared.replies.cancel(voter, conversation);
                        tracing::info!(%vote, %voter, yes, "default vote entered");
                        let mut result = self.enter(vote, voter, position, yes, Operator::Default).await;
                        if yes && matches!(result, Err(RefereeError::Validation(_))) {
                            result = self.enter(vote, voter, position, false, Operator::Default).await;
                        }
                        log_turn_result(vote, voter, result);
                        return;
                    }
                },
                None => (&mut rx).await,
            };

            // Dropped: the vote moved on or was cancelled.
            let Ok(text) = reply else {
                return;
            };
            let outcome = match parse_vote(&text) {
                Some(yes) => Some(self.enter(vote, voter, position, yes, Operator::Voter).await),
                None => None,
            };
            match outcome {
                None | Some(Err(RefereeError::Validation(_))) => {
                    tracing::debug!(%vote, %voter, reply = %text, "vote reply refused");
                    let still_waiting = self
                        .read(|game| {
                            game.current_vote()
                                .is_some_and(|v| v.id() == vote && v.position() == position)
                        })
                        .unwrap_or(false);
                    if !still_waiting {
                        return;
                    }
                    rx = self.shared.replies.register(voter, conversation);
                    self.send(Intent::Prompt {
                        user: voter,
                        conversation,
                        question: question.clone(),
                    })
                    .await;
                }
                Some(result) => {
                    log_turn_result(vote, voter, result);
                    return;
                }
            }
        }
    }

    // =========================================================================
    // Outbound
    // =========================================================================

    async fn send(&self, intent: Intent) {
        if let Err(err) = self.shared.transport.send(intent).await {
            tracing::warn!(%err, "transport failed");
        }
    }

    /// Announce committed events and bring collaborators in line.
    async fn publish(&self, events: Vec<GameEvent>) {
        for event in events {
            let topology = &self.shared.topology;
            let synced = match &event {
                GameEvent::Died { player, .. } => topology.player_died(*player).await,
                GameEvent::Revived { player } => topology.player_revived(*player).await,
                GameEvent::SeatingChanged { order } => topology.seating_changed(order.clone()).await,
                _ => Ok(()),
            };
            if let Err(err) = synced {
                tracing::warn!(%err, ?event, "topology update failed");
            }

            let follow_up = match &event {
                GameEvent::Nominated { vote, .. } => Some(Intent::Pin { vote: *vote }),
                GameEvent::VoteFinished { vote, .. } | GameEvent::NominationCancelled { vote } => {
                    Some(Intent::Unpin { vote: *vote })
                }
                _ => None,
            };
            self.send(Intent::Announce(event)).await;
            if let Some(intent) = follow_up {
                self.send(intent).await;
            }
        }
    }
}

fn log_turn_result(vote: VoteId, voter: UserId, result: Result<(), RefereeError>) {
    match result {
        Ok(()) => {}
        Err(err) if err.is_stale() => tracing::debug!(%vote, %voter, "turn moved on before commit"),
        Err(err) => tracing::warn!(%vote, %voter, %err, "vote could not be entered"),
    }
}
