//! Referee tests: prompts, replies, default votes and concurrency.
//!
//! A recording transport forwards every intent to a channel so each test can
//! follow the conversation the referee has with its players.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use townsquare::characters::RoleKind;
use townsquare::core::{RefereeConfig, UserId};
use townsquare::referee::{Conversation, Intent, NullTopology, Question, Referee, Transport};
use townsquare::{Game, GameEvent, NominationOutcome, Operator, TransportError, VoteOutcome};

fn id(n: u64) -> UserId {
    UserId::new(n)
}

struct Recorder {
    tx: mpsc::UnboundedSender<Intent>,
}

#[async_trait]
impl Transport for Recorder {
    async fn send(&self, intent: Intent) -> Result<(), TransportError> {
        self.tx.send(intent).map_err(|_| TransportError::Unavailable)
    }
}

fn referee(config: RefereeConfig) -> (Referee, mpsc::UnboundedReceiver<Intent>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let (tx, rx) = mpsc::unbounded_channel();
    let referee = Referee::new(config, Arc::new(Recorder { tx }), Arc::new(NullTopology));
    (referee, rx)
}

fn game(players: u64) -> Game {
    let mut builder = Game::builder();
    for n in 1..=players {
        builder = builder.player(id(n), RoleKind::Chef);
    }
    builder.build().unwrap()
}

/// Start a day with nominations open and nominate seat 2 by seat 1.
/// Voting order is then 3, 4, ..., 1, 2.
async fn start_vote(referee: &Referee, players: u64) {
    referee.start_game(game(players)).await.unwrap();
    referee.command(|game| game.start_day(&[])).await.unwrap();
    referee.command(|game| game.open_noms()).await.unwrap();
    let outcome = referee.nominate(Some(id(2)), Some(id(1))).await.unwrap();
    assert!(matches!(outcome, NominationOutcome::Started(_)));
}

/// Skip ahead to the next prompt.
async fn next_prompt(rx: &mut mpsc::UnboundedReceiver<Intent>) -> (UserId, Conversation, Question) {
    loop {
        match rx.recv().await.expect("transport closed") {
            Intent::Prompt {
                user,
                conversation,
                question,
            } => return (user, conversation, question),
            _ => continue,
        }
    }
}

/// Skip ahead to the announcement of a finished vote.
async fn next_outcome(rx: &mut mpsc::UnboundedReceiver<Intent>) -> VoteOutcome {
    loop {
        if let Intent::Announce(GameEvent::VoteFinished { outcome, .. }) =
            rx.recv().await.expect("transport closed")
        {
            return outcome;
        }
    }
}

// =============================================================================
// Prompts and replies
// =============================================================================

/// Replies walk the vote round the table to its outcome.
#[tokio::test]
async fn test_vote_by_replies() {
    let (referee, mut rx) = referee(RefereeConfig::new());
    start_vote(&referee, 4).await;

    for (expected, answer) in [(3, "yes"), (4, "y"), (1, "no"), (2, "n")] {
        let (user, conversation, _) = next_prompt(&mut rx).await;
        assert_eq!(user, id(expected));
        assert!(referee.deliver_reply(user, conversation, answer));
    }

    assert_eq!(next_outcome(&mut rx).await, VoteOutcome::Passed);
    let about_to_die = referee
        .read(|game| game.current_day().unwrap().about_to_die().copied())
        .unwrap();
    assert_eq!(about_to_die.map(|a| a.nominee), Some(id(2)));
}

/// The prompt carries the vote's running state.
#[tokio::test]
async fn test_prompt_describes_vote() {
    let (referee, mut rx) = referee(RefereeConfig::new());
    start_vote(&referee, 5).await;

    let (_, conversation, question) = next_prompt(&mut rx).await;
    assert!(matches!(conversation, Conversation::Vote { position: 0, .. }));
    assert!(matches!(
        question,
        Question::Vote { nominee: Some(nominee), votes: 0, majority: 3, .. } if nominee == id(2)
    ));
}

/// A reply nobody can read is asked again.
#[tokio::test]
async fn test_unreadable_reply_reprompts() {
    let (referee, mut rx) = referee(RefereeConfig::new());
    start_vote(&referee, 4).await;

    let (user, conversation, _) = next_prompt(&mut rx).await;
    assert!(referee.deliver_reply(user, conversation, "perhaps"));

    let (again, same, _) = next_prompt(&mut rx).await;
    assert_eq!((again, same), (user, conversation));
    assert!(referee.deliver_reply(user, conversation, "no"));

    let (next, _, _) = next_prompt(&mut rx).await;
    assert_eq!(next, id(4));
}

/// A reply for a turn that already passed goes nowhere.
#[tokio::test]
async fn test_late_reply_rejected() {
    let (referee, mut rx) = referee(RefereeConfig::new());
    start_vote(&referee, 4).await;

    let (user, conversation, _) = next_prompt(&mut rx).await;
    referee.vote(user, true, Operator::Storyteller).await.unwrap();
    assert!(!referee.deliver_reply(user, conversation, "no"));

    let history = referee
        .read(|game| game.current_vote().unwrap().history().to_vec())
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].operator, Operator::Storyteller);
}

/// Free-text questions resolve through the same routing.
#[tokio::test]
async fn test_ask_and_answer() {
    let (referee, mut rx) = referee(RefereeConfig::new());

    let asking = {
        let referee = referee.clone();
        tokio::spawn(async move { referee.ask(id(7), "who do you choose?", Duration::from_secs(60)).await })
    };
    let (user, conversation, question) = next_prompt(&mut rx).await;
    assert_eq!(user, id(7));
    assert_eq!(question, Question::FreeText("who do you choose?".into()));
    assert!(referee.deliver_reply(user, conversation, "seat 4"));

    assert_eq!(asking.await.unwrap().unwrap(), "seat 4");
}

// =============================================================================
// Presets and defaults
// =============================================================================

/// A preset for a later voter is entered without asking them.
#[tokio::test]
async fn test_preset_skips_prompt() {
    let (referee, mut rx) = referee(RefereeConfig::new());
    start_vote(&referee, 4).await;
    referee.preset_vote(id(4), true).await.unwrap();

    let (user, conversation, _) = next_prompt(&mut rx).await;
    assert_eq!(user, id(3));
    referee.deliver_reply(user, conversation, "yes");

    let (next, _, _) = next_prompt(&mut rx).await;
    assert_eq!(next, id(1));
    let history = referee
        .read(|game| game.current_vote().unwrap().history().to_vec())
        .unwrap();
    assert_eq!(history[1].voter, id(4));
    assert_eq!(history[1].operator, Operator::Preset);
}

/// A preset for the voter being asked is entered straight away.
#[tokio::test]
async fn test_preset_answers_open_prompt() {
    let (referee, mut rx) = referee(RefereeConfig::new());
    start_vote(&referee, 4).await;

    let (user, conversation, _) = next_prompt(&mut rx).await;
    referee.preset_vote(user, false).await.unwrap();

    let (next, _, _) = next_prompt(&mut rx).await;
    assert_eq!(next, id(4));
    assert!(!referee.deliver_reply(user, conversation, "yes"));
}

/// A silent voter's default is entered when the delay runs out.
#[tokio::test(start_paused = true)]
async fn test_default_vote_timer() {
    let config = RefereeConfig::new().with_default_vote(id(3), true, Duration::from_secs(10));
    let (referee, mut rx) = referee(config);
    start_vote(&referee, 4).await;

    let (user, stale, _) = next_prompt(&mut rx).await;
    assert_eq!(user, id(3));

    let (next, _, _) = next_prompt(&mut rx).await;
    assert_eq!(next, id(4));

    let ballot = referee
        .read(|game| game.current_vote().unwrap().history()[0])
        .unwrap();
    assert!(ballot.yes);
    assert_eq!(ballot.operator, Operator::Default);
    assert!(!referee.deliver_reply(user, stale, "no"));
}

/// The prompt timeout enters "no" for voters without a default of their own.
#[tokio::test(start_paused = true)]
async fn test_prompt_timeout_votes_no() {
    let config = RefereeConfig::new().with_prompt_timeout(Duration::from_secs(30));
    let (referee, mut rx) = referee(config);
    start_vote(&referee, 3).await;

    assert_eq!(next_outcome(&mut rx).await, VoteOutcome::Failed);
    let history = referee
        .read(|game| game.current_day().unwrap().votes()[0].history().to_vec())
        .unwrap();
    assert_eq!(history.len(), 3);
    assert!(history.iter().all(|b| !b.yes && b.operator == Operator::Default));
}

/// Cancelling the nomination ends its timers.
#[tokio::test(start_paused = true)]
async fn test_cancel_stops_default_vote() {
    let config = RefereeConfig::new().with_default_vote(id(3), true, Duration::from_secs(10));
    let (referee, mut rx) = referee(config);
    start_vote(&referee, 4).await;
    next_prompt(&mut rx).await;

    referee.cancel_nomination().await.unwrap();
    tokio::time::sleep(Duration::from_secs(60)).await;

    while let Ok(intent) = rx.try_recv() {
        assert!(!matches!(intent, Intent::Announce(GameEvent::VoteCast { .. })));
        assert!(!matches!(intent, Intent::Prompt { .. }));
    }
    assert!(referee
        .read(|game| game.current_day().unwrap().votes().is_empty())
        .unwrap());
}

// =============================================================================
// Concurrency
// =============================================================================

/// Two commits racing for one turn: exactly one lands.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_votes_commit_once() {
    let (referee, mut rx) = referee(RefereeConfig::new());
    start_vote(&referee, 4).await;
    let (user, _, _) = next_prompt(&mut rx).await;

    let first = {
        let referee = referee.clone();
        tokio::spawn(async move { referee.vote(user, true, Operator::Voter).await })
    };
    let second = {
        let referee = referee.clone();
        tokio::spawn(async move { referee.vote(user, false, Operator::Storyteller).await })
    };
    let results = [first.await.unwrap(), second.await.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().filter_map(|r| r.as_ref().err()).all(|err| err.is_stale()));

    let (position, ballots) = referee
        .read(|game| {
            let vote = game.current_vote().unwrap();
            (vote.position(), vote.history().len())
        })
        .unwrap();
    assert_eq!((position, ballots), (1, 1));
}

// =============================================================================
// Persistence
// =============================================================================

/// A restored game picks the vote up at the same turn.
#[tokio::test]
async fn test_restore_resumes_vote() {
    let (referee, mut rx) = referee(RefereeConfig::new());
    start_vote(&referee, 4).await;
    let (user, conversation, _) = next_prompt(&mut rx).await;
    referee.deliver_reply(user, conversation, "yes");
    next_prompt(&mut rx).await;

    let snapshot = referee.save().unwrap();
    referee.end_game().unwrap();
    referee.restore(&snapshot).await.unwrap();

    let (user, conversation, _) = next_prompt(&mut rx).await;
    assert_eq!(user, id(4));
    assert!(matches!(conversation, Conversation::Vote { position: 1, .. }));

    let votes = referee
        .read(|game| game.current_vote().unwrap().votes())
        .unwrap();
    assert_eq!(votes, 1);
}
