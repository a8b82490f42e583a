//! Reply routing.
//!
//! A prompt registers a slot keyed by (user, conversation); the transport's
//! reply fills it. Dropping a slot wakes its waiter with an error, which is
//! how cancelled votes end their timers.

use std::sync::{Mutex, PoisonError};

use rustc_hash::FxHashMap;
use tokio::sync::oneshot;

use super::ports::Conversation;
use crate::core::{UserId, VoteId};

type Slots = FxHashMap<(UserId, Conversation), oneshot::Sender<String>>;

#[derive(Debug, Default)]
pub(crate) struct ReplyRouter {
    slots: Mutex<Slots>,
}

impl ReplyRouter {
    fn slots(&self) -> std::sync::MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a slot, replacing any earlier one for the same key.
    pub(crate) fn register(&self, user: UserId, conversation: Conversation) -> oneshot::Receiver<String> {
        let (tx, rx) = oneshot::channel();
        self.slots().insert((user, conversation), tx);
        rx
    }

    /// Hand `text` to whoever waits on the slot. False if nobody does.
    pub(crate) fn deliver(&self, user: UserId, conversation: Conversation, text: String) -> bool {
        let Some(tx) = self.slots().remove(&(user, conversation)) else {
            return false;
        };
        tx.send(text).is_ok()
    }

    pub(crate) fn cancel(&self, user: UserId, conversation: Conversation) {
        self.slots().remove(&(user, conversation));
    }

    /// Drop every slot `voter` holds on `vote`.
    pub(crate) fn cancel_voter(&self, vote: VoteId, voter: UserId) {
        self.slots()
            .retain(|(user, conversation), _| *user != voter || conversation.vote() != Some(vote));
    }

    /// Drop every slot on `vote`.
    pub(crate) fn cancel_vote(&self, vote: VoteId) {
        self.slots()
            .retain(|(_, conversation), _| conversation.vote() != Some(vote));
    }

    pub(crate) fn clear(&self) {
        self.slots().clear();
    }

    pub(crate) fn pending(&self) -> usize {
        self.slots().len()
    }
}

/// Read a yes or no out of a reply.
pub(crate) fn parse_vote(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "1" => Some(true),
        "no" | "n" | "0" => Some(false),
        _ => None,
    }
}
