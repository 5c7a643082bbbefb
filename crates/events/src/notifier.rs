//! In-process board notifier.
//!
//! [`BoardNotifier`] fans a [`BoardSignal`] out to every callback subscribed
//! to that board. Delivery is synchronous and in publish order. A failing or
//! panicking subscriber is logged and skipped; it never reaches the
//! publisher or the other subscribers. Nothing is persisted or replayed.
//!
//! Share it as `Arc<BoardNotifier>`; [`BoardNotifier::subscribe`] needs the
//! `Arc` so the returned [`Subscription`] can remove itself on drop.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use chrono::{DateTime, Utc};
use pinboard_core::types::DbId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// BoardSignal
// ---------------------------------------------------------------------------

/// A change notification for one board.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSignal {
    pub board_id: DbId,

    /// What happened, e.g. `"card.moved"`.
    pub reason: String,

    /// Ids of the affected entities. Clients re-fetch the board state.
    pub payload: serde_json::Value,

    pub at: DateTime<Utc>,
}

impl BoardSignal {
    pub fn new(board_id: DbId, reason: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            board_id,
            reason: reason.into(),
            payload,
            at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Returned by a subscriber that could not take a signal (e.g. its
/// connection is already gone).
#[derive(Debug, thiserror::Error)]
#[error("subscriber failed: {0}")]
pub struct SubscriberError(pub String);

type Callback = Arc<dyn Fn(&BoardSignal) -> Result<(), SubscriberError> + Send + Sync>;

// ---------------------------------------------------------------------------
// BoardNotifier
// ---------------------------------------------------------------------------

/// Process-wide registry of board subscribers.
#[derive(Default)]
pub struct BoardNotifier {
    subscribers: RwLock<HashMap<DbId, Vec<(u64, Callback)>>>,
    next_id: AtomicU64,
}

impl BoardNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for signals on `board_id`.
    ///
    /// The callback runs on the publisher's thread and must not block.
    pub fn subscribe<F>(self: &Arc<Self>, board_id: DbId, callback: F) -> Subscription
    where
        F: Fn(&BoardSignal) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers
            .entry(board_id)
            .or_default()
            .push((id, Arc::new(callback)));

        tracing::debug!(board_id, subscription_id = id, "Board subscriber added");
        Subscription {
            notifier: Arc::downgrade(self),
            board_id,
            id,
            active: true,
        }
    }

    /// Deliver a signal to every current subscriber of `board_id`.
    ///
    /// Returns the number of subscribers that accepted it.
    pub fn publish(&self, board_id: DbId, reason: &str, payload: serde_json::Value) -> usize {
        let callbacks: Vec<(u64, Callback)> = {
            let subscribers = self
                .subscribers
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            match subscribers.get(&board_id) {
                Some(list) => list.clone(),
                None => return 0,
            }
        };

        let signal = BoardSignal::new(board_id, reason, payload);
        let mut delivered = 0;
        for (id, callback) in callbacks {
            match catch_unwind(AssertUnwindSafe(|| callback(&signal))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => {
                    tracing::warn!(board_id, subscription_id = id, reason, error = %e, "Subscriber rejected signal");
                }
                Err(_) => {
                    tracing::error!(board_id, subscription_id = id, reason, "Subscriber panicked");
                }
            }
        }

        tracing::debug!(board_id, reason, delivered, "Board signal published");
        delivered
    }

    /// Number of live subscriptions for a board.
    pub fn subscriber_count(&self, board_id: DbId) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&board_id)
            .map_or(0, Vec::len)
    }

    fn remove(&self, board_id: DbId, id: u64) {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(list) = subscribers.get_mut(&board_id) {
            list.retain(|(existing, _)| *existing != id);
            if list.is_empty() {
                subscribers.remove(&board_id);
            }
        }
        tracing::debug!(board_id, subscription_id = id, "Board subscriber removed");
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Handle for one registered callback. Dropping it unsubscribes.
pub struct Subscription {
    notifier: Weak<BoardNotifier>,
    board_id: DbId,
    id: u64,
    active: bool,
}

impl Subscription {
    /// Remove the callback now. Calling it again is a no-op.
    pub fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(notifier) = self.notifier.upgrade() {
            notifier.remove(self.board_id, self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("board_id", &self.board_id)
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
