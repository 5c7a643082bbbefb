//! Pinboard realtime notification infrastructure.
//!
//! - [`BoardNotifier`] -- in-process publish/subscribe hub keyed by board
//!   id, delivering synchronously to every subscriber of a board.
//! - [`BoardSignal`] -- the envelope delivered to subscribers.
//! - [`Subscription`] -- handle that unsubscribes when dropped.

pub mod notifier;

pub use notifier::{BoardNotifier, BoardSignal, SubscriberError, Subscription};
