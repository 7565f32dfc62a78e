//! Lifecycle event distribution
//!
//! In-process broadcast bus for post lifecycle events. Services emit after
//! each committed transition; any number of subscribers (CLI output, a
//! future UI, the external publisher's poller) can listen. Emitting never
//! blocks: with no subscribers the event is dropped, and a lagging
//! subscriber loses oldest events first.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::PostStatus;

/// Event receiver type alias
pub type EventReceiver = broadcast::Receiver<Event>;

/// A committed post lifecycle transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    PostCreated {
        post_id: String,
        owner_id: String,
        status: PostStatus,
    },
    PostScheduled {
        post_id: String,
        scheduled_at: i64,
    },
    PostPublished {
        post_id: String,
    },
    PostFailed {
        post_id: String,
        reason: String,
    },
    PostCancelled {
        post_id: String,
    },
    PostRevertedToDraft {
        post_id: String,
    },
}

/// Broadcast bus for lifecycle events.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a bus with the given per-subscriber buffer capacity
    /// (100 is plenty for interactive use).
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events emitted after this call.
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Emit an event to all current subscribers.
    pub fn emit(&self, event: Event) {
        // send() errs when nobody is listening; that is fine
        let _ = self.sender.send(event);
    }
}
