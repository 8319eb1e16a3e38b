//! Per-user change-event channels.
//!
//! Each user gets a private broadcast channel carrying [`TaskEvent`]s for
//! their own tasks. Publishing is fire-and-forget: no subscriber, a full
//! channel, or a lagging receiver never affects the mutation that produced
//! the event.

use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::types::TaskEvent;

/// Default per-user channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Routes change events to per-user broadcast channels.
#[derive(Debug)]
pub struct EventBroadcaster {
    channels: DashMap<String, broadcast::Sender<TaskEvent>>,
    capacity: usize,
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl EventBroadcaster {
    /// Create a broadcaster whose per-user channels hold up to `capacity`
    /// undelivered events. Older events are dropped once a receiver lags
    /// past that bound.
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity,
        }
    }

    /// Subscribe to a user's private channel, creating it if needed.
    pub fn subscribe(&self, user_id: &str) -> broadcast::Receiver<TaskEvent> {
        self.channels
            .entry(user_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Publish an event to a user's channel, if anyone is listening.
    ///
    /// Best-effort by contract: send errors are logged at debug level and
    /// swallowed.
    pub fn publish(&self, user_id: &str, event: TaskEvent) {
        if let Some(sender) = self.channels.get(user_id) {
            if let Err(err) = sender.send(event) {
                tracing::debug!(user_id, "dropping change event: {err}");
            }
        } else {
            tracing::debug!(user_id, "no subscribers for change event");
        }
    }
}
