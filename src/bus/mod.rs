//! Event bus for view lifecycle notifications
//!
//! Uses tokio::sync::broadcast for pub/sub pattern.
//! Components publish state transitions and patch results; the host logs
//! them and tests await them instead of sleeping.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::lifecycle::ViewState;

/// Events published by components, keyed by their container selector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum ViewEvent {
    StateChanged { selector: String, state: ViewState },
    Patched { selector: String, key: String },
    PatchSkipped { selector: String, key: String },
    FetchFailed { selector: String, error: String },
    PollingStopped { selector: String },
}

impl ViewEvent {
    pub fn selector(&self) -> &str {
        match self {
            ViewEvent::StateChanged { selector, .. }
            | ViewEvent::Patched { selector, .. }
            | ViewEvent::PatchSkipped { selector, .. }
            | ViewEvent::FetchFailed { selector, .. }
            | ViewEvent::PollingStopped { selector } => selector,
        }
    }
}

/// Event bus handle for publishing and subscribing
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ViewEvent>,
}

impl EventBus {
    /// Create a new event bus with specified capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: ViewEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    /// Default capacity (256 events)
    fn default() -> Self {
        Self::new(256)
    }
}

/// Shared event bus wrapped in Arc for thread-safe sharing
pub type SharedBus = Arc<EventBus>;

/// Create a new shared event bus
pub fn create_bus() -> SharedBus {
    Arc::new(EventBus::default())
}
