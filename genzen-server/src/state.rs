//! Shared application state
//!
//! Carries the event bus used by the player and community engines. Events are
//! fanned out to SSE listeners; sends with no receivers are fine.

use genzen_common::events::GenZenEvent;
use tokio::sync::broadcast;

/// Shared state accessible by all components
pub struct SharedState {
    /// Event broadcaster for SSE events
    event_tx: broadcast::Sender<GenZenEvent>,
}

impl SharedState {
    /// Create new shared state with default values
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(100); // Buffer up to 100 events
        Self { event_tx }
    }

    /// Broadcast an event to all SSE listeners
    pub fn broadcast_event(&self, event: GenZenEvent) {
        // Ignore send errors (no receivers is OK)
        let _ = self.event_tx.send(event);
    }

    /// Subscribe to the event stream for SSE
    pub fn subscribe_events(&self) -> broadcast::Receiver<GenZenEvent> {
        self.event_tx.subscribe()
    }

    /// Current number of connected listeners
    pub fn listener_count(&self) -> usize {
        self.event_tx.receiver_count()
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
