//! Session notifications.
//!
//! | Event | Emitted when |
//! |-------|--------------|
//! | [`SessionEvent::Open`] | `_rpc_reportConnectedApplicationList` arrives |
//! | [`SessionEvent::Message`] | `_rpc_applicationSentData` carries message data |
//! | [`SessionEvent::Close`] | `_rpc_applicationDisconnected` arrives |
//!
//! Consumers may register one synchronous callback, subscribe to a
//! broadcast channel, or both. The first broadcast receiver exists from the
//! moment the notifier is created, so events published before anyone
//! subscribes are held for the first subscriber.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::trace;

// ============================================================================
// Constants
// ============================================================================

/// Events buffered per broadcast subscriber before it starts lagging.
const EVENT_CHANNEL_CAPACITY: usize = 256;

// ============================================================================
// Types
// ============================================================================

/// Event handler callback type.
///
/// Runs on the connection's event loop; it must not block.
pub type EventHandler = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

// ============================================================================
// SessionEvent
// ============================================================================

/// A notification published by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The device listed its applications; the session is usable.
    Open,

    /// JSON text sent back by the inspected page.
    Message(String),

    /// The device reported that the application disconnected.
    Close,
}

// ============================================================================
// Notifier
// ============================================================================

/// Publish point for [`SessionEvent`]s.
#[derive(Clone)]
pub struct Notifier {
    /// Registered callback.
    handler: Arc<Mutex<Option<EventHandler>>>,
    /// Broadcast sender for async subscribers.
    broadcast: broadcast::Sender<SessionEvent>,
    /// Receiver created with the channel, handed to the first subscriber.
    backlog: Arc<Mutex<Option<broadcast::Receiver<SessionEvent>>>>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    /// Creates a notifier with no handler.
    #[must_use]
    pub fn new() -> Self {
        let (broadcast, backlog) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            handler: Arc::new(Mutex::new(None)),
            broadcast,
            backlog: Arc::new(Mutex::new(Some(backlog))),
        }
    }

    /// Replaces the callback.
    pub fn set_handler(&self, handler: impl Fn(&SessionEvent) + Send + Sync + 'static) {
        self.install(Arc::new(handler));
    }

    /// Replaces the callback with an already shared one.
    pub fn install(&self, handler: EventHandler) {
        *self.handler.lock() = Some(handler);
    }

    /// Removes the callback.
    pub fn clear_handler(&self) {
        *self.handler.lock() = None;
    }

    /// Returns a broadcast receiver.
    ///
    /// The first call returns the receiver created with the notifier, which
    /// still holds every event emitted so far (up to the channel capacity).
    /// Later calls see events emitted from then on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.backlog
            .lock()
            .take()
            .unwrap_or_else(|| self.broadcast.subscribe())
    }

    /// Publishes an event to the callback, then to subscribers.
    ///
    /// The handler lock is released before the callback runs.
    pub fn emit(&self, event: SessionEvent) {
        trace!(?event, "Emitting session event");

        let handler = self.handler.lock().clone();
        if let Some(handler) = handler {
            handler(&event);
        }

        // No subscribers is fine.
        let _ = self.broadcast.send(event);
    }
}

// ============================================================================
// Tests
// ============================================================================
