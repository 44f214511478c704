//! Selector-based dispatch of inbound messages.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use plist::Value;
use tracing::{debug, trace, warn};

use crate::protocol::{Message, Selector, keys};

use super::events::{Notifier, SessionEvent};
use super::state::SessionState;

// ============================================================================
// Dispatcher
// ============================================================================

/// Routes each inbound message to the handler for its selector.
///
/// Handlers mutate [`SessionState`] and publish through [`Notifier`]. The
/// state lock is never held while an event is emitted.
#[derive(Clone)]
pub struct Dispatcher {
    state: Arc<Mutex<SessionState>>,
    notifier: Notifier,
}

impl Dispatcher {
    /// Creates a dispatcher over shared state.
    #[must_use]
    pub fn new(state: Arc<Mutex<SessionState>>, notifier: Notifier) -> Self {
        Self { state, notifier }
    }

    /// Dispatches a decoded frame payload.
    ///
    /// Payloads without a selector are dropped.
    pub fn dispatch_value(&self, value: Value) {
        match Message::from_value(value) {
            Ok(message) => self.dispatch(&message),
            Err(e) => trace!(error = %e, "Dropping payload"),
        }
    }

    /// Dispatches one message.
    pub fn dispatch(&self, message: &Message) {
        match &message.selector {
            Selector::ReportSetup => {
                self.state.lock().apply_setup(&message.argument);
            }

            Selector::ReportConnectedApplicationList => {
                self.notifier.emit(SessionEvent::Open);
                self.state.lock().apply_application_list(&message.argument);
            }

            Selector::ApplicationSentListing => {
                self.state.lock().apply_listing(&message.argument);
            }

            Selector::ApplicationSentData => match message_text(message) {
                Some(text) => self.notifier.emit(SessionEvent::Message(text)),
                None => debug!("Application data without message payload"),
            },

            Selector::ApplicationDisconnected => {
                self.notifier.emit(SessionEvent::Close);
            }

            Selector::ReportIdentifier
            | Selector::ForwardGetListing
            | Selector::ForwardSocketSetup
            | Selector::ForwardIndicateWebView
            | Selector::ForwardSocketData
            | Selector::Unknown(_) => {
                warn!(selector = %message.selector, "No handler for selector");
            }
        }
    }
}

/// Decodes `WIRMessageDataKey` to text.
fn message_text(message: &Message) -> Option<String> {
    match message.get(keys::MESSAGE_DATA)? {
        Value::Data(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        Value::String(text) => Some(text.clone()),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
