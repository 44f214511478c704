//! Outbound message construction.
//!
//! [`CommandChannel`] owns the session identity and the command id counter,
//! and builds every message the client sends. It performs no I/O.
//!
//! # Handshake
//!
//! The three handshake messages are sent back-to-back without waiting for
//! replies; the device answers each one independently:
//!
//! | Request | Reply |
//! |---------|-------|
//! | `_rpc_reportIdentifier` | `_rpc_reportSetup` |
//! | `_rpc_forwardGetListing` | `_rpc_reportConnectedApplicationList` |
//! | `_rpc_forwardSocketSetup` | `_rpc_applicationSentListing` |

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicU64, Ordering};

use plist::{Integer, Value};
use serde::Serialize;

use crate::error::Result;
use crate::identifiers::{ConnectionId, MessageId, PageId, SenderId};

use super::keys;
use super::message::Message;
use super::selector::Selector;

// ============================================================================
// Constants
// ============================================================================

/// Bundle identifier of Mobile Safari.
pub const MOBILE_SAFARI: &str = "com.apple.mobilesafari";

// ============================================================================
// CommandEnvelope
// ============================================================================

/// JSON body of a debugging command.
///
/// # Format
///
/// ```json
/// { "id": 0, "method": "Runtime.evaluate", "params": { ... } }
/// ```
#[derive(Debug, Serialize)]
struct CommandEnvelope<'a> {
    id: MessageId,
    method: &'a str,
    params: &'a serde_json::Value,
}

// ============================================================================
// CommandChannel
// ============================================================================

/// Builds handshake and debugging-command messages for one session.
#[derive(Debug)]
pub struct CommandChannel {
    /// Client connection token.
    connection_id: ConnectionId,
    /// Sender token.
    sender_id: SenderId,
    /// Page the session drives.
    page_id: PageId,
    /// Application the session drives.
    application_id: String,
    /// Next debugging command id.
    next_message_id: AtomicU64,
}

impl CommandChannel {
    /// Creates a channel with freshly generated session tokens.
    #[must_use]
    pub fn new(application_id: impl Into<String>, page_id: PageId) -> Self {
        Self {
            connection_id: ConnectionId::generate(),
            sender_id: SenderId::generate(),
            page_id,
            application_id: application_id.into(),
            next_message_id: AtomicU64::new(0),
        }
    }

    /// Returns the connection token.
    #[inline]
    #[must_use]
    pub const fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Returns the sender token.
    #[inline]
    #[must_use]
    pub const fn sender_id(&self) -> SenderId {
        self.sender_id
    }

    /// Returns the driven page.
    #[inline]
    #[must_use]
    pub const fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Returns the driven application.
    #[inline]
    #[must_use]
    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    /// Returns the id the next command will use.
    #[inline]
    #[must_use]
    pub fn peek_message_id(&self) -> MessageId {
        MessageId::new(self.next_message_id.load(Ordering::Relaxed))
    }

    /// All three handshake messages, in send order.
    #[must_use]
    pub fn handshake(&self) -> [Message; 3] {
        [
            self.request_identification(),
            self.request_application_listing(),
            self.request_socket_setup(),
        ]
    }

    /// `_rpc_reportIdentifier`: announces the connection token.
    #[must_use]
    pub fn request_identification(&self) -> Message {
        Message::new(Selector::ReportIdentifier)
            .with(keys::CONNECTION_IDENTIFIER, self.connection_id.to_string())
    }

    /// `_rpc_forwardGetListing`: asks the application for its pages.
    #[must_use]
    pub fn request_application_listing(&self) -> Message {
        Message::new(Selector::ForwardGetListing)
            .with(keys::CONNECTION_IDENTIFIER, self.connection_id.to_string())
            .with(keys::APPLICATION_IDENTIFIER, self.application_id.as_str())
    }

    /// `_rpc_forwardSocketSetup`: attaches the sender to the page.
    #[must_use]
    pub fn request_socket_setup(&self) -> Message {
        Message::new(Selector::ForwardSocketSetup)
            .with(keys::APPLICATION_IDENTIFIER, self.application_id.as_str())
            .with(keys::CONNECTION_IDENTIFIER, self.connection_id.to_string())
            .with(keys::SENDER, self.sender_id.to_string())
            .with(keys::PAGE_IDENTIFIER, self.page_value())
    }

    /// `_rpc_forwardIndicateWebView`: toggles the page highlight.
    ///
    /// The device sends no reply.
    #[must_use]
    pub fn indicate_webview(&self, enabled: bool) -> Message {
        Message::new(Selector::ForwardIndicateWebView)
            .with(keys::APPLICATION_IDENTIFIER, self.application_id.as_str())
            .with(keys::INDICATE_ENABLED, enabled)
            .with(keys::CONNECTION_IDENTIFIER, self.connection_id.to_string())
            .with(keys::PAGE_IDENTIFIER, self.page_value())
    }

    /// `_rpc_forwardSocketData`: wraps a debugging command.
    ///
    /// Consumes exactly one id from the counter and returns it with the
    /// message. The JSON travels as plist data, never as a string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the body cannot be
    /// serialized.
    pub fn command(
        &self,
        method: &str,
        params: &serde_json::Value,
    ) -> Result<(MessageId, Message)> {
        let id = MessageId::new(self.next_message_id.fetch_add(1, Ordering::Relaxed));
        let body = serde_json::to_vec(&CommandEnvelope { id, method, params })?;

        let message = Message::new(Selector::ForwardSocketData)
            .with(keys::APPLICATION_IDENTIFIER, self.application_id.as_str())
            .with_data(keys::SOCKET_DATA, body)
            .with(keys::CONNECTION_IDENTIFIER, self.connection_id.to_string())
            .with(keys::SENDER, self.sender_id.to_string())
            .with(keys::PAGE_IDENTIFIER, self.page_value());

        Ok((id, message))
    }

    #[inline]
    fn page_value(&self) -> Value {
        Value::Integer(Integer::from(self.page_id.as_u64()))
    }
}

// ============================================================================
// Tests
// ============================================================================
