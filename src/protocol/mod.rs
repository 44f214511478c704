//! Inspector protocol message types.
//!
//! This module defines the structured messages exchanged with the device's
//! inspector daemon and the builders for everything the client sends.
//!
//! # Protocol Overview
//!
//! | Layer | Type | Format |
//! |-------|------|--------|
//! | Frame | [`crate::transport::FrameCodec`] | `[u32 length][payload]` |
//! | Payload | [`Message`] | binary plist `{__selector, __argument}` |
//! | Debugging command | [`CommandChannel::command`] | JSON carried as plist data |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `channel` | Handshake and command message builders |
//! | `keys` | Argument dictionary keys |
//! | `message` | Selector + argument message |
//! | `selector` | Known selectors |

// ============================================================================
// Submodules
// ============================================================================

/// Outbound message construction.
pub mod channel;

/// Argument dictionary keys.
pub mod keys;

/// Selector + argument message.
pub mod message;

/// Known selectors.
pub mod selector;

// ============================================================================
// Re-exports
// ============================================================================

pub use channel::{CommandChannel, MOBILE_SAFARI};
pub use message::Message;
pub use selector::{SELECTOR_DELIMITER, Selector};
