//! Error types for the iOS WebKit driver.
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use ios_webkit_driver::{Driver, Result};
//!
//! async fn example(driver: &Driver) -> Result<()> {
//!     let id = driver.send_command("Runtime.evaluate", json!({ "expression": "1 + 1" }))?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`] |
//! | Wire | [`Error::Encode`], [`Error::Framing`], [`Error::Protocol`] |
//! | External | [`Error::Io`], [`Error::Json`] |
//!
//! Malformed payloads, unknown selectors and missing argument fields are
//! logged and skipped by the session; they never surface here.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when driver options fail validation.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Transport connection failed.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// The transport is gone and can no longer accept frames.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Wire Errors
    // ========================================================================
    /// A message could not be serialized into a frame.
    ///
    /// Nothing has been written to the transport when this is returned.
    #[error("Encode error: {message}")]
    Encode {
        /// Description of the codec failure.
        message: String,
    },

    /// The inbound length prefix is unusable.
    ///
    /// Fatal for the session: the stream cannot be resynchronized.
    #[error("Framing error: {message}")]
    Framing {
        /// Description of the framing violation.
        message: String,
    },

    /// Protocol violation or unexpected message shape.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates an encode error.
    #[inline]
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Creates a framing error.
    #[inline]
    pub fn framing(message: impl Into<String>) -> Self {
        Self::Framing {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionClosed | Self::Io(_)
        )
    }

    /// Returns `true` if the session cannot continue after this error.
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Framing { .. } | Self::ConnectionClosed | Self::Io(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
