//! iOS WebKit Driver - Client for the WebKit remote inspector protocol.
//!
//! This library talks to the inspector daemon that fronts Mobile Safari and
//! other web views on an iOS device or simulator, and drives one page with
//! JSON debugging commands.
//!
//! # Architecture
//!
//! The driver follows a client-daemon model:
//!
//! - **Local End (Rust)**: Sends handshake and commands, reacts to reports
//! - **Remote End (Daemon)**: Relays between the client and the page
//!
//! Key design principles:
//!
//! - Each [`Driver`] owns: TCP stream + reassembly buffer + event loop
//! - Every frame is a length prefix followed by a binary property list
//! - Messages carry a `_rpc_` selector that picks their handler
//! - Event-driven architecture (no polling)
//!
//! # Quick Start
//!
//! ```no_run
//! use ios_webkit_driver::{Driver, Result, SessionEvent};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let driver = Driver::builder()
//!         .application("com.apple.mobilesafari")
//!         .page_id(1)
//!         .connect()
//!         .await?;
//!
//!     let mut events = driver.subscribe();
//!     while let Ok(event) = events.recv().await {
//!         match event {
//!             SessionEvent::Open => {
//!                 driver.send_command("Runtime.evaluate", json!({ "expression": "location.href" }))?;
//!             }
//!             SessionEvent::Message(text) => println!("{text}"),
//!             SessionEvent::Close => break,
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`driver`] | Driver entry point and configuration |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Selectors, messages and outbound builders |
//! | [`session`] | Dispatch, session state and events |
//! | [`transport`] | Framing, reassembly and the socket event loop |

// ============================================================================
// Modules
// ============================================================================

/// Driver entry point and configuration.
///
/// Use [`Driver::builder()`] to configure and connect a session.
pub mod driver;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for session entities.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Inspector protocol message types.
///
/// Selectors, dictionary keys and outbound message builders.
pub mod protocol;

/// Session state machine.
///
/// Routes inbound messages and publishes [`SessionEvent`]s.
pub mod session;

/// Socket transport layer.
///
/// Length-prefixed framing over a single TCP stream.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Driver types
pub use driver::{DEFAULT_HOST, DEFAULT_PAGE_ID, DEFAULT_PORT, Driver, DriverBuilder, DriverOptions};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ConnectionId, MessageId, PageId, SenderId};

// Protocol types
pub use protocol::{MOBILE_SAFARI, Message, Selector};

// Session types
pub use session::{Application, Applications, Device, SessionEvent, TabInfo, Tabs};
