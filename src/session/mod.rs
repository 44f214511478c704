//! Session state machine.
//!
//! Inbound messages flow through the [`Dispatcher`], which updates the
//! [`SessionState`] and publishes [`SessionEvent`]s through the
//! [`Notifier`]. Nothing here performs I/O, so the session can be driven
//! from canned messages as easily as from a live connection.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `dispatch` | Selector → handler routing |
//! | `events` | Notifications and their publish point |
//! | `state` | Device, applications and tabs |

// ============================================================================
// Submodules
// ============================================================================

/// Selector → handler routing.
pub mod dispatch;

/// Notifications and their publish point.
pub mod events;

/// Device, applications and tabs.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use dispatch::Dispatcher;
pub use events::{EventHandler, Notifier, SessionEvent};
pub use state::{Application, Applications, Device, SessionState, TabInfo, Tabs};
