//! Byte-stream transport layer.
//!
//! This module moves frames between the driver and the inspector daemon
//! over a duplex byte stream (TCP by default).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Driver (Rust)  │                              │  Device         │
//! │                 │        TCP stream            │                 │
//! │  Connection     │◄────────────────────────────►│  webinspectord  │
//! │  → event loop   │      [::1]:27753             │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Data Flow
//!
//! Inbound: stream → [`ReassemblyBuffer`] → [`FrameCodec::try_decode`] →
//! frame handler. Outbound: [`FrameCodec::encode`] → [`Connection::send`] →
//! stream.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `buffer` | Inbound frame reassembly |
//! | `codec` | Length-prefixed frame codec |
//! | `connection` | Stream ownership and event loop |

// ============================================================================
// Submodules
// ============================================================================

/// Inbound frame reassembly.
pub mod buffer;

/// Length-prefixed frame codec.
pub mod codec;

/// Stream ownership and event loop.
pub mod connection;

// ============================================================================
// Re-exports
// ============================================================================

pub use buffer::ReassemblyBuffer;
pub use codec::{DEFAULT_MAX_FRAME_LEN, Decoded, FrameCodec, LENGTH_PREFIX_LEN};
pub use connection::{Connection, FrameHandler};
