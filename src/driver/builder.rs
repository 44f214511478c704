//! Builder pattern for driver configuration.
//!
//! Provides a fluent API for configuring and connecting a [`Driver`].
//!
//! # Example
//!
//! ```no_run
//! use ios_webkit_driver::Driver;
//!
//! # async fn example() -> ios_webkit_driver::Result<()> {
//! let driver = Driver::builder()
//!     .port(27753)
//!     .application("com.apple.mobilesafari")
//!     .connect()
//!     .await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::Result;
use crate::identifiers::PageId;
use crate::session::{EventHandler, SessionEvent};

use super::core::Driver;
use super::options::DriverOptions;

// ============================================================================
// DriverBuilder
// ============================================================================

/// Builder for configuring a [`Driver`] instance.
///
/// Use [`Driver::builder()`] to create a new builder.
#[derive(Default, Clone)]
pub struct DriverBuilder {
    /// Options collected so far.
    options: DriverOptions,

    /// Callback installed before the first byte is read.
    event_handler: Option<EventHandler>,
}

impl fmt::Debug for DriverBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverBuilder")
            .field("options", &self.options)
            .field("has_event_handler", &self.event_handler.is_some())
            .finish()
    }
}

// ============================================================================
// DriverBuilder Implementation
// ============================================================================

impl DriverBuilder {
    /// Creates a builder with default options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the inspector host (default `::1`).
    #[inline]
    #[must_use]
    pub fn host(mut self, host: IpAddr) -> Self {
        self.options.host = host;
        self
    }

    /// Sets the inspector port (default 27753).
    #[inline]
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.options.port = port;
        self
    }

    /// Sets the inspected application (default Mobile Safari).
    #[inline]
    #[must_use]
    pub fn application(mut self, application_id: impl Into<String>) -> Self {
        self.options.application_id = application_id.into();
        self
    }

    /// Sets the page to attach to (default 1).
    #[inline]
    #[must_use]
    pub fn page_id(mut self, page_id: impl Into<PageId>) -> Self {
        self.options.page_id = page_id.into();
        self
    }

    /// Sets the frame payload limit.
    #[inline]
    #[must_use]
    pub fn max_frame_len(mut self, max_frame_len: u32) -> Self {
        self.options.max_frame_len = max_frame_len;
        self
    }

    /// Registers the event callback.
    ///
    /// Unlike [`Driver::set_event_handler`], the callback is in place before
    /// the connection starts reading, so it sees every event.
    #[inline]
    #[must_use]
    pub fn on_event(mut self, handler: impl Fn(&SessionEvent) + Send + Sync + 'static) -> Self {
        self.event_handler = Some(Arc::new(handler));
        self
    }

    /// Validates and returns the collected options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) for invalid options.
    pub fn build(self) -> Result<DriverOptions> {
        self.options.validate()?;
        Ok(self.options)
    }

    /// Validates the options and connects.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`](crate::Error::Config) for invalid options
    /// - [`Error::Connection`](crate::Error::Connection) if the socket cannot be opened
    pub async fn connect(self) -> Result<Driver> {
        let Self {
            options,
            event_handler,
        } = self;
        Driver::connect_with(options, event_handler).await
    }

    /// Validates the options and runs the session over `stream`.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) for invalid options.
    pub fn attach<S>(self, stream: S) -> Result<Driver>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let Self {
            options,
            event_handler,
        } = self;
        Driver::from_stream_with(stream, options, event_handler)
    }
}

// ============================================================================
// Tests
// ============================================================================
