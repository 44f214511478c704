//! Driver connection options.
//!
//! # Example
//!
//! ```ignore
//! use ios_webkit_driver::DriverOptions;
//!
//! let options = DriverOptions::new()
//!     .with_port(27754)
//!     .with_page_id(2);
//!
//! assert_eq!(options.socket_addr().port(), 27754);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, Ipv6Addr, SocketAddr};

use crate::error::{Error, Result};
use crate::identifiers::PageId;
use crate::protocol::MOBILE_SAFARI;
use crate::transport::DEFAULT_MAX_FRAME_LEN;

// ============================================================================
// Constants
// ============================================================================

/// Default inspector address (IPv6 loopback).
pub const DEFAULT_HOST: IpAddr = IpAddr::V6(Ipv6Addr::LOCALHOST);

/// Default inspector port.
pub const DEFAULT_PORT: u16 = 27753;

/// Default page driven by a session.
pub const DEFAULT_PAGE_ID: PageId = PageId::new(1);

// ============================================================================
// DriverOptions
// ============================================================================

/// Where to connect and what to drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOptions {
    /// Inspector host.
    pub host: IpAddr,

    /// Inspector port.
    pub port: u16,

    /// Bundle identifier of the inspected application.
    pub application_id: String,

    /// Page the session attaches to.
    pub page_id: PageId,

    /// Largest frame payload accepted in either direction.
    pub max_frame_len: u32,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
            application_id: MOBILE_SAFARI.to_string(),
            page_id: DEFAULT_PAGE_ID,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl DriverOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the inspector host.
    #[inline]
    #[must_use]
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Sets the inspector port.
    #[inline]
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the inspected application.
    #[inline]
    #[must_use]
    pub fn with_application(mut self, application_id: impl Into<String>) -> Self {
        self.application_id = application_id.into();
        self
    }

    /// Sets the page to attach to.
    #[inline]
    #[must_use]
    pub fn with_page_id(mut self, page_id: impl Into<PageId>) -> Self {
        self.page_id = page_id.into();
        self
    }

    /// Sets the frame payload limit.
    #[inline]
    #[must_use]
    pub fn with_max_frame_len(mut self, max_frame_len: u32) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl DriverOptions {
    /// Returns the inspector socket address.
    #[inline]
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Checks the options for values the protocol cannot use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(Error::config("port must be non-zero"));
        }
        if self.application_id.trim().is_empty() {
            return Err(Error::config("application identifier must not be empty"));
        }
        if self.max_frame_len == 0 {
            return Err(Error::config("max frame length must be non-zero"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
