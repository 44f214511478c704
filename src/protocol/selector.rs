//! Message selectors.
//!
//! Every message names its purpose with a selector string. On the wire the
//! selector is terminated by [`SELECTOR_DELIMITER`]; [`Selector::parse`]
//! strips it and [`Selector::wire_name`] puts it back. A selector without
//! the delimiter is never recognized.
//!
//! | Selector | Direction | Purpose |
//! |----------|-----------|---------|
//! | `_rpc_reportIdentifier` | Client → Device | Announce connection id |
//! | `_rpc_forwardGetListing` | Client → Device | Ask application for its pages |
//! | `_rpc_forwardSocketSetup` | Client → Device | Attach sender to a page |
//! | `_rpc_forwardIndicateWebView` | Client → Device | Toggle page highlight |
//! | `_rpc_forwardSocketData` | Client → Device | Debugging command |
//! | `_rpc_reportSetup` | Device → Client | Device details |
//! | `_rpc_reportConnectedApplicationList` | Device → Client | Applications |
//! | `_rpc_applicationSentListing` | Device → Client | Pages |
//! | `_rpc_applicationSentData` | Device → Client | Debugging response |
//! | `_rpc_applicationDisconnected` | Device → Client | Application went away |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// Constants
// ============================================================================

/// Character terminating every selector on the wire.
pub const SELECTOR_DELIMITER: char = ':';

// ============================================================================
// Selector
// ============================================================================

/// Known selectors plus a catch-all for anything else the device sends.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// `_rpc_reportIdentifier`
    ReportIdentifier,
    /// `_rpc_forwardGetListing`
    ForwardGetListing,
    /// `_rpc_forwardSocketSetup`
    ForwardSocketSetup,
    /// `_rpc_forwardIndicateWebView`
    ForwardIndicateWebView,
    /// `_rpc_forwardSocketData`
    ForwardSocketData,
    /// `_rpc_reportSetup`
    ReportSetup,
    /// `_rpc_reportConnectedApplicationList`
    ReportConnectedApplicationList,
    /// `_rpc_applicationSentListing`
    ApplicationSentListing,
    /// `_rpc_applicationSentData`
    ApplicationSentData,
    /// `_rpc_applicationDisconnected`
    ApplicationDisconnected,
    /// Selector with no registered meaning, kept exactly as received.
    Unknown(String),
}

impl Selector {
    /// Parses a wire selector.
    ///
    /// Only a name followed by [`SELECTOR_DELIMITER`] can match a known
    /// selector; anything else is kept verbatim as [`Selector::Unknown`].
    #[must_use]
    pub fn parse(wire: &str) -> Self {
        wire.strip_suffix(SELECTOR_DELIMITER)
            .and_then(Self::known)
            .unwrap_or_else(|| Self::Unknown(wire.to_string()))
    }

    fn known(name: &str) -> Option<Self> {
        let selector = match name {
            "_rpc_reportIdentifier" => Self::ReportIdentifier,
            "_rpc_forwardGetListing" => Self::ForwardGetListing,
            "_rpc_forwardSocketSetup" => Self::ForwardSocketSetup,
            "_rpc_forwardIndicateWebView" => Self::ForwardIndicateWebView,
            "_rpc_forwardSocketData" => Self::ForwardSocketData,
            "_rpc_reportSetup" => Self::ReportSetup,
            "_rpc_reportConnectedApplicationList" => Self::ReportConnectedApplicationList,
            "_rpc_applicationSentListing" => Self::ApplicationSentListing,
            "_rpc_applicationSentData" => Self::ApplicationSentData,
            "_rpc_applicationDisconnected" => Self::ApplicationDisconnected,
            _ => return None,
        };
        Some(selector)
    }

    /// Returns the selector name without the delimiter.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::ReportIdentifier => "_rpc_reportIdentifier",
            Self::ForwardGetListing => "_rpc_forwardGetListing",
            Self::ForwardSocketSetup => "_rpc_forwardSocketSetup",
            Self::ForwardIndicateWebView => "_rpc_forwardIndicateWebView",
            Self::ForwardSocketData => "_rpc_forwardSocketData",
            Self::ReportSetup => "_rpc_reportSetup",
            Self::ReportConnectedApplicationList => "_rpc_reportConnectedApplicationList",
            Self::ApplicationSentListing => "_rpc_applicationSentListing",
            Self::ApplicationSentData => "_rpc_applicationSentData",
            Self::ApplicationDisconnected => "_rpc_applicationDisconnected",
            Self::Unknown(wire) => wire
                .strip_suffix(SELECTOR_DELIMITER)
                .unwrap_or(wire.as_str()),
        }
    }

    /// Returns the selector as written on the wire.
    #[must_use]
    pub fn wire_name(&self) -> String {
        match self {
            Self::Unknown(wire) => wire.clone(),
            known => format!("{}{}", known.name(), SELECTOR_DELIMITER),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Tests
// ============================================================================
