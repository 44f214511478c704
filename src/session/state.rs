//! Derived session state.
//!
//! Each piece of state is replaced wholesale by the reply that reports it,
//! and cleared when that reply arrives without the expected field. Nothing
//! is ever merged with an earlier report.

// ============================================================================
// Imports
// ============================================================================

use plist::{Dictionary, Value};
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::identifiers::PageId;
use crate::protocol::keys;

// ============================================================================
// Types
// ============================================================================

/// Connected applications keyed by bundle identifier.
pub type Applications = FxHashMap<String, Application>;

/// Open pages keyed by page identifier.
pub type Tabs = FxHashMap<PageId, TabInfo>;

// ============================================================================
// Device
// ============================================================================

/// Device reported by `_rpc_reportSetup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    /// Device (simulator) name.
    pub name: String,
    /// Build identifier, if reported.
    pub version: Option<String>,
}

// ============================================================================
// Application
// ============================================================================

/// Application reported by `_rpc_reportConnectedApplicationList`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Application {
    /// Display name.
    pub name: String,
    /// Whether the application proxies another one.
    pub is_proxy: bool,
}

// ============================================================================
// TabInfo
// ============================================================================

/// Page reported by `_rpc_applicationSentListing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabInfo {
    /// Page title.
    pub title: String,
    /// Page URL.
    pub url: String,
}

// ============================================================================
// SessionState
// ============================================================================

/// Everything the device has told the session so far.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    device: Option<Device>,
    applications: Option<Applications>,
    tabs: Option<Tabs>,
}

impl SessionState {
    /// Creates an empty state.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the reported device.
    #[inline]
    #[must_use]
    pub fn device(&self) -> Option<&Device> {
        self.device.as_ref()
    }

    /// Returns the reported applications.
    #[inline]
    #[must_use]
    pub fn applications(&self) -> Option<&Applications> {
        self.applications.as_ref()
    }

    /// Returns the reported pages.
    #[inline]
    #[must_use]
    pub fn tabs(&self) -> Option<&Tabs> {
        self.tabs.as_ref()
    }

    /// Applies a `_rpc_reportSetup` argument.
    pub fn apply_setup(&mut self, argument: &Dictionary) {
        self.device = argument
            .get(keys::SIMULATOR_NAME)
            .and_then(Value::as_string)
            .map(|name| Device {
                name: name.to_string(),
                version: string_field(argument, keys::SIMULATOR_BUILD),
            });

        debug!(device = ?self.device, "Setup reported");
    }

    /// Applies a `_rpc_reportConnectedApplicationList` argument.
    pub fn apply_application_list(&mut self, argument: &Dictionary) {
        self.applications = argument
            .get(keys::APPLICATION_DICTIONARY)
            .and_then(entries)
            .map(|entries| {
                entries
                    .into_iter()
                    .filter_map(|entry| {
                        let Some(id) = string_field(entry, keys::APPLICATION_IDENTIFIER) else {
                            warn!("Skipping application without identifier");
                            return None;
                        };
                        let application = Application {
                            name: string_field(entry, keys::APPLICATION_NAME).unwrap_or_default(),
                            is_proxy: entry
                                .get(keys::IS_APPLICATION_PROXY)
                                .and_then(Value::as_boolean)
                                .unwrap_or(false),
                        };
                        Some((id, application))
                    })
                    .collect()
            });

        debug!(
            count = self.applications.as_ref().map(FxHashMap::len),
            "Applications reported"
        );
    }

    /// Applies a `_rpc_applicationSentListing` argument.
    pub fn apply_listing(&mut self, argument: &Dictionary) {
        self.tabs = argument.get(keys::LISTING).and_then(entries).map(|entries| {
            entries
                .into_iter()
                .filter_map(|entry| {
                    let Some(page_id) = page_id_field(entry) else {
                        warn!("Skipping listing entry without page identifier");
                        return None;
                    };
                    let tab = TabInfo {
                        title: string_field(entry, keys::TITLE).unwrap_or_default(),
                        url: string_field(entry, keys::URL).unwrap_or_default(),
                    };
                    Some((page_id, tab))
                })
                .collect()
        });

        debug!(count = self.tabs.as_ref().map(FxHashMap::len), "Listing reported");
    }
}

// ============================================================================
// Field Helpers
// ============================================================================

/// Container entries; devices send either a dictionary or an array.
fn entries(value: &Value) -> Option<Vec<&Dictionary>> {
    match value {
        Value::Dictionary(map) => Some(map.values().filter_map(Value::as_dictionary).collect()),
        Value::Array(items) => Some(items.iter().filter_map(Value::as_dictionary).collect()),
        _ => None,
    }
}

fn string_field(dict: &Dictionary, key: &str) -> Option<String> {
    dict.get(key).and_then(Value::as_string).map(str::to_string)
}

fn page_id_field(dict: &Dictionary) -> Option<PageId> {
    match dict.get(keys::PAGE_IDENTIFIER)? {
        Value::String(text) => text.parse().ok().map(PageId::new),
        value => value.as_unsigned_integer().map(PageId::new),
    }
}

// ============================================================================
// Tests
// ============================================================================
