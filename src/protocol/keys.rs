//! Argument dictionary keys used by the inspector daemon.

/// Client connection token.
pub const CONNECTION_IDENTIFIER: &str = "WIRConnectionIdentifierKey";

/// Bundle identifier of the inspected application.
pub const APPLICATION_IDENTIFIER: &str = "WIRApplicationIdentifierKey";

/// Sender token for debugging-socket traffic.
pub const SENDER: &str = "WIRSenderKey";

/// Page (tab) identifier.
pub const PAGE_IDENTIFIER: &str = "WIRPageIdentifierKey";

/// Web-view highlight flag.
pub const INDICATE_ENABLED: &str = "WIRIndicateEnabledKey";

/// Outbound JSON command bytes.
pub const SOCKET_DATA: &str = "WIRSocketDataKey";

/// Inbound JSON response bytes.
pub const MESSAGE_DATA: &str = "WIRMessageDataKey";

/// Device (simulator) name in a setup report.
pub const SIMULATOR_NAME: &str = "WIRSimulatorNameKey";

/// Device (simulator) build in a setup report.
pub const SIMULATOR_BUILD: &str = "WIRSimulatorBuildKey";

/// Container of connected applications.
pub const APPLICATION_DICTIONARY: &str = "WIRApplicationDictionaryKey";

/// Display name of an application.
pub const APPLICATION_NAME: &str = "WIRApplicationNameKey";

/// Whether an application is a proxy for another.
pub const IS_APPLICATION_PROXY: &str = "WIRIsApplicationProxyKey";

/// Container of pages sent by an application.
pub const LISTING: &str = "WIRListingKey";

/// Page title.
pub const TITLE: &str = "WIRTitleKey";

/// Page URL.
pub const URL: &str = "WIRURLKey";
