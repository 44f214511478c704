//! Inspector driver module.
//!
//! This module provides the main entry point for a debugging session.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Driver`] | One live session with an inspected page |
//! | [`DriverBuilder`] | Fluent configuration builder |
//! | [`DriverOptions`] | Address, application and page settings |
//!
//! # Example
//!
//! ```no_run
//! use ios_webkit_driver::{Driver, Result};
//!
//! # async fn example() -> Result<()> {
//! let driver = Driver::builder().page_id(1).connect().await?;
//! driver.set_webview_indicator(true)?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for driver configuration.
pub mod builder;

/// Core driver implementation.
pub mod core;

/// Connection options and defaults.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::DriverBuilder;
pub use core::Driver;
pub use options::{DEFAULT_HOST, DEFAULT_PAGE_ID, DEFAULT_PORT, DriverOptions};
