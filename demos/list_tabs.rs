//! Connect to the inspector and list open tabs.
//!
//! Demonstrates:
//! - Creating a Driver with the builder
//! - Waiting for the session to open
//! - Reading the device, application and tab reports
//! - Sending a debugging command and printing the reply
//!
//! Usage:
//!   cargo run --example list_tabs
//!   cargo run --example list_tabs -- --debug
//!   cargo run --example list_tabs -- --port 27754

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use anyhow::{Context, bail};
use ios_webkit_driver::{DEFAULT_PORT, Driver, SessionEvent};
use serde_json::json;
use tokio::time::{sleep, timeout};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Constants
// ============================================================================

const OPEN_TIMEOUT: Duration = Duration::from_secs(10);
const LISTING_GRACE: Duration = Duration::from_millis(500);

// ============================================================================
// Args
// ============================================================================

#[derive(Debug, Clone)]
struct Args {
    debug: bool,
    port: u16,
}

impl Args {
    fn parse() -> anyhow::Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        let port = match args.iter().position(|a| a == "--port") {
            Some(index) => args
                .get(index + 1)
                .context("--port needs a value")?
                .parse()
                .context("--port must be a number")?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            debug: args.iter().any(|a| a == "--debug"),
            port,
        })
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        "ios_webkit_driver=debug"
    } else {
        "ios_webkit_driver=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse()?;
    init_logging(args.debug);

    println!("=== List Tabs ===\n");

    let driver = Driver::builder()
        .port(args.port)
        .connect()
        .await
        .context("connecting to inspector")?;
    let mut events = driver.subscribe();

    println!("[Connect] {driver:?}");

    // ========================================================================
    // Wait for the session to open
    // ========================================================================

    let opened = timeout(OPEN_TIMEOUT, async {
        while let Ok(event) = events.recv().await {
            if event == SessionEvent::Open {
                return true;
            }
        }
        false
    })
    .await
    .unwrap_or(false);

    if !opened {
        bail!("inspector did not report its applications in time");
    }

    // The listing arrives separately from the application list.
    sleep(LISTING_GRACE).await;

    if let Some(device) = driver.device() {
        println!(
            "[Device] {} ({})",
            device.name,
            device.version.as_deref().unwrap_or("unknown build")
        );
    }

    for (id, application) in driver.applications().unwrap_or_default() {
        println!("[App]    {id}: {}", application.name);
    }

    let mut tabs: Vec<_> = driver.tabs().unwrap_or_default().into_iter().collect();
    tabs.sort_by_key(|(page_id, _)| *page_id);
    for (page_id, tab) in tabs {
        println!("[Tab]    {page_id}: {} <{}>", tab.title, tab.url);
    }

    // ========================================================================
    // Evaluate in the driven page
    // ========================================================================

    let id = driver.send_command("Runtime.evaluate", json!({ "expression": "document.title" }))?;
    println!("\n[Command] Runtime.evaluate sent with id {id}");

    if let Ok(Ok(SessionEvent::Message(text))) = timeout(OPEN_TIMEOUT, events.recv()).await {
        println!("[Reply]   {text}");
    }

    driver.close();
    Ok(())
}
