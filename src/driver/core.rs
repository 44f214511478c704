//! Driver for one inspector session.
//!
//! The [`Driver`] owns the connection, the command channel and the session
//! state. Connecting sends the three handshake messages immediately; the
//! device's replies then populate the state as they arrive.
//!
//! # Example
//!
//! ```no_run
//! use ios_webkit_driver::{Driver, SessionEvent};
//! use serde_json::json;
//!
//! # async fn example() -> ios_webkit_driver::Result<()> {
//! let driver = Driver::builder().connect().await?;
//! let mut events = driver.subscribe();
//!
//! while let Ok(event) = events.recv().await {
//!     if event == SessionEvent::Open {
//!         driver.send_command("Runtime.evaluate", json!({ "expression": "document.title" }))?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::error::Result;
use crate::identifiers::{ConnectionId, MessageId, PageId, SenderId};
use crate::protocol::{CommandChannel, Message};
use crate::session::{
    Applications, Device, Dispatcher, EventHandler, Notifier, SessionEvent, SessionState, Tabs,
};
use crate::transport::{Connection, FrameCodec, FrameHandler};

use super::builder::DriverBuilder;
use super::options::DriverOptions;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for the driver.
struct DriverInner {
    /// Outbound message builder and id counter.
    channel: CommandChannel,

    /// Frame encoder for outbound messages.
    codec: FrameCodec,

    /// Transport event loop handle.
    connection: Connection,

    /// State populated by device replies.
    state: Arc<Mutex<SessionState>>,

    /// Publish point for session events.
    notifier: Notifier,
}

// ============================================================================
// Driver
// ============================================================================

/// Client side of one inspector session.
///
/// Cloning shares the same session.
#[derive(Clone)]
pub struct Driver {
    /// Shared inner state.
    inner: Arc<DriverInner>,
}

// ============================================================================
// Driver - Display
// ============================================================================

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("connection_id", &self.inner.channel.connection_id())
            .field("application_id", &self.inner.channel.application_id())
            .field("page_id", &self.inner.channel.page_id())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Driver - Construction
// ============================================================================

impl Driver {
    /// Creates a configuration builder for the driver.
    #[inline]
    #[must_use]
    pub fn builder() -> DriverBuilder {
        DriverBuilder::new()
    }

    /// Connects over TCP and sends the handshake.
    ///
    /// Events emitted before the first [`subscribe`](Self::subscribe) are
    /// held for that receiver. Use [`DriverBuilder::on_event`] to have a
    /// callback in place from the start.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`](crate::Error::Config) for invalid options
    /// - [`Error::Connection`](crate::Error::Connection) if the socket cannot be opened
    pub async fn connect(options: DriverOptions) -> Result<Self> {
        Self::connect_with(options, None).await
    }

    /// Runs a session over an already-open stream and sends the handshake.
    ///
    /// Useful when the inspector is reached through a tunnel rather than a
    /// plain socket. Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) for invalid options.
    pub fn from_stream<S>(stream: S, options: DriverOptions) -> Result<Self>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        Self::from_stream_with(stream, options, None)
    }

    pub(crate) async fn connect_with(
        options: DriverOptions,
        event_handler: Option<EventHandler>,
    ) -> Result<Self> {
        options.validate()?;

        let codec = FrameCodec::new(options.max_frame_len);
        let (state, notifier, on_frame) = Self::session_parts(event_handler);
        let connection = Connection::connect(options.socket_addr(), codec, on_frame).await?;

        Self::start(&options, codec, connection, state, notifier)
    }

    pub(crate) fn from_stream_with<S>(
        stream: S,
        options: DriverOptions,
        event_handler: Option<EventHandler>,
    ) -> Result<Self>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        options.validate()?;

        let codec = FrameCodec::new(options.max_frame_len);
        let (state, notifier, on_frame) = Self::session_parts(event_handler);
        let connection = Connection::new(stream, codec, on_frame);

        Self::start(&options, codec, connection, state, notifier)
    }

    /// Builds the event sinks before any byte can be read.
    fn session_parts(
        event_handler: Option<EventHandler>,
    ) -> (Arc<Mutex<SessionState>>, Notifier, FrameHandler) {
        let state = Arc::new(Mutex::new(SessionState::new()));
        let notifier = Notifier::new();
        if let Some(handler) = event_handler {
            notifier.install(handler);
        }

        let dispatcher = Dispatcher::new(Arc::clone(&state), notifier.clone());
        let on_frame: FrameHandler = Box::new(move |value| dispatcher.dispatch_value(value));

        (state, notifier, on_frame)
    }

    fn start(
        options: &DriverOptions,
        codec: FrameCodec,
        connection: Connection,
        state: Arc<Mutex<SessionState>>,
        notifier: Notifier,
    ) -> Result<Self> {
        let channel = CommandChannel::new(options.application_id.clone(), options.page_id);

        let driver = Self {
            inner: Arc::new(DriverInner {
                channel,
                codec,
                connection,
                state,
                notifier,
            }),
        };

        // Pipelined: no reply is awaited between these.
        for message in driver.inner.channel.handshake() {
            driver.send(message)?;
        }

        debug!(
            connection_id = %driver.connection_id(),
            application = driver.application_id(),
            page_id = %driver.page_id(),
            "Inspector handshake sent"
        );

        Ok(driver)
    }
}

// ============================================================================
// Driver - Public API
// ============================================================================

impl Driver {
    /// Returns the device from the latest setup report.
    #[must_use]
    pub fn device(&self) -> Option<Device> {
        self.inner.state.lock().device().cloned()
    }

    /// Returns the applications from the latest application-list report.
    #[must_use]
    pub fn applications(&self) -> Option<Applications> {
        self.inner.state.lock().applications().cloned()
    }

    /// Returns the pages from the latest listing report.
    #[must_use]
    pub fn tabs(&self) -> Option<Tabs> {
        self.inner.state.lock().tabs().cloned()
    }

    /// Sends a debugging command to the page.
    ///
    /// Returns the id placed in the command; the page echoes it in the JSON
    /// delivered by [`SessionEvent::Message`].
    ///
    /// # Errors
    ///
    /// - [`Error::Encode`](crate::Error::Encode) if the frame cannot be built
    /// - [`Error::ConnectionClosed`](crate::Error::ConnectionClosed) if the session has ended
    pub fn send_command(&self, method: &str, params: serde_json::Value) -> Result<MessageId> {
        let (id, message) = self.inner.channel.command(method, &params)?;
        self.send(message)?;

        trace!(%id, method, "Command sent");
        Ok(id)
    }

    /// Turns the page highlight on or off. The device does not reply.
    ///
    /// # Errors
    ///
    /// - [`Error::Encode`](crate::Error::Encode) if the frame cannot be built
    /// - [`Error::ConnectionClosed`](crate::Error::ConnectionClosed) if the session has ended
    pub fn set_webview_indicator(&self, enabled: bool) -> Result<()> {
        self.send(self.inner.channel.indicate_webview(enabled))
    }

    /// Registers the event callback, replacing any previous one.
    ///
    /// The callback runs on the connection's event loop and must not block.
    /// Events emitted before registration are not replayed to it; see
    /// [`DriverBuilder::on_event`].
    pub fn set_event_handler(&self, handler: impl Fn(&SessionEvent) + Send + Sync + 'static) {
        self.inner.notifier.set_handler(handler);
    }

    /// Removes the event callback.
    pub fn clear_event_handler(&self) {
        self.inner.notifier.clear_handler();
    }

    /// Returns a receiver for session events.
    ///
    /// The first receiver handed out also holds every event emitted since
    /// the driver connected. Later receivers see events from then on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.notifier.subscribe()
    }

    /// Closes the transport. In-flight frames are not drained.
    pub fn close(&self) {
        debug!(connection_id = %self.connection_id(), "Closing session");
        self.inner.connection.shutdown();
    }

    /// Returns `true` once the transport has ended.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.connection.is_closed()
    }

    /// Returns the connection token sent in the handshake.
    #[inline]
    #[must_use]
    pub fn connection_id(&self) -> ConnectionId {
        self.inner.channel.connection_id()
    }

    /// Returns the sender token sent in the handshake.
    #[inline]
    #[must_use]
    pub fn sender_id(&self) -> SenderId {
        self.inner.channel.sender_id()
    }

    /// Returns the page this session drives.
    #[inline]
    #[must_use]
    pub fn page_id(&self) -> PageId {
        self.inner.channel.page_id()
    }

    /// Returns the application this session drives.
    #[inline]
    #[must_use]
    pub fn application_id(&self) -> &str {
        self.inner.channel.application_id()
    }

    /// Encodes and queues one message. Nothing is queued if encoding fails.
    fn send(&self, message: Message) -> Result<()> {
        let frame = self.inner.codec.encode(message)?;
        self.inner.connection.send(frame)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, duplex};
    use tokio::time::timeout;

    use crate::protocol::{Selector, keys};
    use crate::transport::{Decoded, LENGTH_PREFIX_LEN};

    const WAIT: Duration = Duration::from_secs(5);

    async fn read_message(device: &mut DuplexStream) -> Message {
        let mut prefix = [0u8; LENGTH_PREFIX_LEN];
        timeout(WAIT, device.read_exact(&mut prefix))
            .await
            .expect("timely")
            .expect("prefix");
        let mut payload = vec![0u8; u32::from_be_bytes(prefix) as usize];
        device.read_exact(&mut payload).await.expect("payload");

        let mut frame = prefix.to_vec();
        frame.extend(payload);
        match FrameCodec::default().try_decode(&frame).expect("decode") {
            Decoded::Frame {
                value: Some(value), ..
            } => Message::from_value(value).expect("message"),
            other => panic!("unexpected decode result: {other:?}"),
        }
    }

    async fn reply(device: &mut DuplexStream, message: Message) {
        let frame = FrameCodec::default().encode(message).expect("encode");
        device.write_all(&frame).await.expect("write");
    }

    fn driver() -> (Driver, DuplexStream) {
        let (client, device) = duplex(64 * 1024);
        let driver = Driver::from_stream(client, DriverOptions::default()).expect("driver");
        (driver, device)
    }

    #[tokio::test]
    async fn test_handshake_is_sent_in_order() {
        let (driver, mut device) = driver();

        let identify = read_message(&mut device).await;
        let listing = read_message(&mut device).await;
        let setup = read_message(&mut device).await;

        assert_eq!(identify.selector, Selector::ReportIdentifier);
        assert_eq!(listing.selector, Selector::ForwardGetListing);
        assert_eq!(setup.selector, Selector::ForwardSocketSetup);

        let connection_id = driver.connection_id().to_string();
        assert_eq!(
            identify.get_str(keys::CONNECTION_IDENTIFIER),
            Some(connection_id.as_str())
        );
        assert_eq!(
            setup.get_str(keys::SENDER),
            Some(driver.sender_id().to_string().as_str())
        );
    }

    #[tokio::test]
    async fn test_send_command_returns_increasing_ids() {
        let (driver, mut device) = driver();
        for _ in 0..3 {
            read_message(&mut device).await;
        }

        let first = driver.send_command("Page.reload", json!({})).expect("send");
        let second = driver
            .send_command("Runtime.evaluate", json!({ "expression": "1" }))
            .expect("send");
        assert_eq!(first, MessageId::new(0));
        assert_eq!(second, MessageId::new(1));

        let message = read_message(&mut device).await;
        assert_eq!(message.selector, Selector::ForwardSocketData);
        let data = message
            .get(keys::SOCKET_DATA)
            .and_then(plist::Value::as_data)
            .expect("data");
        let body: serde_json::Value = serde_json::from_slice(data).expect("json");
        assert_eq!(body, json!({ "id": 0, "method": "Page.reload", "params": {} }));
    }

    #[tokio::test]
    async fn test_webview_indicator_is_sent() {
        let (driver, mut device) = driver();
        for _ in 0..3 {
            read_message(&mut device).await;
        }

        driver.set_webview_indicator(false).expect("send");

        let message = read_message(&mut device).await;
        assert_eq!(message.selector, Selector::ForwardIndicateWebView);
        assert_eq!(
            message
                .get(keys::INDICATE_ENABLED)
                .and_then(plist::Value::as_boolean),
            Some(false)
        );
    }

    #[tokio::test]
    async fn test_replies_update_state_and_emit_events() {
        let (driver, mut device) = driver();
        let mut events = driver.subscribe();

        reply(
            &mut device,
            Message::new(Selector::ReportSetup)
                .with(keys::SIMULATOR_NAME, "iPhone 6")
                .with(keys::SIMULATOR_BUILD, "12A365"),
        )
        .await;
        reply(
            &mut device,
            Message::new(Selector::ReportConnectedApplicationList)
                .with(keys::APPLICATION_DICTIONARY, plist::Dictionary::new()),
        )
        .await;

        let event = timeout(WAIT, events.recv()).await.expect("timely").expect("event");
        assert_eq!(event, SessionEvent::Open);

        let device_info = driver.device().expect("device");
        assert_eq!(device_info.name, "iPhone 6");
        assert_eq!(device_info.version.as_deref(), Some("12A365"));
    }

    #[tokio::test]
    async fn test_close_ends_session() {
        let (driver, mut device) = driver();
        driver.close();

        let mut rest = Vec::new();
        timeout(WAIT, device.read_to_end(&mut rest))
            .await
            .expect("timely")
            .expect("read");

        timeout(WAIT, async {
            while !driver.is_closed() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("closed");

        assert!(driver.send_command("Page.reload", json!({})).is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_reply_before_subscribe_is_kept() {
        let (client, mut device) = duplex(64 * 1024);
        reply(
            &mut device,
            Message::new(Selector::ReportConnectedApplicationList)
                .with(keys::APPLICATION_DICTIONARY, plist::Dictionary::new()),
        )
        .await;

        let driver = Driver::from_stream(client, DriverOptions::default()).expect("driver");
        timeout(WAIT, async {
            while driver.applications().is_none() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("reply dispatched");

        let mut events = driver.subscribe();
        let event = timeout(WAIT, events.recv()).await.expect("timely").expect("event");
        assert_eq!(event, SessionEvent::Open);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_builder_callback_sees_first_reply() {
        let (client, mut device) = duplex(64 * 1024);
        reply(&mut device, Message::new(Selector::ApplicationDisconnected)).await;

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let _driver = Driver::builder()
            .on_event(move |event| {
                let _ = tx.send(event.clone());
            })
            .attach(client)
            .expect("driver");

        let event = timeout(WAIT, rx.recv()).await.expect("timely").expect("event");
        assert_eq!(event, SessionEvent::Close);
    }

    #[tokio::test]
    async fn test_invalid_options_rejected() {
        let (client, _device) = duplex(64);
        let result = Driver::from_stream(client, DriverOptions::default().with_port(0));
        assert!(result.is_err());
    }
}
