//! End-to-end session tests against a fake inspector daemon.
//!
//! Each test binds a loopback listener, connects a [`Driver`] to it and
//! plays the daemon's side of the conversation frame by frame.

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use ios_webkit_driver::protocol::keys;
use ios_webkit_driver::transport::{Decoded, FrameCodec, LENGTH_PREFIX_LEN};
use ios_webkit_driver::{Driver, Message, MessageId, PageId, Selector, SessionEvent};
use plist::{Dictionary, Value};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::time::timeout;
use tokio_test::assert_ok;

// ============================================================================
// Fake Daemon
// ============================================================================

const WAIT: Duration = Duration::from_secs(5);

struct FakeDaemon {
    stream: TcpStream,
    codec: FrameCodec,
}

impl FakeDaemon {
    async fn read(&mut self) -> Message {
        let mut prefix = [0u8; LENGTH_PREFIX_LEN];
        timeout(WAIT, self.stream.read_exact(&mut prefix))
            .await
            .expect("frame in time")
            .expect("prefix");

        let mut frame = prefix.to_vec();
        frame.resize(LENGTH_PREFIX_LEN + u32::from_be_bytes(prefix) as usize, 0);
        self.stream
            .read_exact(&mut frame[LENGTH_PREFIX_LEN..])
            .await
            .expect("payload");

        match self.codec.try_decode(&frame).expect("decode") {
            Decoded::Frame {
                value: Some(value), ..
            } => Message::from_value(value).expect("message"),
            other => panic!("unexpected decode result: {other:?}"),
        }
    }

    async fn write(&mut self, message: Message) {
        let frame = self.codec.encode(message).expect("encode");
        self.stream.write_all(&frame).await.expect("write");
    }

    async fn write_chunked(&mut self, message: Message, chunk: usize) {
        let frame = self.codec.encode(message).expect("encode");
        for piece in frame.chunks(chunk) {
            self.stream.write_all(piece).await.expect("write");
            self.stream.flush().await.expect("flush");
            tokio::task::yield_now().await;
        }
    }

    async fn command_body(&mut self) -> serde_json::Value {
        let message = self.read().await;
        assert_eq!(message.selector, Selector::ForwardSocketData);
        let data = message
            .get(keys::SOCKET_DATA)
            .and_then(Value::as_data)
            .expect("socket data");
        serde_json::from_slice(data).expect("json body")
    }
}

async fn connect() -> (Driver, FakeDaemon) {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let port = listener.local_addr().expect("addr").port();

    let (driver, accepted) = tokio::join!(
        Driver::builder()
            .host(IpAddr::V4(Ipv4Addr::LOCALHOST))
            .port(port)
            .connect(),
        listener.accept(),
    );

    let (stream, _) = accepted.expect("accept");
    let daemon = FakeDaemon {
        stream,
        codec: FrameCodec::default(),
    };

    (driver.expect("driver"), daemon)
}

async fn next_event(events: &mut broadcast::Receiver<SessionEvent>) -> SessionEvent {
    timeout(WAIT, events.recv())
        .await
        .expect("event in time")
        .expect("event")
}

fn application_list() -> Message {
    let mut safari = Dictionary::new();
    safari.insert(
        keys::APPLICATION_IDENTIFIER.into(),
        "com.apple.mobilesafari".into(),
    );
    safari.insert(keys::APPLICATION_NAME.into(), "Safari".into());
    safari.insert(keys::IS_APPLICATION_PROXY.into(), false.into());

    let mut applications = Dictionary::new();
    applications.insert("com.apple.mobilesafari".into(), Value::Dictionary(safari));

    Message::new(Selector::ReportConnectedApplicationList)
        .with(keys::APPLICATION_DICTIONARY, applications)
}

fn listing(pages: &[(u64, &str, &str)]) -> Message {
    let mut listing = Dictionary::new();
    for &(id, title, url) in pages {
        let mut entry = Dictionary::new();
        entry.insert(keys::PAGE_IDENTIFIER.into(), id.into());
        entry.insert(keys::TITLE.into(), title.into());
        entry.insert(keys::URL.into(), url.into());
        listing.insert(id.to_string(), Value::Dictionary(entry));
    }

    Message::new(Selector::ApplicationSentListing).with(keys::LISTING, listing)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn handshake_frames_arrive_in_order() {
    let (driver, mut daemon) = connect().await;

    let identify = daemon.read().await;
    assert_eq!(identify.selector, Selector::ReportIdentifier);
    assert_eq!(
        identify.get_str(keys::CONNECTION_IDENTIFIER),
        Some(driver.connection_id().to_string().as_str())
    );

    let get_listing = daemon.read().await;
    assert_eq!(get_listing.selector, Selector::ForwardGetListing);
    assert_eq!(
        get_listing.get_str(keys::APPLICATION_IDENTIFIER),
        Some("com.apple.mobilesafari")
    );

    let setup = daemon.read().await;
    assert_eq!(setup.selector, Selector::ForwardSocketSetup);
    assert_eq!(
        setup.get_str(keys::SENDER),
        Some(driver.sender_id().to_string().as_str())
    );
    assert_eq!(
        setup.get(keys::PAGE_IDENTIFIER).and_then(Value::as_unsigned_integer),
        Some(1)
    );
}

#[tokio::test]
async fn reports_populate_session_state() {
    let (driver, mut daemon) = connect().await;
    let mut events = driver.subscribe();
    for _ in 0..3 {
        daemon.read().await;
    }

    daemon
        .write(
            Message::new(Selector::ReportSetup)
                .with(keys::SIMULATOR_NAME, "iPhone 15")
                .with(keys::SIMULATOR_BUILD, "21A328"),
        )
        .await;
    daemon.write(application_list()).await;
    assert_eq!(next_event(&mut events).await, SessionEvent::Open);

    let device = driver.device().expect("device");
    assert_eq!(device.name, "iPhone 15");
    assert_eq!(device.version.as_deref(), Some("21A328"));

    daemon
        .write(listing(&[
            (1, "Example", "https://example.com/"),
            (2, "Docs", "https://docs.rs/"),
        ]))
        .await;
    // Round-trip a disconnect so earlier reports are known to be applied.
    daemon
        .write(Message::new(Selector::ApplicationDisconnected))
        .await;
    assert_eq!(next_event(&mut events).await, SessionEvent::Close);

    let applications = driver.applications().expect("applications");
    let safari = applications.get("com.apple.mobilesafari").expect("safari");
    assert_eq!(safari.name, "Safari");
    assert!(!safari.is_proxy);

    let tabs = driver.tabs().expect("tabs");
    assert_eq!(tabs.len(), 2);
    assert_eq!(tabs[&PageId::new(2)].title, "Docs");
    assert_eq!(tabs[&PageId::new(1)].url, "https://example.com/");
}

#[tokio::test]
async fn later_listing_replaces_earlier() {
    let (driver, mut daemon) = connect().await;
    let mut events = driver.subscribe();

    daemon
        .write(listing(&[(1, "A", "https://a.test/"), (2, "B", "https://b.test/")]))
        .await;
    daemon.write(listing(&[(3, "C", "https://c.test/")])).await;
    daemon
        .write(Message::new(Selector::ApplicationDisconnected))
        .await;
    assert_eq!(next_event(&mut events).await, SessionEvent::Close);

    let tabs = driver.tabs().expect("tabs");
    assert_eq!(tabs.len(), 1);
    assert!(tabs.contains_key(&PageId::new(3)));
}

#[tokio::test]
async fn commands_carry_sequential_ids() {
    let (driver, mut daemon) = connect().await;
    for _ in 0..3 {
        daemon.read().await;
    }

    let ids = [
        assert_ok!(driver.send_command("Page.enable", json!({}))),
        assert_ok!(driver.send_command("Page.navigate", json!({ "url": "https://example.com" }))),
        assert_ok!(driver.send_command("Runtime.evaluate", json!({ "expression": "1 + 1" }))),
    ];
    assert_eq!(ids, [MessageId::new(0), MessageId::new(1), MessageId::new(2)]);

    assert_eq!(
        daemon.command_body().await,
        json!({ "id": 0, "method": "Page.enable", "params": {} })
    );
    assert_eq!(
        daemon.command_body().await,
        json!({ "id": 1, "method": "Page.navigate", "params": { "url": "https://example.com" } })
    );
    assert_eq!(
        daemon.command_body().await,
        json!({ "id": 2, "method": "Runtime.evaluate", "params": { "expression": "1 + 1" } })
    );
}

#[tokio::test]
async fn chunked_reply_is_delivered_once() {
    let (driver, mut daemon) = connect().await;
    let mut events = driver.subscribe();

    let reply = Message::new(Selector::ApplicationSentData)
        .with_data(keys::MESSAGE_DATA, br#"{"id":0,"result":{}}"#.to_vec());
    daemon.write_chunked(reply, 5).await;

    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::Message(r#"{"id":0,"result":{}}"#.into())
    );
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn callback_sees_events_in_order() {
    let (driver, mut daemon) = connect().await;
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    driver.set_event_handler(move |event| {
        let _ = tx.send(event.clone());
    });

    daemon.write(application_list()).await;
    daemon
        .write(
            Message::new(Selector::ApplicationSentData)
                .with_data(keys::MESSAGE_DATA, br#"{"method":"Page.loadEventFired"}"#.to_vec()),
        )
        .await;
    daemon
        .write(Message::new(Selector::ApplicationDisconnected))
        .await;

    let mut seen = Vec::new();
    for _ in 0..3 {
        seen.push(timeout(WAIT, rx.recv()).await.expect("timely").expect("event"));
    }

    assert_eq!(
        seen,
        vec![
            SessionEvent::Open,
            SessionEvent::Message(r#"{"method":"Page.loadEventFired"}"#.into()),
            SessionEvent::Close,
        ]
    );
}

#[tokio::test]
async fn oversized_frame_closes_session() {
    let (driver, mut daemon) = connect().await;
    for _ in 0..3 {
        daemon.read().await;
    }

    daemon
        .stream
        .write_all(&u32::MAX.to_be_bytes())
        .await
        .expect("write");

    let mut rest = Vec::new();
    timeout(WAIT, daemon.stream.read_to_end(&mut rest))
        .await
        .expect("closed in time")
        .expect("read");
    assert!(rest.is_empty());

    timeout(WAIT, async {
        while !driver.is_closed() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("driver closed");
}

#[tokio::test]
async fn unknown_selector_is_ignored() {
    let (driver, mut daemon) = connect().await;
    let mut events = driver.subscribe();

    daemon
        .write(Message::new(Selector::Unknown("_rpc_reportCurrentState:".into())))
        .await;
    daemon
        .write(Message::new(Selector::ApplicationDisconnected))
        .await;

    assert_eq!(next_event(&mut events).await, SessionEvent::Close);
    assert!(driver.device().is_none());
    assert!(!driver.is_closed());
}

async fn daemon_replying_on_accept() -> (u16, tokio::task::JoinHandle<TcpStream>) {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let port = listener.local_addr().expect("addr").port();

    let daemon = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let frame = FrameCodec::default()
            .encode(application_list())
            .expect("encode");
        stream.write_all(&frame).await.expect("write");
        stream
    });

    (port, daemon)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn subscribe_after_connect_sees_immediate_reply() {
    for _ in 0..50 {
        let (port, daemon) = daemon_replying_on_accept().await;

        let driver = Driver::builder()
            .host(IpAddr::V4(Ipv4Addr::LOCALHOST))
            .port(port)
            .connect()
            .await
            .expect("driver");
        let mut events = driver.subscribe();

        assert_eq!(next_event(&mut events).await, SessionEvent::Open);

        driver.close();
        drop(daemon.await.expect("daemon"));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn builder_callback_sees_immediate_reply() {
    let (port, daemon) = daemon_replying_on_accept().await;
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let driver = Driver::builder()
        .host(IpAddr::V4(Ipv4Addr::LOCALHOST))
        .port(port)
        .on_event(move |event| {
            let _ = tx.send(event.clone());
        })
        .connect()
        .await
        .expect("driver");

    let event = timeout(WAIT, rx.recv()).await.expect("timely").expect("event");
    assert_eq!(event, SessionEvent::Open);

    driver.close();
    drop(daemon.await.expect("daemon"));
}
