//! Byte-stream connection and its I/O tasks.
//!
//! # Event Loop
//!
//! The connection splits the stream and spawns two tokio tasks:
//!
//! - The read loop reassembles inbound bytes into frames and passes them to
//!   the frame handler
//! - The write loop drains frames queued by [`Connection::send`] and handles
//!   shutdown requests
//!
//! A write stalled by a full peer window never holds up reading. When either
//! loop ends, the other follows and the stream is closed.
//!
//! The frame handler runs on the read loop, one frame at a time in arrival
//! order. Sending only enqueues, so a handler may send without blocking.

// ============================================================================
// Imports
// ============================================================================

use std::net::SocketAddr;

use plist::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, trace};

use crate::error::{Error, Result};

use super::buffer::ReassemblyBuffer;
use super::codec::FrameCodec;

// ============================================================================
// Constants
// ============================================================================

/// Size of a single transport read.
const READ_CHUNK_LEN: usize = 16 * 1024;

// ============================================================================
// Types
// ============================================================================

/// Callback receiving each decoded frame payload.
pub type FrameHandler = Box<dyn FnMut(Value) + Send>;

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the write loop.
enum ConnectionCommand {
    /// Write an encoded frame.
    Send(Vec<u8>),
    /// Close the stream.
    Shutdown,
}

// ============================================================================
// Connection
// ============================================================================

/// Duplex connection to the inspector daemon.
///
/// Cloning shares the same I/O tasks.
#[derive(Clone)]
pub struct Connection {
    /// Channel for sending commands to the write loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
}

impl Connection {
    /// Opens a TCP connection and starts the I/O tasks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the socket cannot be opened.
    pub async fn connect(
        addr: SocketAddr,
        codec: FrameCodec,
        on_frame: FrameHandler,
    ) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| Error::connection(format!("{addr}: {e}")))?;
        stream.set_nodelay(true)?;

        debug!(%addr, "Connected to inspector");

        Ok(Self::new(stream, codec, on_frame))
    }

    /// Starts the I/O tasks over an already-open stream.
    pub fn new<S>(stream: S, codec: FrameCodec, on_frame: FrameHandler) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (reader, writer) = tokio::io::split(stream);

        // Each loop holds a sender whose drop tells the other loop to stop.
        let (reader_alive, reader_gone) = oneshot::channel();
        let (writer_alive, writer_gone) = oneshot::channel();

        tokio::spawn(Self::run_read_loop(
            reader,
            ReassemblyBuffer::new(codec),
            on_frame,
            writer_gone,
            reader_alive,
        ));
        tokio::spawn(Self::run_write_loop(
            writer,
            command_rx,
            reader_gone,
            writer_alive,
        ));

        Self { command_tx }
    }

    /// Queues an encoded frame for writing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the write loop has ended.
    pub fn send(&self, frame: Vec<u8>) -> Result<()> {
        self.command_tx
            .send(ConnectionCommand::Send(frame))
            .map_err(|_| Error::ConnectionClosed)
    }

    /// Returns `true` once the write loop has ended.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    /// Closes the stream. Pending inbound bytes are discarded.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }

    /// Reads inbound bytes until EOF, a fatal error, or the write loop ends.
    async fn run_read_loop<R>(
        mut reader: R,
        mut buffer: ReassemblyBuffer,
        mut on_frame: FrameHandler,
        mut writer_gone: oneshot::Receiver<()>,
        _alive: oneshot::Sender<()>,
    ) where
        R: AsyncRead + Unpin,
    {
        let mut chunk = vec![0u8; READ_CHUNK_LEN];

        loop {
            tokio::select! {
                read = reader.read(&mut chunk) => {
                    match read {
                        Ok(0) => {
                            debug!("Inspector closed the stream");
                            break;
                        }

                        Ok(n) => {
                            trace!(bytes = n, "Received");
                            if let Err(e) = buffer.push(&chunk[..n], |value| on_frame(value)) {
                                error!(error = %e, pending = buffer.len(), "Closing session");
                                break;
                            }
                        }

                        Err(e) => {
                            error!(error = %e, "Transport read failed");
                            break;
                        }
                    }
                }

                _ = &mut writer_gone => {
                    debug!("Write loop ended");
                    break;
                }
            }
        }

        debug!(discarded = buffer.len(), "Read loop terminated");
    }

    /// Writes queued frames until shutdown, a write error, or the read loop ends.
    async fn run_write_loop<W>(
        mut writer: W,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        mut reader_gone: oneshot::Receiver<()>,
        _alive: oneshot::Sender<()>,
    ) where
        W: AsyncWrite + Unpin,
    {
        loop {
            tokio::select! {
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send(frame)) => {
                            if let Err(e) = writer.write_all(&frame).await {
                                error!(error = %e, "Transport write failed");
                                break;
                            }
                            trace!(bytes = frame.len(), "Frame sent");
                        }

                        Some(ConnectionCommand::Shutdown) => {
                            debug!("Shutdown command received");
                            break;
                        }

                        None => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }

                _ = &mut reader_gone => {
                    debug!("Read loop ended");
                    break;
                }
            }
        }

        drop(command_rx);
        let _ = writer.shutdown().await;
        debug!("Write loop terminated");
    }
}

// ============================================================================
// Tests
// ============================================================================
