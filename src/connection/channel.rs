//! Channel-backed pipeline
//!
//! Packets are framed and appended to a per-connection buffer. `flush` hands
//! the buffer to a writer task as one batch. `write_batch` frames its packets
//! privately and queues them as their own batch, so a frame's cells always
//! reach the socket together even with other writers active.
//!
//! ```text
//!   write_at ──► [len|id|body][len|id|body]...   (Mutex<BytesMut>)
//!                          │ flush
//!                          ▼
//!                 mpsc::Sender<Bytes> ──► writer task ──► AsyncWrite
//!                          ▲
//!   write_batch ───────────┘
//! ```

use std::sync::Mutex;

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::pipeline::Pipeline;
use crate::error::{ProtocolError, WriteError};
use crate::protocol::codec::{put_varint, varint_len};
use crate::protocol::Packet;

/// Flushed batches a connection may have queued before writes are refused
pub const DEFAULT_QUEUE_DEPTH: usize = 256;

/// Buffered pipeline feeding a writer task
pub struct ChannelPipeline {
    handlers: Vec<String>,
    pending: Mutex<BytesMut>,
    tx: mpsc::Sender<Bytes>,
}

impl ChannelPipeline {
    /// Create a pipeline and the receiving end for its writer
    pub fn new(handlers: Vec<String>, queue_depth: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(queue_depth.max(1));

        let pipeline = Self {
            handlers,
            pending: Mutex::new(BytesMut::new()),
            tx,
        };

        (pipeline, rx)
    }

    /// Spawn a task that copies flushed batches to `writer`
    ///
    /// The task ends when the pipeline is dropped or the writer fails.
    pub fn spawn_writer<W>(mut rx: mpsc::Receiver<Bytes>, mut writer: W) -> JoinHandle<std::io::Result<()>>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        tokio::spawn(async move {
            while let Some(batch) = rx.recv().await {
                if let Err(e) = writer.write_all(&batch).await {
                    tracing::debug!(error = %e, bytes = batch.len(), "Writer failed");
                    return Err(e);
                }
                writer.flush().await?;
            }
            Ok(())
        })
    }

    /// Bytes written but not yet flushed
    pub fn pending_bytes(&self) -> usize {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn check_handler(&self, handler: &str) -> Result<(), WriteError> {
        if !self.handlers.iter().any(|h| h == handler) {
            return Err(ProtocolError::UnknownHandler(handler.to_string()).into());
        }
        if self.tx.is_closed() {
            return Err(WriteError::Closed);
        }
        Ok(())
    }

    fn send(&self, batch: Bytes) -> Result<(), WriteError> {
        self.tx.try_send(batch).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => WriteError::Io("outbound queue full".into()),
            mpsc::error::TrySendError::Closed(_) => WriteError::Closed,
        })
    }
}

fn put_framed(buf: &mut BytesMut, packet: &Packet) {
    let len = packet.len() as i32;
    buf.reserve(varint_len(len) + packet.len());
    put_varint(buf, len);
    buf.put_slice(packet.data());
}

impl Pipeline for ChannelPipeline {
    fn handler_names(&self) -> Vec<String> {
        self.handlers.clone()
    }

    fn write_at(&self, handler: &str, packet: &Packet) -> Result<(), WriteError> {
        self.check_handler(handler)?;

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        put_framed(&mut pending, packet);
        Ok(())
    }

    fn flush(&self) -> Result<(), WriteError> {
        // held across the send so batches keep their order
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if pending.is_empty() {
            return Ok(());
        }
        let batch = pending.split().freeze();
        self.send(batch)
    }

    fn write_batch(&self, handler: &str, packets: &[Packet]) -> Result<(), WriteError> {
        self.check_handler(handler)?;
        if packets.is_empty() {
            return Ok(());
        }

        let mut batch = BytesMut::new();
        for packet in packets {
            put_framed(&mut batch, packet);
        }

        let _order = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        self.send(batch.freeze())
    }
}

impl std::fmt::Debug for ChannelPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelPipeline")
            .field("handlers", &self.handlers)
            .field("pending_bytes", &self.pending_bytes())
            .finish()
    }
}
