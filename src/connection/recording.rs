//! In-memory pipeline that records what was written
//!
//! Useful for host-side tests and for checking packet ordering without a
//! socket.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::context::DEFAULT_ENCODER_MARKER;
use super::pipeline::Pipeline;
use crate::error::{ProtocolError, WriteError};
use crate::protocol::{Packet, PacketKind};

/// Pipeline that keeps every flushed batch
#[derive(Debug)]
pub struct RecordingPipeline {
    handlers: Vec<String>,
    pending: Mutex<Vec<Packet>>,
    flushed: Mutex<Vec<Vec<Packet>>>,
    writes: AtomicUsize,
    failing: AtomicBool,
}

impl RecordingPipeline {
    pub fn new(handlers: Vec<String>) -> Self {
        Self {
            handlers,
            pending: Mutex::new(Vec::new()),
            flushed: Mutex::new(Vec::new()),
            writes: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// A typical chain with the marker in front of `encoder`
    pub fn with_marker() -> Self {
        Self::new(
            [
                "splitter",
                "decoder",
                "prepender",
                DEFAULT_ENCODER_MARKER,
                "encoder",
                "packet_handler",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        )
    }

    /// Make every later write fail as if the client had disconnected
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    /// Flushed batches, oldest first
    pub fn batches(&self) -> Vec<Vec<Packet>> {
        self.flushed.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// All flushed packets in write order
    pub fn packets(&self) -> Vec<Packet> {
        self.batches().into_iter().flatten().collect()
    }

    /// Flushed packets of one kind
    pub fn packets_of(&self, kind: PacketKind) -> Vec<Packet> {
        self.packets()
            .into_iter()
            .filter(|p| p.kind() == kind)
            .collect()
    }

    /// Packets written but not yet flushed
    pub fn pending(&self) -> usize {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Successful writes, flushed or not
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).clear();
        self.flushed.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl Pipeline for RecordingPipeline {
    fn handler_names(&self) -> Vec<String> {
        self.handlers.clone()
    }

    fn write_at(&self, handler: &str, packet: &Packet) -> Result<(), WriteError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(WriteError::Closed);
        }
        if !self.handlers.iter().any(|h| h == handler) {
            return Err(ProtocolError::UnknownHandler(handler.to_string()).into());
        }

        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(packet.clone());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn flush(&self) -> Result<(), WriteError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(WriteError::Closed);
        }

        let batch: Vec<Packet> = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect();
        if !batch.is_empty() {
            self.flushed
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(batch);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_batches() {
        let pipeline = RecordingPipeline::with_marker();
        let packet = Packet::new(PacketKind::MapData, &[1]);

        pipeline.write_at("encoder", &packet).unwrap();
        pipeline.write_at("encoder", &packet).unwrap();
        assert_eq!(pipeline.pending(), 2);
        assert!(pipeline.batches().is_empty());

        pipeline.flush().unwrap();
        assert_eq!(pipeline.pending(), 0);
        assert_eq!(pipeline.batches().len(), 1);
        assert_eq!(pipeline.packets_of(PacketKind::MapData).len(), 2);

        // empty flushes add nothing
        pipeline.flush().unwrap();
        assert_eq!(pipeline.batches().len(), 1);
    }

    #[test]
    fn test_unknown_handler() {
        let pipeline = RecordingPipeline::with_marker();
        let packet = Packet::new(PacketKind::MapData, &[]);

        let err = pipeline.write_at("nope", &packet).unwrap_err();
        assert!(!err.is_transient());
    }

    #[test]
    fn test_failing() {
        let pipeline = RecordingPipeline::with_marker();
        pipeline.set_failing(true);

        let packet = Packet::new(PacketKind::MapData, &[]);
        assert_eq!(pipeline.write_at("encoder", &packet), Err(WriteError::Closed));
        assert_eq!(pipeline.write_count(), 0);
    }
}
