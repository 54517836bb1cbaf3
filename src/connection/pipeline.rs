//! Raw write capability

use crate::error::WriteError;
use crate::protocol::Packet;

/// A connection's outbound handler chain, seen from outside
///
/// Implementations buffer writes until [`flush`](Pipeline::flush). A single
/// `write_at` must land in the buffer whole; concurrent writers may interleave
/// packets but never bytes within one packet.
///
/// This bypasses the host's typed message API, so what counts as a valid
/// packet depends on the protocol version the connection speaks.
pub trait Pipeline: Send + Sync {
    /// Handler names, head to tail
    fn handler_names(&self) -> Vec<String>;

    /// Queue an encoded packet at the named handler
    fn write_at(&self, handler: &str, packet: &Packet) -> Result<(), WriteError>;

    /// Push everything queued so far toward the socket
    fn flush(&self) -> Result<(), WriteError>;

    /// Write `packets` and flush them as one unit
    ///
    /// Implementations shared between concurrent writers should override
    /// this so another writer's flush cannot ship part of the batch.
    fn write_batch(&self, handler: &str, packets: &[Packet]) -> Result<(), WriteError> {
        for packet in packets {
            self.write_at(handler, packet)?;
        }
        self.flush()
    }
}
