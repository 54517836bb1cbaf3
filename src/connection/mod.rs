//! Connection write path
//!
//! Hosts register one [`Pipeline`] per connected client. Packets are written
//! at the encoder handler found by [`EncoderContext`], buffered, and pushed out
//! with one flush per logical update.
//!
//! # Failure isolation
//!
//! A write failure on one connection never stops a broadcast. Only
//! [`ProtocolError`](crate::error::ProtocolError) (the chain does not look
//! like this crate expects) is reported as fatal.

pub mod channel;
pub mod context;
pub mod map;
pub mod pipeline;
pub mod recording;

pub use channel::{ChannelPipeline, DEFAULT_QUEUE_DEPTH};
pub use context::{handler_after, EncoderContext, DEFAULT_ENCODER_MARKER};
pub use map::ConnectionMap;
pub use pipeline::Pipeline;
pub use recording::RecordingPipeline;
