//! Raw play-state packets
//!
//! Only the handful of clientbound packets a map display needs are modelled:
//! entity spawn, entity metadata, map data and entity destroy. Layouts follow
//! protocol 756; anything newer or older needs its own constants.

pub mod builder;
pub mod codec;
pub mod constants;
pub mod packet;

pub use builder::{destroy_entities, map_data, BuilderOptions, PacketBuilder};
pub use codec::{get_varint, put_varint, varint_len};
pub use packet::{Packet, PacketKind};
