//! Encoded packets
//!
//! A [`Packet`] is the packet id plus body, already serialized. The length
//! frame (and compression, if the host uses it) is added by the stage the
//! packet is written to.

use bytes::{BufMut, Bytes, BytesMut};

use super::codec::put_varint;
use super::constants::*;

/// What a packet does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    /// Places an item frame entity
    SpawnEntity,
    /// Puts a filled map into an item frame
    EntityMetadata,
    /// Map pixel contents
    MapData,
    /// Removes item frame entities
    DestroyEntities,
}

impl PacketKind {
    /// Packet id for the supported protocol version
    pub fn id(self) -> i32 {
        match self {
            PacketKind::SpawnEntity => PACKET_SPAWN_ENTITY,
            PacketKind::EntityMetadata => PACKET_ENTITY_METADATA,
            PacketKind::MapData => PACKET_MAP_DATA,
            PacketKind::DestroyEntities => PACKET_DESTROY_ENTITIES,
        }
    }
}

impl std::fmt::Display for PacketKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PacketKind::SpawnEntity => "spawn_entity",
            PacketKind::EntityMetadata => "entity_metadata",
            PacketKind::MapData => "map_data",
            PacketKind::DestroyEntities => "destroy_entities",
        };
        write!(f, "{}", name)
    }
}

/// An immutable, fully encoded packet
///
/// Cheap to clone: the bytes are reference counted, so one packet can be
/// written to many connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    kind: PacketKind,
    data: Bytes,
}

impl Packet {
    /// Prefix `body` with the kind's packet id
    pub fn new(kind: PacketKind, body: &[u8]) -> Self {
        let mut data = BytesMut::with_capacity(body.len() + 1);
        put_varint(&mut data, kind.id());
        data.put_slice(body);
        Self {
            kind,
            data: data.freeze(),
        }
    }

    pub fn kind(&self) -> PacketKind {
        self.kind
    }

    /// Packet id followed by body
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
