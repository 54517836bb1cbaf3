//! Packet builder
//!
//! Turns a [`FrameDisplay`] into the packets that spawn, animate and destroy
//! it. Construction is pure; nothing here touches a connection.
//!
//! Packets are produced per cell in raster order. For spawn, each cell gets
//! its entity, its metadata and its map contents before the next cell starts.

use bytes::{BufMut, BytesMut};

use super::codec::{put_angle, put_bool, put_uuid, put_varint, varint_len};
use super::constants::*;
use super::packet::{Packet, PacketKind};
use crate::display::{Cell, FrameDisplay};
use crate::nbt::{encode_root, NbtCompound};

/// Options that change the shape of spawn packets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderOptions {
    /// Use glowing item frames
    pub glow: bool,
    /// Hide the item frame border
    pub invisible: bool,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            glow: false,
            invisible: true,
        }
    }
}

/// Builds spawn/update/destroy packets for displays
#[derive(Debug, Clone, Default)]
pub struct PacketBuilder {
    options: BuilderOptions,
}

impl PacketBuilder {
    pub fn new(options: BuilderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> BuilderOptions {
        self.options
    }

    /// Packets that place every cell and show frame 0
    pub fn spawn(&self, display: &FrameDisplay) -> Vec<Packet> {
        let frame = display.frame(0);
        let mut packets = Vec::with_capacity(display.cells().len() * 3);

        for cell in display.cells() {
            packets.push(self.spawn_entity(display, cell));
            packets.push(self.entity_metadata(cell));
            packets.push(map_data(cell.map_id, &frame[cell.index]));
        }

        packets
    }

    /// Map contents of every cell for one frame
    pub fn frame_update(&self, display: &FrameDisplay, frame_index: usize) -> Vec<Packet> {
        let frame = display.frame(frame_index);
        display
            .cells()
            .iter()
            .map(|cell| map_data(cell.map_id, &frame[cell.index]))
            .collect()
    }

    /// One destroy packet per cell
    pub fn destroy(&self, display: &FrameDisplay) -> Vec<Packet> {
        display
            .cells()
            .iter()
            .map(|cell| destroy_entities(&[cell.entity_id]))
            .collect()
    }

    fn spawn_entity(&self, display: &FrameDisplay, cell: &Cell) -> Packet {
        let facing = display.facing();
        let entity_type = if self.options.glow {
            ENTITY_GLOW_ITEM_FRAME
        } else {
            ENTITY_ITEM_FRAME
        };

        let mut body = BytesMut::with_capacity(64);
        put_varint(&mut body, cell.entity_id);
        put_uuid(&mut body, &cell.entity_uuid);
        put_varint(&mut body, entity_type);
        body.put_f64(cell.block.x as f64 + 0.5);
        body.put_f64(cell.block.y as f64 + 0.5);
        body.put_f64(cell.block.z as f64 + 0.5);
        put_angle(&mut body, 0.0); // pitch
        put_angle(&mut body, facing.yaw());
        body.put_i32(facing.orientation());
        // velocity
        body.put_i16(0);
        body.put_i16(0);
        body.put_i16(0);

        Packet::new(PacketKind::SpawnEntity, &body)
    }

    fn entity_metadata(&self, cell: &Cell) -> Packet {
        let flags = if self.options.invisible {
            FLAG_INVISIBLE
        } else {
            0
        };
        let tag = encode_root(&NbtCompound::new().with("map", cell.map_id));

        let mut body = BytesMut::with_capacity(32 + tag.len());
        put_varint(&mut body, cell.entity_id);

        body.put_u8(META_INDEX_FLAGS);
        put_varint(&mut body, META_TYPE_BYTE);
        body.put_u8(flags);

        body.put_u8(META_INDEX_ITEM);
        put_varint(&mut body, META_TYPE_SLOT);
        put_bool(&mut body, true);
        put_varint(&mut body, ITEM_FILLED_MAP);
        body.put_i8(1);
        body.put_slice(&tag);

        body.put_u8(META_INDEX_ROTATION);
        put_varint(&mut body, META_TYPE_VARINT);
        put_varint(&mut body, 0);

        body.put_u8(META_END);

        Packet::new(PacketKind::EntityMetadata, &body)
    }
}

/// Full-map content packet
pub fn map_data(map_id: i32, pixels: &[u8]) -> Packet {
    let mut body = BytesMut::with_capacity(pixels.len() + 16);
    put_varint(&mut body, map_id);
    body.put_i8(0); // scale
    put_bool(&mut body, false); // locked
    put_bool(&mut body, false); // no icons
    body.put_u8(MAP_SIZE as u8);
    body.put_u8(MAP_SIZE as u8);
    body.put_u8(0);
    body.put_u8(0);
    put_varint(&mut body, pixels.len() as i32);
    body.put_slice(pixels);

    Packet::new(PacketKind::MapData, &body)
}

/// Destroy packet for a set of entity ids
pub fn destroy_entities(entity_ids: &[i32]) -> Packet {
    let len = varint_len(entity_ids.len() as i32)
        + entity_ids.iter().map(|&id| varint_len(id)).sum::<usize>();
    let mut body = BytesMut::with_capacity(len);
    put_varint(&mut body, entity_ids.len() as i32);
    for &id in entity_ids {
        put_varint(&mut body, id);
    }

    Packet::new(PacketKind::DestroyEntities, &body)
}
