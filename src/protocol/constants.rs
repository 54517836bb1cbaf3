//! Protocol constants
//!
//! Ids below are for protocol 756 (1.17.1), play state, clientbound.

/// Protocol version the packet layouts follow
pub const PROTOCOL_VERSION: i32 = 756;

// Packet ids
pub const PACKET_SPAWN_ENTITY: i32 = 0x00;
pub const PACKET_MAP_DATA: i32 = 0x27;
pub const PACKET_DESTROY_ENTITIES: i32 = 0x3A;
pub const PACKET_ENTITY_METADATA: i32 = 0x4D;

// Entity types
pub const ENTITY_GLOW_ITEM_FRAME: i32 = 32;
pub const ENTITY_ITEM_FRAME: i32 = 42;

/// Item id of `minecraft:filled_map`
pub const ITEM_FILLED_MAP: i32 = 886;

// Entity metadata
pub const META_INDEX_FLAGS: u8 = 0;
pub const META_INDEX_ITEM: u8 = 8;
pub const META_INDEX_ROTATION: u8 = 9;
pub const META_TYPE_BYTE: i32 = 0;
pub const META_TYPE_VARINT: i32 = 1;
pub const META_TYPE_SLOT: i32 = 6;
pub const META_END: u8 = 0xFF;

/// Entity flag bit for invisibility
pub const FLAG_INVISIBLE: u8 = 0x20;

/// Side length of a map in pixels
pub const MAP_SIZE: u32 = 128;

/// Pixels per map
pub const MAP_PIXELS: usize = (MAP_SIZE * MAP_SIZE) as usize;
