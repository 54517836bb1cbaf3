//! NBT (named binary tag) encoding
//!
//! Item slots inside entity metadata carry an NBT compound; this module
//! builds those trees and serializes them. Only encoding is needed on the
//! server side of the packets this crate sends.

pub mod encoder;
pub mod tag;

pub use encoder::{encode_root, write_named, write_payload, NbtEncoder};
pub use tag::{NbtCompound, NbtList, NbtTag};
