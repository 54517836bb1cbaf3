//! NBT encoder
//!
//! Layout of a named tag:
//! ```text
//! +---------+-----------------+------------+---------+
//! | type u8 | name len u16 BE | name UTF-8 | payload |
//! +---------+-----------------+------------+---------+
//! ```
//!
//! Payloads are big-endian. Lists write `element type u8 | count i32` and
//! then bare payloads. Compounds write their named children and finish with a
//! single End (0x00) byte.

use bytes::{BufMut, Bytes, BytesMut};

use super::tag::{NbtCompound, NbtList, NbtTag, TAG_COMPOUND, TAG_END};

/// NBT encoder
pub struct NbtEncoder {
    buf: BytesMut,
}

impl NbtEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(64),
        }
    }

    /// Create encoder with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Get the encoded bytes and reset encoder
    pub fn finish(&mut self) -> Bytes {
        self.buf.split().freeze()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Encode a tag with its type id and name
    pub fn encode_named(&mut self, name: &str, tag: &NbtTag) {
        write_named(&mut self.buf, name, tag);
    }

    /// Encode a compound as a root tag with an empty name
    pub fn encode_root(&mut self, root: &NbtCompound) {
        self.buf.put_u8(TAG_COMPOUND);
        write_string(&mut self.buf, "");
        write_compound(&mut self.buf, root);
    }
}

impl Default for NbtEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a named tag into any buffer
pub fn write_named<B: BufMut>(buf: &mut B, name: &str, tag: &NbtTag) {
    buf.put_u8(tag.type_id());
    write_string(buf, name);
    write_payload(buf, tag);
}

/// Write a tag's payload without type id or name (list element form)
pub fn write_payload<B: BufMut>(buf: &mut B, tag: &NbtTag) {
    match tag {
        NbtTag::Byte(v) => buf.put_i8(*v),
        NbtTag::Short(v) => buf.put_i16(*v),
        NbtTag::Int(v) => buf.put_i32(*v),
        NbtTag::Long(v) => buf.put_i64(*v),
        NbtTag::Float(v) => buf.put_f32(*v),
        NbtTag::Double(v) => buf.put_f64(*v),
        NbtTag::ByteArray(bytes) => {
            buf.put_i32(bytes.len() as i32);
            buf.put_slice(bytes);
        }
        NbtTag::String(s) => write_string(buf, s),
        NbtTag::List(list) => write_list(buf, list),
        NbtTag::Compound(compound) => write_compound(buf, compound),
    }
}

fn write_list<B: BufMut>(buf: &mut B, list: &NbtList) {
    buf.put_u8(list.element_type());
    buf.put_i32(list.len() as i32);
    for item in list.iter() {
        write_payload(buf, item);
    }
}

fn write_compound<B: BufMut>(buf: &mut B, compound: &NbtCompound) {
    for (name, tag) in compound.iter() {
        write_named(buf, name, tag);
    }
    buf.put_u8(TAG_END);
}

/// Write a UTF-8 string with u16 length prefix, truncated on a char boundary
fn write_string<B: BufMut>(buf: &mut B, s: &str) {
    let mut len = s.len().min(0xFFFF);
    while !s.is_char_boundary(len) {
        len -= 1;
    }
    if len < s.len() {
        tracing::warn!(
            bytes = s.len(),
            kept = len,
            "NBT string over 65535 bytes, truncated"
        );
    }
    buf.put_u16(len as u16);
    buf.put_slice(&s.as_bytes()[..len]);
}

/// Convenience function to encode a root compound
pub fn encode_root(root: &NbtCompound) -> Bytes {
    let mut encoder = NbtEncoder::new();
    encoder.encode_root(root);
    encoder.finish()
}
