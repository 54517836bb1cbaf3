//! Wire primitives
//!
//! VarInt is the protocol's LEB128-style integer: 7 data bits per byte,
//! high bit set on every byte but the last, at most 5 bytes for an i32.

use bytes::{Buf, BufMut};

/// Longest encoded VarInt
pub const MAX_VARINT_LEN: usize = 5;

/// Write a VarInt
pub fn put_varint<B: BufMut>(buf: &mut B, value: i32) {
    let mut value = value as u32;
    loop {
        if value & !0x7F == 0 {
            buf.put_u8(value as u8);
            return;
        }
        buf.put_u8((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
}

/// Encoded size of a VarInt
pub fn varint_len(value: i32) -> usize {
    let value = value as u32;
    match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        0x20_0000..=0x0FFF_FFFF => 4,
        _ => 5,
    }
}

/// Read a VarInt, or `None` if the buffer ends early or the value is too long
pub fn get_varint<B: Buf>(buf: &mut B) -> Option<i32> {
    let mut result: u32 = 0;
    for i in 0..MAX_VARINT_LEN {
        if !buf.has_remaining() {
            return None;
        }
        let byte = buf.get_u8();
        result |= ((byte & 0x7F) as u32) << (7 * i);
        if byte & 0x80 == 0 {
            return Some(result as i32);
        }
    }
    None
}

/// Write a UUID as two big-endian longs
pub fn put_uuid<B: BufMut>(buf: &mut B, uuid: &uuid::Uuid) {
    buf.put_u128(uuid.as_u128());
}

/// Write an angle in degrees as a 1/256-turn step
pub fn put_angle<B: BufMut>(buf: &mut B, degrees: f32) {
    let steps = (degrees.rem_euclid(360.0) * 256.0 / 360.0) as u32;
    buf.put_u8(steps as u8);
}

/// Write a boolean
pub fn put_bool<B: BufMut>(buf: &mut B, value: bool) {
    buf.put_u8(value as u8);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn test_varint_known_encodings() {
        let cases: [(i32, &[u8]); 7] = [
            (0, &[0x00]),
            (1, &[0x01]),
            (127, &[0x7F]),
            (128, &[0x80, 0x01]),
            (25565, &[0xDD, 0xC7, 0x01]),
            (2147483647, &[0xFF, 0xFF, 0xFF, 0xFF, 0x07]),
            (-1, &[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]),
        ];

        for (value, expected) in cases {
            let mut buf = BytesMut::new();
            put_varint(&mut buf, value);
            assert_eq!(&buf[..], expected, "value {}", value);
            assert_eq!(varint_len(value), expected.len());
            assert_eq!(get_varint(&mut &buf[..]), Some(value));
        }
    }

    #[test]
    fn test_varint_truncated() {
        assert_eq!(get_varint(&mut &[0x80u8][..]), None);
        assert_eq!(get_varint(&mut &[0xFFu8, 0xFF, 0xFF, 0xFF, 0xFF, 0x01][..]), None);
    }

    #[test]
    fn test_angle() {
        let mut buf = BytesMut::new();
        put_angle(&mut buf, 0.0);
        put_angle(&mut buf, 90.0);
        put_angle(&mut buf, 180.0);
        put_angle(&mut buf, -90.0);
        assert_eq!(&buf[..], &[0, 64, 128, 192]);
    }

    #[test]
    fn test_uuid_layout() {
        let id = uuid::Uuid::from_u128(0x0102030405060708090A0B0C0D0E0F10);
        let mut buf = BytesMut::new();
        put_uuid(&mut buf, &id);
        assert_eq!(buf[0], 0x01);
        assert_eq!(buf[15], 0x10);
    }
}
