//! Base data types used throughout the protocol.

use std::fmt;

use bytes::{Buf, BufMut};
use thiserror::Error;

use crate::codec::{ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VarIntError {
    #[error("buffer too short")]
    BufferTooShort,
    #[error("VarInt is too long (more than {max_bytes} bytes)")]
    TooManyBytes { max_bytes: usize },
    #[error("value {value} does not fit in {width} VarInt bytes")]
    WidthTooSmall { value: u32, width: usize },
}

// ---------------------------------------------------------------------------
// VarInt (i32 — two's complement LEB128, NO ZigZag)
// ---------------------------------------------------------------------------

/// Signed 32-bit variable-length integer.
///
/// Negative values are encoded through their unsigned bit pattern, so they
/// always take the full five bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarInt(pub i32);

impl VarInt {
    /// Maximum bytes a VarInt can occupy.
    pub const MAX_BYTES: usize = 5;

    /// Minimal number of bytes needed to encode `value`.
    pub fn encoded_len(value: i32) -> usize {
        let bits = u32::BITS - (value as u32).leading_zeros();
        (bits.max(1) as usize).div_ceil(7)
    }

    /// Decode from a byte slice. Returns the value and the number of bytes consumed.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), VarIntError> {
        let mut decoder = VarIntDecoder::new();
        for (i, &byte) in buf.iter().enumerate() {
            if let Some(value) = decoder.step(byte)? {
                return Ok((VarInt(value as i32), i + 1));
            }
        }
        Err(VarIntError::BufferTooShort)
    }

    /// Encode into exactly `width` bytes, setting the continuation bit on every
    /// byte but the last even when the value would fit in fewer.
    ///
    /// Used to patch a length field that was reserved before the body it
    /// describes was written.
    pub fn encode_fixed_width(
        &self,
        width: usize,
        buf: &mut impl BufMut,
    ) -> Result<(), VarIntError> {
        let mut value = self.0 as u32;
        let fits = match width {
            0 => false,
            w if w >= Self::MAX_BYTES => w == Self::MAX_BYTES,
            w => value >> (7 * w) == 0,
        };
        if !fits {
            return Err(VarIntError::WidthTooSmall {
                value: self.0 as u32,
                width,
            });
        }
        for _ in 0..width - 1 {
            buf.put_u8((value & 0x7F | 0x80) as u8);
            value >>= 7;
        }
        buf.put_u8((value & 0x7F) as u8);
        Ok(())
    }
}

impl ProtoEncode for VarInt {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        let mut value = self.0 as u32;
        loop {
            if value & !0x7F == 0 {
                buf.put_u8(value as u8);
                return;
            }
            buf.put_u8((value & 0x7F | 0x80) as u8);
            value >>= 7;
        }
    }
}

impl ProtoDecode for VarInt {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let mut decoder = VarIntDecoder::new();
        while buf.has_remaining() {
            if let Some(value) = decoder.step(buf.get_u8())? {
                return Ok(VarInt(value as i32));
            }
        }
        Err(VarIntError::BufferTooShort.into())
    }
}

impl fmt::Debug for VarInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VarInt({})", self.0)
    }
}

impl fmt::Display for VarInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Incremental VarInt decoding
// ---------------------------------------------------------------------------

/// Resumable VarInt decoder fed one byte at a time.
///
/// Used where the number of prefix bytes is unknown in advance and input may
/// stop at any byte boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VarIntDecoder {
    value: u32,
    shift: u32,
}

impl VarIntDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one byte. Returns the decoded value once a byte with the high
    /// bit clear arrives; the decoder is then ready for the next value.
    pub fn step(&mut self, byte: u8) -> Result<Option<u32>, VarIntError> {
        self.value |= ((byte & 0x7F) as u32) << self.shift;
        if (byte & 0x80) == 0 {
            let value = self.value;
            self.reset();
            return Ok(Some(value));
        }
        self.shift += 7;
        if self.shift >= u32::BITS {
            self.reset();
            return Err(VarIntError::TooManyBytes {
                max_bytes: VarInt::MAX_BYTES,
            });
        }
        Ok(None)
    }

    /// Number of continuation bytes consumed for the value in progress.
    pub fn bytes_consumed(&self) -> usize {
        (self.shift / 7) as usize
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// BlockPosition (26-bit x, 12-bit y, 26-bit z packed into a u64)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Pack as `x << 38 | y << 26 | z`, truncating each axis to its field width.
    pub fn pack(&self) -> u64 {
        ((self.x as u64 & 0x3FF_FFFF) << 38)
            | ((self.y as u64 & 0xFFF) << 26)
            | (self.z as u64 & 0x3FF_FFFF)
    }

    /// Inverse of [`pack`](Self::pack), sign-extending every axis.
    pub fn unpack(packed: u64) -> Self {
        let x = (packed as i64) >> 38;
        let y = ((packed << 26) as i64) >> 52;
        let z = ((packed << 38) as i64) >> 38;
        Self {
            x: x as i32,
            y: y as i32,
            z: z as i32,
        }
    }
}

impl ProtoEncode for BlockPosition {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u64(self.pack());
    }
}

impl ProtoDecode for BlockPosition {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        if buf.remaining() < 8 {
            return Err(ProtoError::BufferTooShort {
                needed: 8,
                remaining: buf.remaining(),
            });
        }
        Ok(Self::unpack(buf.get_u64()))
    }
}

impl fmt::Display for BlockPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use proptest::prelude::*;

    /// Encode with `proto_encode`, then decode byte by byte with the
    /// incremental decoder, as the frame assembler does.
    fn roundtrip_varint(value: u32) -> (u32, usize) {
        let mut buf = BytesMut::new();
        VarInt(value as i32).proto_encode(&mut buf);
        let mut decoder = VarIntDecoder::new();
        for (i, byte) in buf.iter().enumerate() {
            if let Some(decoded) = decoder.step(*byte).unwrap() {
                assert_eq!(i + 1, buf.len(), "terminator before the last byte");
                return (decoded, buf.len());
            }
        }
        panic!("no terminator in {:02X?}", &buf[..]);
    }

    proptest! {
        #[test]
        fn varint_roundtrip_full_range(value in any::<u32>()) {
            let (decoded, written) = roundtrip_varint(value);
            prop_assert_eq!(decoded, value);
            prop_assert_eq!(written, VarInt::encoded_len(value as i32));
        }
    }

    #[test]
    fn varint_roundtrip_boundaries() {
        for value in [0u32, 127, 128, 16383, 16384, 2097151, 2097152, u32::MAX >> 1, u32::MAX] {
            let (decoded, written) = roundtrip_varint(value);
            assert_eq!(decoded, value);
            assert_eq!(written, VarInt::encoded_len(value as i32));
        }
    }

    #[test]
    fn varint_known_encodings() {
        let cases: &[(i32, &[u8])] = &[
            (0, &[0x00]),
            (1, &[0x01]),
            (127, &[0x7F]),
            (128, &[0x80, 0x01]),
            (255, &[0xFF, 0x01]),
            (25565, &[0xDD, 0xC7, 0x01]),
            (2097151, &[0xFF, 0xFF, 0x7F]),
            (i32::MAX, &[0xFF, 0xFF, 0xFF, 0xFF, 0x07]),
            (-1, &[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]),
        ];
        for (value, expected) in cases {
            let mut buf = BytesMut::new();
            VarInt(*value).proto_encode(&mut buf);
            assert_eq!(&buf[..], *expected, "encoding of {value}");
        }
    }

    #[test]
    fn encoded_len_is_minimal() {
        assert_eq!(VarInt::encoded_len(0), 1);
        assert_eq!(VarInt::encoded_len(127), 1);
        assert_eq!(VarInt::encoded_len(128), 2);
        assert_eq!(VarInt::encoded_len(16383), 2);
        assert_eq!(VarInt::encoded_len(16384), 3);
        assert_eq!(VarInt::encoded_len(-1), 5);
    }

    #[test]
    fn varint_buffer_too_short() {
        assert_eq!(VarInt::decode(&[]), Err(VarIntError::BufferTooShort));
        assert_eq!(VarInt::decode(&[0x80]), Err(VarIntError::BufferTooShort));
    }

    #[test]
    fn varint_rejects_sixth_byte() {
        let result = VarInt::decode(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x01]);
        assert_eq!(result, Err(VarIntError::TooManyBytes { max_bytes: 5 }));
    }

    #[test]
    fn decoder_resumes_across_calls() {
        let mut decoder = VarIntDecoder::new();
        assert_eq!(decoder.step(0xDD).unwrap(), None);
        assert_eq!(decoder.bytes_consumed(), 1);
        assert_eq!(decoder.step(0xC7).unwrap(), None);
        assert_eq!(decoder.step(0x01).unwrap(), Some(25565));
        // Ready for the next value.
        assert_eq!(decoder.bytes_consumed(), 0);
        assert_eq!(decoder.step(0x05).unwrap(), Some(5));
    }

    #[test]
    fn decoder_high_bit_set_means_continue() {
        // 0x80 has only the continuation bit; it must not terminate.
        let mut decoder = VarIntDecoder::new();
        assert_eq!(decoder.step(0x80).unwrap(), None);
        assert_eq!(decoder.step(0x00).unwrap(), Some(0));
    }

    #[test]
    fn fixed_width_pads_with_continuation_bits() {
        let mut buf = BytesMut::new();
        VarInt(5).encode_fixed_width(3, &mut buf).unwrap();
        assert_eq!(&buf[..], &[0x85, 0x80, 0x00]);
        let (decoded, consumed) = VarInt::decode(&buf).unwrap();
        assert_eq!(decoded.0, 5);
        assert_eq!(consumed, 3);
    }

    #[test]
    fn fixed_width_rejects_values_that_do_not_fit() {
        let mut buf = BytesMut::new();
        assert_eq!(
            VarInt(1 << 21).encode_fixed_width(3, &mut buf),
            Err(VarIntError::WidthTooSmall {
                value: 1 << 21,
                width: 3
            })
        );
        assert!(VarInt(1).encode_fixed_width(0, &mut buf).is_err());
        assert!(buf.is_empty());
    }

    #[test]
    fn fixed_width_full_five_bytes() {
        let mut buf = BytesMut::new();
        VarInt(-1).encode_fixed_width(5, &mut buf).unwrap();
        assert_eq!(&buf[..], &[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
    }

    #[test]
    fn block_position_pack_shifts() {
        assert_eq!(BlockPosition::new(1, 0, 0).pack(), 1 << 38);
        assert_eq!(BlockPosition::new(0, 1, 0).pack(), 1 << 26);
        assert_eq!(BlockPosition::new(0, 0, 1).pack(), 1);
        assert_eq!(BlockPosition::new(64, 0, 0).pack(), 0x0000_1000_0000_0000);
        assert_eq!(
            BlockPosition::new(3, 60, 3).pack(),
            (3 << 38) | (60 << 26) | 3
        );
    }

    #[test]
    fn block_position_unpack_sign_extends() {
        for pos in [
            BlockPosition::new(15, 60, 15),
            BlockPosition::new(-1, -1, -1),
            BlockPosition::new(-33_554_432, -2048, 33_554_431),
        ] {
            assert_eq!(BlockPosition::unpack(pos.pack()), pos);
        }
    }

    #[test]
    fn block_position_wire_is_big_endian() {
        let mut buf = BytesMut::new();
        BlockPosition::new(0, 60, 3).proto_encode(&mut buf);
        assert_eq!(&buf[..], &[0x00, 0x00, 0x00, 0x00, 0xF0, 0x00, 0x00, 0x03]);
        let decoded = BlockPosition::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(decoded, BlockPosition::new(0, 60, 3));
    }
}
