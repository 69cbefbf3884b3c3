//! Protocol encoding/decoding traits and helpers.
//!
//! Every fixed-width number on the wire is big-endian; the `bytes` crate's
//! `get_*`/`put_*` accessors without a suffix are big-endian too.

use bytes::{Buf, BufMut};

use crate::error::ProtoError;
use crate::types::VarInt;

/// Longest string the protocol allows, in characters.
pub const MAX_STRING_LENGTH: usize = 32767;

/// Encode a value onto a buffer.
pub trait ProtoEncode {
    fn proto_encode(&self, buf: &mut impl BufMut);
}

/// Decode a value from a buffer.
pub trait ProtoDecode: Sized {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError>;
}

fn ensure_remaining(buf: &mut impl Buf, needed: usize) -> Result<(), ProtoError> {
    if buf.remaining() < needed {
        return Err(ProtoError::BufferTooShort {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

/// Write a protocol string (VarInt byte length + UTF-8).
pub fn write_string(buf: &mut impl BufMut, s: &str) {
    VarInt(s.len() as i32).proto_encode(buf);
    buf.put_slice(s.as_bytes());
}

/// Read a protocol string (VarInt byte length + UTF-8) of at most
/// `max_chars` characters.
///
/// The declared byte length is checked against both the limit and the bytes
/// actually left in the buffer before anything is copied.
pub fn read_string(buf: &mut impl Buf, max_chars: usize) -> Result<String, ProtoError> {
    let declared = VarInt::proto_decode(buf)?.0;
    if declared < 0 {
        return Err(ProtoError::NegativeLength(declared));
    }
    let len = declared as usize;
    // A UTF-8 character is at most four bytes.
    if len > max_chars * 4 {
        return Err(ProtoError::StringTooLong {
            length: len,
            max: max_chars,
        });
    }
    ensure_remaining(buf, len)?;
    let data = buf.copy_to_bytes(len);
    let s = String::from_utf8(data.to_vec()).map_err(|_| ProtoError::InvalidUtf8)?;
    let chars = s.chars().count();
    if chars > max_chars {
        return Err(ProtoError::StringTooLong {
            length: chars,
            max: max_chars,
        });
    }
    Ok(s)
}

pub fn read_u8(buf: &mut impl Buf) -> Result<u8, ProtoError> {
    ensure_remaining(buf, 1)?;
    Ok(buf.get_u8())
}

/// Any non-zero byte reads as `true`.
pub fn read_bool(buf: &mut impl Buf) -> Result<bool, ProtoError> {
    Ok(read_u8(buf)? != 0)
}

pub fn read_f32(buf: &mut impl Buf) -> Result<f32, ProtoError> {
    ensure_remaining(buf, 4)?;
    Ok(buf.get_f32())
}

pub fn read_f64(buf: &mut impl Buf) -> Result<f64, ProtoError> {
    ensure_remaining(buf, 8)?;
    Ok(buf.get_f64())
}

pub fn read_u64(buf: &mut impl Buf) -> Result<u64, ProtoError> {
    ensure_remaining(buf, 8)?;
    Ok(buf.get_u64())
}
