//! Protocol-level errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("buffer too short: need {needed} more bytes, have {remaining}")]
    BufferTooShort { needed: usize, remaining: usize },

    #[error("VarInt encoding error: {0}")]
    VarInt(#[from] crate::types::VarIntError),

    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    #[error("string too long: {length} characters, limit is {max}")]
    StringTooLong { length: usize, max: usize },

    #[error("declared frame length {length} exceeds maximum {max}")]
    FrameTooLong { length: usize, max: usize },

    #[error("negative length: {0}")]
    NegativeLength(i32),

    #[error("JSON encode error: {0}")]
    Json(String),
}
