//! Handshake (0x00) — Client → Server.
//!
//! Fields: VarInt protocol version, string server address, u16 port and a
//! VarInt next state. The next state is always one of two single-byte values,
//! so it is read as the trailing byte of the payload.

use crate::types::VarInt;

/// Phase requested by the client at the end of the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NextState {
    Status = 1,
    Login = 2,
}

impl NextState {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(Self::Status),
            2 => Some(Self::Login),
            _ => None,
        }
    }
}

/// Handshake packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    /// Client protocol version, when the leading VarInt is well formed.
    pub protocol_version: Option<i32>,
    /// Raw trailing next-state byte.
    pub next_state: u8,
}

impl Handshake {
    /// Parse from the payload following the packet id. `None` if the payload
    /// is empty.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let next_state = *payload.last()?;
        let protocol_version = VarInt::decode(payload).ok().map(|(v, _)| v.0);
        Some(Self {
            protocol_version,
            next_state,
        })
    }

    /// The requested phase, or `None` for an unknown indicator.
    pub fn next(&self) -> Option<NextState> {
        NextState::from_u8(self.next_state)
    }
}
