//! Login phase packets.
//!
//! LoginStart (0x00) — Client → Server: the player name.
//! LoginSuccess (0x02) — Server → Client: UUID and name, switches to Play.

use bytes::{Buf, BufMut};

use crate::codec::{read_string, write_string, ProtoDecode, ProtoEncode, MAX_STRING_LENGTH};
use crate::error::ProtoError;

use super::{clientbound, ClientboundPacket};

/// UUID handed to every player. The server runs in offline mode.
pub const PLAYER_UUID: &str = "750fc259-3bb1-44db-97bd-2e995e0089b4";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginStart {
    pub username: String,
}

impl ProtoDecode for LoginStart {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(Self {
            username: read_string(buf, MAX_STRING_LENGTH)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    pub uuid: String,
    pub username: String,
}

impl LoginSuccess {
    pub fn offline(username: impl Into<String>) -> Self {
        Self {
            uuid: PLAYER_UUID.into(),
            username: username.into(),
        }
    }
}

impl ProtoEncode for LoginSuccess {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        write_string(buf, &self.uuid);
        write_string(buf, &self.username);
    }
}

impl ClientboundPacket for LoginSuccess {
    const ID: u8 = clientbound::LOGIN_SUCCESS;
}
