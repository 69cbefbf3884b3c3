//! SpawnPosition (0x05) — Server → Client.

use bytes::BufMut;

use crate::codec::ProtoEncode;
use crate::types::BlockPosition;

use super::{clientbound, ClientboundPacket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnPosition {
    pub location: BlockPosition,
}

impl Default for SpawnPosition {
    fn default() -> Self {
        Self {
            location: BlockPosition::new(64, 0, 0),
        }
    }
}

impl ProtoEncode for SpawnPosition {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        self.location.proto_encode(buf);
    }
}

impl ClientboundPacket for SpawnPosition {
    const ID: u8 = clientbound::SPAWN_POSITION;
}
