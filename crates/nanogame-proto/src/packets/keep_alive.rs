//! KeepAlive (0x00) — Server → Client.

use bytes::BufMut;

use crate::codec::ProtoEncode;
use crate::types::VarInt;

use super::{clientbound, ClientboundPacket};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeepAlive {
    pub id: i32,
}

impl ProtoEncode for KeepAlive {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.id).proto_encode(buf);
    }
}

impl ClientboundPacket for KeepAlive {
    const ID: u8 = clientbound::KEEP_ALIVE;
}
