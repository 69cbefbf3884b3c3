//! ChunkData (0x21) — Server → Client.

use bytes::BufMut;

use crate::codec::ProtoEncode;
use crate::types::VarInt;

use super::{clientbound, ClientboundPacket};

/// A chunk column. Only the empty form (all sections present, no data) is
/// ever sent, which is enough for the client to consider the column loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkData {
    pub chunk_x: i32,
    pub chunk_z: i32,
    pub ground_up_continuous: bool,
    pub primary_bit_mask: u16,
}

impl ChunkData {
    pub fn empty(chunk_x: i32, chunk_z: i32) -> Self {
        Self {
            chunk_x,
            chunk_z,
            ground_up_continuous: true,
            primary_bit_mask: 0xFFFF,
        }
    }
}

impl ProtoEncode for ChunkData {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_i32(self.chunk_x);
        buf.put_i32(self.chunk_z);
        buf.put_u8(self.ground_up_continuous as u8);
        buf.put_u16(self.primary_bit_mask);
        // No section data.
        VarInt(0).proto_encode(buf);
    }
}

impl ClientboundPacket for ChunkData {
    const ID: u8 = clientbound::CHUNK_DATA;
}
