//! BlockChange (0x23) — Server → Client.

use bytes::BufMut;

use crate::codec::ProtoEncode;
use crate::types::{BlockPosition, VarInt};

use super::{clientbound, ClientboundPacket};

/// Replace the block at a single position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockChange {
    pub location: BlockPosition,
    pub block_id: u16,
    pub meta: u8,
}

impl BlockChange {
    pub fn new(location: BlockPosition, block_id: u16, meta: u8) -> Self {
        Self {
            location,
            block_id,
            meta,
        }
    }

    /// Set the position back to air.
    pub fn clear(location: BlockPosition) -> Self {
        Self::new(location, 0, 0)
    }

    /// Block state as sent on the wire: `id << 4 | meta`.
    pub fn block_state(&self) -> i32 {
        (i32::from(self.block_id) << 4) | i32::from(self.meta & 0x0F)
    }
}

impl ProtoEncode for BlockChange {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        self.location.proto_encode(buf);
        VarInt(self.block_state()).proto_encode(buf);
    }
}

impl ClientboundPacket for BlockChange {
    const ID: u8 = clientbound::BLOCK_CHANGE;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_block_fixture() {
        let frame = BlockChange::clear(BlockPosition::new(0, 60, 3)).to_frame();
        assert_eq!(
            &frame[..],
            &[0x0A, 0x23, 0x00, 0x00, 0x00, 0x00, 0xF0, 0x00, 0x00, 0x03, 0x00]
        );
    }

    #[test]
    fn colored_block_fixture() {
        // 159 << 4 | 5 = 2549 = 0xF5 0x13 as a VarInt.
        let frame = BlockChange::new(BlockPosition::new(2, 60, 0), 159, 5).to_frame();
        assert_eq!(
            &frame[..],
            &[0x0B, 0x23, 0x00, 0x00, 0x00, 0x80, 0xF0, 0x00, 0x00, 0x00, 0xF5, 0x13]
        );
    }

    #[test]
    fn meta_is_masked_to_four_bits() {
        let change = BlockChange::new(BlockPosition::new(0, 0, 0), 1, 0x1F);
        assert_eq!(change.block_state(), 0x1F);
    }
}
