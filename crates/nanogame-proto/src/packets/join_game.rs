//! JoinGame (0x01) — Server → Client.
//!
//! First Play packet after login success.

use bytes::BufMut;

use crate::codec::{write_string, ProtoEncode};

use super::{clientbound, ClientboundPacket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinGame {
    pub entity_id: i32,
    /// 0 survival, 1 creative, 2 adventure, 3 spectator.
    pub gamemode: u8,
    /// -1 nether, 0 overworld, 1 end.
    pub dimension: i8,
    pub difficulty: u8,
    pub max_players: u8,
    pub level_type: String,
    pub reduced_debug_info: bool,
}

impl Default for JoinGame {
    fn default() -> Self {
        Self {
            entity_id: 1,
            gamemode: 1,
            dimension: 0,
            difficulty: 0,
            max_players: 32,
            level_type: "default".into(),
            reduced_debug_info: false,
        }
    }
}

impl ProtoEncode for JoinGame {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_i32(self.entity_id);
        buf.put_u8(self.gamemode);
        buf.put_i8(self.dimension);
        buf.put_u8(self.difficulty);
        buf.put_u8(self.max_players);
        write_string(buf, &self.level_type);
        buf.put_u8(self.reduced_debug_info as u8);
    }
}

impl ClientboundPacket for JoinGame {
    const ID: u8 = clientbound::JOIN_GAME;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fixture() {
        let frame = JoinGame::default().to_frame();
        let mut expected = vec![0x12, 0x01, 0x00, 0x00, 0x00, 0x01, 0x01, 0x00, 0x00, 0x20, 0x07];
        expected.extend_from_slice(b"default");
        expected.push(0x00);
        assert_eq!(&frame[..], &expected[..]);
    }

    #[test]
    fn nether_dimension_is_signed() {
        let join = JoinGame {
            dimension: -1,
            ..Default::default()
        };
        assert_eq!(join.to_frame()[7], 0xFF);
    }
}
