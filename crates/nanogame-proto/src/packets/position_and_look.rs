//! PlayerPositionAndLook (0x08) — Server → Client.

use bytes::BufMut;

use crate::codec::ProtoEncode;

use super::{clientbound, ClientboundPacket};

/// Every field relative to the client's current value.
pub const FLAGS_ALL_RELATIVE: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionAndLook {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
    pub flags: u8,
}

impl Default for PositionAndLook {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            yaw: 0.0,
            pitch: 0.0,
            flags: FLAGS_ALL_RELATIVE,
        }
    }
}

impl ProtoEncode for PositionAndLook {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_f64(self.x);
        buf.put_f64(self.y);
        buf.put_f64(self.z);
        buf.put_f32(self.yaw);
        buf.put_f32(self.pitch);
        buf.put_u8(self.flags);
    }
}

impl ClientboundPacket for PositionAndLook {
    const ID: u8 = clientbound::POSITION_AND_LOOK;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fixture() {
        let frame = PositionAndLook::default().to_frame();
        let mut expected = vec![0x22, 0x08];
        expected.extend_from_slice(&[0u8; 32]);
        expected.push(0xFF);
        assert_eq!(&frame[..], &expected[..]);
    }
}
