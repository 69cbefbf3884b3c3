//! Player movement packets — Client → Server.
//!
//! | Id   | Fields                                  |
//! |------|-----------------------------------------|
//! | 0x03 | on_ground                               |
//! | 0x04 | x, y, z (f64), on_ground                |
//! | 0x05 | yaw, pitch (f32), on_ground             |
//! | 0x06 | x, y, z (f64), yaw, pitch (f32), on_ground |

use bytes::Buf;

use crate::codec::{read_bool, read_f32, read_f64};
use crate::error::ProtoError;

use super::serverbound;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Movement {
    Ground {
        on_ground: bool,
    },
    Position {
        x: f64,
        y: f64,
        z: f64,
        on_ground: bool,
    },
    Look {
        yaw: f32,
        pitch: f32,
        on_ground: bool,
    },
    PositionLook {
        x: f64,
        y: f64,
        z: f64,
        yaw: f32,
        pitch: f32,
        on_ground: bool,
    },
}

impl Movement {
    /// Decode the payload of packet `id`; `None` if `id` is not a movement
    /// packet.
    pub fn decode(id: u8, buf: &mut impl Buf) -> Result<Option<Self>, ProtoError> {
        let movement = match id {
            serverbound::PLAYER => Movement::Ground {
                on_ground: read_bool(buf)?,
            },
            serverbound::PLAYER_POSITION => Movement::Position {
                x: read_f64(buf)?,
                y: read_f64(buf)?,
                z: read_f64(buf)?,
                on_ground: read_bool(buf)?,
            },
            serverbound::PLAYER_LOOK => Movement::Look {
                yaw: read_f32(buf)?,
                pitch: read_f32(buf)?,
                on_ground: read_bool(buf)?,
            },
            serverbound::PLAYER_POSITION_LOOK => Movement::PositionLook {
                x: read_f64(buf)?,
                y: read_f64(buf)?,
                z: read_f64(buf)?,
                yaw: read_f32(buf)?,
                pitch: read_f32(buf)?,
                on_ground: read_bool(buf)?,
            },
            _ => return Ok(None),
        };
        Ok(Some(movement))
    }

    pub fn on_ground(&self) -> bool {
        match *self {
            Movement::Ground { on_ground }
            | Movement::Position { on_ground, .. }
            | Movement::Look { on_ground, .. }
            | Movement::PositionLook { on_ground, .. } => on_ground,
        }
    }

    /// New coordinates, for the packets that carry them.
    pub fn position(&self) -> Option<(f64, f64, f64)> {
        match *self {
            Movement::Position { x, y, z, .. } | Movement::PositionLook { x, y, z, .. } => {
                Some((x, y, z))
            }
            _ => None,
        }
    }

    /// New yaw and pitch, for the packets that carry them.
    pub fn rotation(&self) -> Option<(f32, f32)> {
        match *self {
            Movement::Look { yaw, pitch, .. } | Movement::PositionLook { yaw, pitch, .. } => {
                Some((yaw, pitch))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    #[test]
    fn decode_ground() {
        let m = Movement::decode(0x03, &mut &[0x01u8][..]).unwrap().unwrap();
        assert_eq!(m, Movement::Ground { on_ground: true });
        assert_eq!(m.position(), None);
    }

    #[test]
    fn decode_position() {
        let mut buf = BytesMut::new();
        buf.put_f64(3.7);
        buf.put_f64(61.0);
        buf.put_f64(-0.5);
        buf.put_u8(1);
        let m = Movement::decode(0x04, &mut buf.freeze()).unwrap().unwrap();
        assert_eq!(m.position(), Some((3.7, 61.0, -0.5)));
        assert!(m.on_ground());
    }

    #[test]
    fn decode_position_look_reads_flag_after_rotation() {
        let mut buf = BytesMut::new();
        buf.put_f64(1.0);
        buf.put_f64(2.0);
        buf.put_f64(3.0);
        buf.put_f32(90.0);
        buf.put_f32(-10.0);
        buf.put_u8(0);
        let m = Movement::decode(0x06, &mut buf.freeze()).unwrap().unwrap();
        assert_eq!(m.position(), Some((1.0, 2.0, 3.0)));
        assert_eq!(m.rotation(), Some((90.0, -10.0)));
        assert!(!m.on_ground());
    }

    #[test]
    fn decode_look() {
        let mut buf = BytesMut::new();
        buf.put_f32(45.0);
        buf.put_f32(5.0);
        buf.put_u8(1);
        let m = Movement::decode(0x05, &mut buf.freeze()).unwrap().unwrap();
        assert_eq!(m.rotation(), Some((45.0, 5.0)));
        assert!(m.on_ground());
    }

    #[test]
    fn truncated_position_is_an_error() {
        let mut buf = BytesMut::new();
        buf.put_f64(1.0);
        assert!(Movement::decode(0x04, &mut buf.freeze()).is_err());
    }

    #[test]
    fn other_ids_are_not_movement() {
        assert_eq!(Movement::decode(0x01, &mut &[0u8; 0][..]).unwrap(), None);
    }
}
