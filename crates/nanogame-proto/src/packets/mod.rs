//! Packet definitions for the supported subset of protocol 47.

pub mod block_change;
pub mod chat;
pub mod chunk_data;
pub mod handshake;
pub mod join_game;
pub mod keep_alive;
pub mod login;
pub mod movement;
pub mod position_and_look;
pub mod spawn_position;
pub mod status;

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::ProtoEncode;
use crate::frame::encode_frame;

pub use block_change::BlockChange;
pub use chat::{ChatMessage, ClientChat, TextComponent};
pub use chunk_data::ChunkData;
pub use handshake::{Handshake, NextState};
pub use join_game::JoinGame;
pub use keep_alive::KeepAlive;
pub use login::{LoginStart, LoginSuccess};
pub use movement::Movement;
pub use position_and_look::PositionAndLook;
pub use spawn_position::SpawnPosition;
pub use status::{ServerStatus, StatusResponse};

/// Packets sent by the client, grouped by the phase they are valid in.
pub mod serverbound {
    pub const HANDSHAKE: u8 = 0x00;

    pub const STATUS_REQUEST: u8 = 0x00;
    pub const STATUS_PING: u8 = 0x01;

    pub const LOGIN_START: u8 = 0x00;

    pub const CHAT: u8 = 0x01;
    pub const PLAYER: u8 = 0x03;
    pub const PLAYER_POSITION: u8 = 0x04;
    pub const PLAYER_LOOK: u8 = 0x05;
    pub const PLAYER_POSITION_LOOK: u8 = 0x06;
}

/// Packets sent by the server.
pub mod clientbound {
    pub const STATUS_RESPONSE: u8 = 0x00;
    pub const STATUS_PONG: u8 = 0x01;

    pub const LOGIN_SUCCESS: u8 = 0x02;

    pub const KEEP_ALIVE: u8 = 0x00;
    pub const JOIN_GAME: u8 = 0x01;
    pub const CHAT_MESSAGE: u8 = 0x02;
    pub const SPAWN_POSITION: u8 = 0x05;
    pub const POSITION_AND_LOOK: u8 = 0x08;
    pub const CHUNK_DATA: u8 = 0x21;
    pub const BLOCK_CHANGE: u8 = 0x23;
}

/// Protocol version spoken by this server (Minecraft 1.8.x).
pub const PROTOCOL_VERSION: i32 = 47;

/// Game version reported in the status response.
pub const GAME_VERSION: &str = "1.8.8";

/// A packet the server sends: an id byte followed by its encoded fields.
pub trait ClientboundPacket: ProtoEncode {
    const ID: u8;

    /// Encode as a complete frame: VarInt length, id, payload.
    fn to_frame(&self) -> Bytes {
        let mut body = BytesMut::with_capacity(64);
        body.put_u8(Self::ID);
        self.proto_encode(&mut body);
        encode_frame(&body)
    }
}
