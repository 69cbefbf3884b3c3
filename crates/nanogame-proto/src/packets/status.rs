//! Status phase packets.
//!
//! StatusResponse (0x00) — Server → Client: a single JSON string describing
//! the server. The ping (0x01) is echoed back unchanged, so it has no type.

use bytes::BufMut;
use serde::Serialize;

use crate::codec::{write_string, ProtoEncode};
use crate::error::ProtoError;

use super::{clientbound, ClientboundPacket, TextComponent};

/// Server list entry as reported to the client.
#[derive(Debug, Clone, Serialize)]
pub struct ServerStatus {
    pub version: VersionInfo,
    pub players: PlayersInfo,
    pub description: TextComponent,
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub name: String,
    pub protocol: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayersInfo {
    pub max: u32,
    pub online: usize,
}

impl ServerStatus {
    pub fn new(max_players: u32, online: usize, motd: &str) -> Self {
        Self {
            version: VersionInfo {
                name: super::GAME_VERSION.into(),
                protocol: super::PROTOCOL_VERSION,
            },
            players: PlayersInfo {
                max: max_players,
                online,
            },
            description: TextComponent::colored(motd, "aqua"),
        }
    }
}

/// StatusResponse packet.
#[derive(Debug, Clone)]
pub struct StatusResponse {
    pub json: String,
}

impl StatusResponse {
    pub fn new(status: &ServerStatus) -> Result<Self, ProtoError> {
        let json = serde_json::to_string(status).map_err(|e| ProtoError::Json(e.to_string()))?;
        Ok(Self { json })
    }
}

impl ProtoEncode for StatusResponse {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        write_string(buf, &self.json);
    }
}

impl ClientboundPacket for StatusResponse {
    const ID: u8 = clientbound::STATUS_RESPONSE;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::read_string;
    use crate::codec::MAX_STRING_LENGTH;
    use crate::types::VarInt;
    use bytes::Buf;

    #[test]
    fn status_json_structure() {
        let status = ServerStatus::new(20, 3, "A nanogame server");
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["version"]["name"], "1.8.8");
        assert_eq!(value["version"]["protocol"], 47);
        assert_eq!(value["players"]["max"], 20);
        assert_eq!(value["players"]["online"], 3);
        assert_eq!(value["description"]["text"], "A nanogame server");
        assert_eq!(value["description"]["color"], "aqua");
    }

    #[test]
    fn frame_length_matches_payload() {
        let response = StatusResponse::new(&ServerStatus::new(20, 1, "motd")).unwrap();
        let frame = response.to_frame();
        let (length, prefix_len) = VarInt::decode(&frame).unwrap();
        assert_eq!(length.0 as usize, frame.len() - prefix_len);

        let mut body = frame.slice(prefix_len..);
        assert_eq!(body.get_u8(), clientbound::STATUS_RESPONSE);
        let json = read_string(&mut body, MAX_STRING_LENGTH).unwrap();
        assert_eq!(json, response.json);
        assert!(!body.has_remaining());
    }
}
