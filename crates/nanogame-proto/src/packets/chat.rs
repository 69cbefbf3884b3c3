//! Chat packets.
//!
//! Chat (0x01) — Client → Server: a string of at most 100 characters.
//! ChatMessage (0x02) — Server → Client: a JSON text component array and a
//! position byte (0 = chat box).

use bytes::{Buf, BufMut, Bytes};
use serde::Serialize;

use crate::codec::{read_string, write_string, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::frame::FrameWriter;

use super::{clientbound, ClientboundPacket};

/// Longest chat message a client may send, in characters.
pub const MAX_CHAT_LENGTH: usize = 100;

/// Position byte for messages shown in the chat box.
pub const POSITION_CHAT: u8 = 0;

/// A single JSON text component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextComponent {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl TextComponent {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
        }
    }

    pub fn colored(text: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Some(color.into()),
        }
    }
}

/// Chat packet sent by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientChat {
    pub message: String,
}

impl ProtoDecode for ClientChat {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(Self {
            message: read_string(buf, MAX_CHAT_LENGTH)?,
        })
    }
}

/// ChatMessage packet sent by the server.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub json: String,
    pub position: u8,
}

impl ChatMessage {
    pub fn from_components(components: &[TextComponent]) -> Result<Self, ProtoError> {
        let json =
            serde_json::to_string(components).map_err(|e| ProtoError::Json(e.to_string()))?;
        Ok(Self {
            json,
            position: POSITION_CHAT,
        })
    }

    /// A message said by a player: `name: message`.
    pub fn player(name: &str, message: &str) -> Result<Self, ProtoError> {
        Self::from_components(&[
            TextComponent::colored(format!("{name}: "), "aqua"),
            TextComponent::colored(message, "white"),
        ])
    }

    /// A server notice such as a join or quit line.
    pub fn notice(text: &str) -> Result<Self, ProtoError> {
        Self::from_components(&[TextComponent::colored(text, "gray")])
    }
}

impl ProtoEncode for ChatMessage {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        write_string(buf, &self.json);
        buf.put_u8(self.position);
    }
}

impl ClientboundPacket for ChatMessage {
    const ID: u8 = clientbound::CHAT_MESSAGE;

    /// Chat frames reserve a three-byte length field up front.
    fn to_frame(&self) -> Bytes {
        let mut writer = FrameWriter::new(Self::ID);
        self.proto_encode(writer.body());
        writer.finish()
    }
}
