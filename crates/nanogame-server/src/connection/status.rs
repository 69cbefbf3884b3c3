use bytes::{BufMut, Bytes, BytesMut};
use nanogame_proto::error::ProtoError;
use nanogame_proto::frame::encode_frame;
use nanogame_proto::packets::{
    clientbound, serverbound, ClientboundPacket, ServerStatus, StatusResponse,
};
use tracing::debug;

use super::{Actions, Context, Session};

pub(super) fn handle(
    session: &mut Session,
    id: u8,
    payload: Bytes,
    ctx: &mut Context<'_>,
) -> Result<Actions, ProtoError> {
    let mut actions = Actions::default();
    match id {
        serverbound::STATUS_REQUEST => {
            let status = ServerStatus::new(
                ctx.config.server.max_players,
                ctx.online,
                &ctx.config.server.motd,
            );
            actions.reply(StatusResponse::new(&status)?.to_frame());
            debug!("Sent status to {} ({} online)", session.label(), ctx.online);
        }
        serverbound::STATUS_PING => {
            // Pong carries the ping payload back unchanged.
            let mut body = BytesMut::with_capacity(1 + payload.len());
            body.put_u8(clientbound::STATUS_PONG);
            body.put_slice(&payload);
            actions.reply(encode_frame(&body));
            actions.close = true;
        }
        _ => {}
    }
    Ok(actions)
}
