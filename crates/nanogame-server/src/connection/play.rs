use bytes::Bytes;
use nanogame_proto::codec::ProtoDecode;
use nanogame_proto::error::ProtoError;
use nanogame_proto::packets::{serverbound, ChatMessage, ClientChat, ClientboundPacket, Movement};
use tracing::{debug, info, trace};

use super::{Actions, Context, Session};
use crate::grid::Cell;

pub(super) fn handle(
    session: &mut Session,
    id: u8,
    mut payload: Bytes,
    ctx: &mut Context<'_>,
) -> Result<Actions, ProtoError> {
    if id == serverbound::CHAT {
        return handle_chat(session, &mut payload);
    }
    let Some(movement) = Movement::decode(id, &mut payload)? else {
        return Ok(Actions::default());
    };
    Ok(handle_movement(session, movement, ctx))
}

fn handle_chat(session: &Session, payload: &mut Bytes) -> Result<Actions, ProtoError> {
    let chat = ClientChat::proto_decode(payload)?;
    let name = session.username().unwrap_or("?");
    info!("<{name}> {}", chat.message);

    let mut actions = Actions::default();
    actions.broadcast(ChatMessage::player(name, &chat.message)?.to_frame());
    Ok(actions)
}

fn handle_movement(session: &mut Session, movement: Movement, ctx: &mut Context<'_>) -> Actions {
    let mut actions = Actions::default();
    session.on_ground = movement.on_ground();
    if let Some((yaw, pitch)) = movement.rotation() {
        session.yaw = yaw;
        session.pitch = pitch;
    }
    let Some((x, y, z)) = movement.position() else {
        return actions;
    };
    session.x = x;
    session.y = y;
    session.z = z;
    trace!("{} moved to ({x:.2}, {y:.2}, {z:.2})", session.label());

    if !session.on_ground {
        return actions;
    }
    let Some(cell) = Cell::at(x, z) else {
        return actions;
    };
    let color = session.color();
    if ctx.grid.paint(cell, color) {
        debug!(
            "{} painted ({}, {}) with color {color}",
            session.label(),
            cell.x(),
            cell.z()
        );
        actions.reply(cell.clear_packet().to_frame());
        actions.reply(cell.set_packet(color).to_frame());
    }
    actions
}
