use bytes::Bytes;
use nanogame_proto::codec::ProtoDecode;
use nanogame_proto::error::ProtoError;
use nanogame_proto::packets::{
    serverbound, ChatMessage, ChunkData, ClientboundPacket, JoinGame, LoginStart, LoginSuccess,
    PositionAndLook, SpawnPosition,
};
use tracing::info;

use super::{Actions, Context, Phase, Session};

pub(super) fn handle(
    session: &mut Session,
    id: u8,
    mut payload: Bytes,
    ctx: &mut Context<'_>,
) -> Result<Actions, ProtoError> {
    if id != serverbound::LOGIN_START {
        return Ok(Actions::default());
    }
    let login = LoginStart::proto_decode(&mut payload)?;

    let mut actions = Actions::default();
    actions.reply(LoginSuccess::offline(login.username.as_str()).to_frame());
    actions.reply(JoinGame::default().to_frame());
    actions.reply(SpawnPosition::default().to_frame());
    actions.reply(PositionAndLook::default().to_frame());
    actions.reply(ChunkData::empty(0, 0).to_frame());
    for (cell, color) in ctx.grid.non_empty() {
        actions.reply(cell.set_packet(color).to_frame());
    }

    if ctx.config.game.announce_joins {
        let notice = ChatMessage::notice(&format!("{} joined the game", login.username))?;
        actions.broadcast(notice.to_frame());
    }

    session.username = Some(login.username);
    session.phase = Phase::Play;
    info!("{} logged in with color {}", session.label(), session.color());
    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{handshake_body, login_body, Harness};
    use super::super::Outbound;
    use super::*;
    use crate::grid::Cell;
    use nanogame_proto::packets::{clientbound, BlockChange};

    fn login_session(h: &mut Harness) -> Session {
        let mut session = Session::new(4, 16 * 1024);
        h.feed(&mut session, handshake_body(2)).unwrap();
        session
    }

    fn replies(actions: &Actions) -> Vec<Bytes> {
        actions
            .outbound
            .iter()
            .filter_map(|o| match o {
                Outbound::Reply(frame) => Some(frame.clone()),
                Outbound::Broadcast(_) => None,
            })
            .collect()
    }

    /// Packet id of a frame with a single-byte length prefix.
    fn id_of(frame: &Bytes) -> u8 {
        frame[1]
    }

    #[test]
    fn login_sequence_on_empty_grid() {
        let mut h = Harness::new();
        let mut session = login_session(&mut h);
        let actions = h.feed(&mut session, login_body("Alice")).unwrap();

        let frames = replies(&actions);
        assert_eq!(frames.len(), 5);
        assert_eq!(frames[0], LoginSuccess::offline("Alice").to_frame());
        assert_eq!(id_of(&frames[0]), clientbound::LOGIN_SUCCESS);
        assert_eq!(frames[1], JoinGame::default().to_frame());
        assert_eq!(frames[2], SpawnPosition::default().to_frame());
        assert_eq!(frames[3], PositionAndLook::default().to_frame());
        assert_eq!(frames[4], ChunkData::empty(0, 0).to_frame());

        assert_eq!(session.phase(), Phase::Play);
        assert_eq!(session.username(), Some("Alice"));
    }

    #[test]
    fn login_replays_painted_cells() {
        let mut h = Harness::new();
        let a = Cell::new(1, 2).unwrap();
        let b = Cell::new(9, 0).unwrap();
        h.grid.paint(a, 3);
        h.grid.paint(b, 7);

        let mut session = login_session(&mut h);
        let frames = replies(&h.feed(&mut session, login_body("Bob")).unwrap());
        assert_eq!(frames.len(), 7);
        assert_eq!(frames[5], BlockChange::new(a.block_position(), 159, 3).to_frame());
        assert_eq!(frames[6], BlockChange::new(b.block_position(), 159, 7).to_frame());
    }

    #[test]
    fn join_announcement_follows_login_sequence() {
        let mut h = Harness::new();
        let mut session = login_session(&mut h);
        let actions = h.feed(&mut session, login_body("Alice")).unwrap();
        match actions.outbound.last() {
            Some(Outbound::Broadcast(frame)) => {
                let text = String::from_utf8_lossy(frame);
                assert!(text.contains("Alice joined the game"));
            }
            other => panic!("expected join broadcast, got {other:?}"),
        }
    }

    #[test]
    fn no_announcement_when_disabled() {
        let mut h = Harness::new();
        h.config.game.announce_joins = false;
        let mut session = login_session(&mut h);
        let actions = h.feed(&mut session, login_body("Alice")).unwrap();
        assert!(actions
            .outbound
            .iter()
            .all(|o| matches!(o, Outbound::Reply(_))));
    }

    #[test]
    fn truncated_name_is_a_protocol_error() {
        let mut h = Harness::new();
        let mut session = login_session(&mut h);
        // Name length 10, three bytes present.
        let err = h
            .feed(&mut session, Bytes::from_static(&[0x00, 0x0A, b'a', b'b', b'c']))
            .unwrap_err();
        assert!(matches!(err, ProtoError::BufferTooShort { .. }));
        assert_eq!(session.phase(), Phase::Login);
    }

    #[test]
    fn other_ids_ignored_in_login() {
        let mut h = Harness::new();
        let mut session = login_session(&mut h);
        let actions = h.feed(&mut session, Bytes::from_static(&[0x01, 0x00])).unwrap();
        assert!(actions.outbound.is_empty());
        assert_eq!(session.phase(), Phase::Login);
    }
}
