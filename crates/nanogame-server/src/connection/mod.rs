//! Per-connection protocol state machine.
//!
//! A [`Session`] owns everything the server knows about one client apart
//! from its socket. Complete frames are dispatched on the session's phase and
//! the packet id; handlers never touch sockets and instead return the
//! frames to send as [`Actions`], which the event loop writes out in order.
//!
//! ```text
//! Handshake ──1──▶ Status ──ping──▶ (closed)
//!     │
//!     └─────2──▶ Login ──start──▶ Play
//! ```

mod login;
mod play;
mod status;

use bytes::{Buf, Bytes};
use nanogame_proto::error::ProtoError;
use nanogame_proto::frame::FrameAssembler;
use nanogame_proto::packets::{serverbound, Handshake, NextState};
use tracing::{debug, trace};

use crate::config::ServerConfig;
use crate::grid::{color_for, GameGrid};

/// Protocol phase of a connection. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Handshake,
    Status,
    Login,
    Play,
}

/// A frame to write once the current frame has been handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// To the connection that sent the frame.
    Reply(Bytes),
    /// To every live connection, the sender included.
    Broadcast(Bytes),
}

/// Result of handling one frame.
#[derive(Debug, Default)]
pub struct Actions {
    pub outbound: Vec<Outbound>,
    /// Close the connection after the outbound frames are written.
    pub close: bool,
}

impl Actions {
    fn reply(&mut self, frame: Bytes) {
        self.outbound.push(Outbound::Reply(frame));
    }

    fn broadcast(&mut self, frame: Bytes) {
        self.outbound.push(Outbound::Broadcast(frame));
    }
}

/// Shared server state a frame handler may read or change.
pub struct Context<'a> {
    pub grid: &'a mut GameGrid,
    /// Live connections, this one included.
    pub online: usize,
    pub config: &'a ServerConfig,
}

/// Protocol state of one client.
#[derive(Debug)]
pub struct Session {
    serial: u64,
    phase: Phase,
    assembler: FrameAssembler,
    username: Option<String>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

impl Session {
    pub fn new(serial: u64, max_frame_length: usize) -> Self {
        Self {
            serial,
            phase: Phase::Handshake,
            assembler: FrameAssembler::with_max_length(max_frame_length),
            username: None,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            yaw: 0.0,
            pitch: 0.0,
            on_ground: false,
        }
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Grid color painted by this connection.
    pub fn color(&self) -> u8 {
        color_for(self.serial)
    }

    pub fn assembler_mut(&mut self) -> &mut FrameAssembler {
        &mut self.assembler
    }

    /// Display name for logs: the player name once known.
    pub fn label(&self) -> String {
        match &self.username {
            Some(name) => format!("{name} (#{})", self.serial),
            None => format!("#{}", self.serial),
        }
    }

    /// Dispatch one complete frame body (packet id + payload).
    ///
    /// Unknown ids are ignored in every phase. An error means the
    /// connection must be dropped.
    pub fn handle_frame(
        &mut self,
        mut frame: Bytes,
        ctx: &mut Context<'_>,
    ) -> Result<Actions, ProtoError> {
        if !frame.has_remaining() {
            trace!("Empty frame from {}", self.label());
            return Ok(Actions::default());
        }
        let id = frame.get_u8();
        trace!(
            "Frame 0x{id:02X} ({} bytes) from {} in {:?}",
            frame.len(),
            self.label(),
            self.phase
        );
        match self.phase {
            Phase::Handshake => Ok(self.handle_handshake(id, &frame)),
            Phase::Status => status::handle(self, id, frame, ctx),
            Phase::Login => login::handle(self, id, frame, ctx),
            Phase::Play => play::handle(self, id, frame, ctx),
        }
    }

    fn handle_handshake(&mut self, id: u8, payload: &[u8]) -> Actions {
        if id != serverbound::HANDSHAKE {
            return Actions::default();
        }
        let Some(handshake) = Handshake::parse(payload) else {
            return Actions::default();
        };
        match handshake.next() {
            Some(NextState::Status) => self.phase = Phase::Status,
            Some(NextState::Login) => self.phase = Phase::Login,
            None => {
                debug!(
                    "Ignoring handshake from {} with next state {}",
                    self.label(),
                    handshake.next_state
                );
                return Actions::default();
            }
        }
        debug!(
            "Handshake from {}: protocol {:?}, next phase {:?}",
            self.label(),
            handshake.protocol_version,
            self.phase
        );
        Actions::default()
    }
}
