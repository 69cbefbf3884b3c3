//! The event loop.
//!
//! One task owns the grid, the connection table and every frame assembler.
//! It waits on new connections, the tick timer, inbound bytes, console lines
//! and the shutdown signal, and handles whichever is ready to completion
//! before waiting again. Each socket has a reader task that only forwards
//! raw bytes to the loop; all writes happen on the loop, in order.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use nanogame_proto::frame::FrameResult;
use nanogame_proto::packets::{ChatMessage, ClientboundPacket, KeepAlive};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::config::ServerConfig;
use crate::connection::{Context, Outbound, Phase, Session};
use crate::error::ServerError;
use crate::grid::GameGrid;
use crate::table::{ConnectionId, ConnectionTable, TableFull};

/// Bytes requested from a socket per read.
const READ_BUFFER_SIZE: usize = 16 * 1024;

/// Inbound events queued between reader tasks and the loop.
const INBOUND_CHANNEL_SIZE: usize = 256;

/// What a reader task reports to the loop.
#[derive(Debug)]
enum Inbound {
    Data { id: ConnectionId, bytes: Bytes },
    Closed { id: ConnectionId, error: Option<io::Error> },
}

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// A live client: its protocol state plus the socket.
struct Connection {
    session: Session,
    peer: String,
    writer: BoxedWriter,
    reader: Option<JoinHandle<()>>,
}

impl Connection {
    async fn send(&mut self, frame: &[u8], timeout: Duration) -> Result<(), ServerError> {
        match tokio::time::timeout(timeout, self.writer.write_all(frame)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ServerError::WriteTimeout),
        }
    }

    /// Close the socket. Consumes the connection so it happens once.
    fn close(self) {
        if let Some(reader) = self.reader {
            reader.abort();
        }
    }
}

async fn read_loop<R>(id: ConnectionId, mut reader: R, tx: mpsc::Sender<Inbound>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = BytesMut::with_capacity(READ_BUFFER_SIZE);
    loop {
        buf.reserve(READ_BUFFER_SIZE);
        let event = match reader.read_buf(&mut buf).await {
            Ok(0) => Inbound::Closed { id, error: None },
            Ok(_) => Inbound::Data {
                id,
                bytes: buf.split().freeze(),
            },
            Err(e) => Inbound::Closed { id, error: Some(e) },
        };
        let closed = matches!(event, Inbound::Closed { .. });
        if tx.send(event).await.is_err() || closed {
            return;
        }
    }
}

pub struct Server {
    config: ServerConfig,
    connections: ConnectionTable<Connection>,
    grid: GameGrid,
    tick: u64,
    next_serial: u64,
    /// Frames waiting to go to every connection.
    pending_broadcasts: VecDeque<Bytes>,
    inbound_tx: mpsc::Sender<Inbound>,
    inbound_rx: mpsc::Receiver<Inbound>,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CHANNEL_SIZE);
        Self {
            connections: ConnectionTable::with_capacity(config.server.max_connections),
            config,
            grid: GameGrid::new(),
            tick: 0,
            next_serial: 0,
            pending_broadcasts: VecDeque::new(),
            inbound_tx,
            inbound_rx,
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn grid(&self) -> &GameGrid {
        &self.grid
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Run until the shutdown signal is set. Console lines are logged and
    /// otherwise ignored.
    pub async fn run(
        mut self,
        listener: TcpListener,
        mut shutdown: watch::Receiver<bool>,
        mut console: mpsc::Receiver<String>,
    ) -> Result<(), ServerError> {
        info!("Listening on {}", listener.local_addr()?);
        let mut tick_interval = tokio::time::interval(self.config.network.tick_interval());

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            if let Err(e) = stream.set_nodelay(true) {
                                debug!("Failed to set TCP_NODELAY for {peer}: {e}");
                            }
                            if let Err(e) = self.register(stream, peer.to_string()) {
                                warn!("Rejected {peer}: {e}");
                            }
                        }
                        Err(e) => warn!("Accept error: {e}"),
                    }
                }
                _ = tick_interval.tick() => {
                    self.on_tick().await;
                }
                Some(event) = self.inbound_rx.recv() => {
                    self.on_inbound(event).await;
                }
                Some(line) = console.recv() => {
                    debug!("Console: {line}");
                }
                changed = shutdown.changed() => {
                    // A dropped sender also ends the loop.
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Closing {} connections", self.connections.len());
                        self.close_all();
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Add a connected stream to the table and start its reader. At
    /// capacity the stream is closed and an error returned.
    pub fn register<S>(&mut self, stream: S, peer: String) -> Result<ConnectionId, ServerError>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let serial = self.next_serial;
        self.next_serial += 1;

        let (reader, writer) = tokio::io::split(stream);
        let connection = Connection {
            session: Session::new(serial, self.config.network.max_frame_length),
            peer,
            writer: Box::new(writer),
            reader: None,
        };
        let id = match self.connections.insert(connection) {
            Ok(id) => id,
            Err(TableFull(connection)) => {
                connection.close();
                return Err(ServerError::Capacity {
                    capacity: self.connections.capacity(),
                });
            }
        };

        let handle = tokio::spawn(read_loop(id, reader, self.inbound_tx.clone()));
        let (live, capacity) = (self.connections.len(), self.connections.capacity());
        if let Some(conn) = self.connections.get_mut(id) {
            conn.reader = Some(handle);
            info!("Connection #{serial} from {} ({live}/{capacity})", conn.peer);
        }
        Ok(id)
    }

    async fn on_tick(&mut self) {
        self.tick += 1;
        let interval = self.config.game.keepalive_interval_ticks;
        if interval > 0 && self.tick % interval == 0 {
            trace!("Keepalive to {} connections", self.connections.len());
            self.pending_broadcasts.push_back(KeepAlive::default().to_frame());
            self.flush_broadcasts().await;
        }
    }

    async fn on_inbound(&mut self, event: Inbound) {
        match event {
            Inbound::Data { id, bytes } => self.handle_data(id, bytes).await,
            Inbound::Closed { id, error } => {
                let reason = match error {
                    Some(e) => ServerError::Transport(e),
                    None => ServerError::Transport(io::ErrorKind::UnexpectedEof.into()),
                };
                self.remove_connection(id, &reason);
                self.flush_broadcasts().await;
            }
        }
    }

    /// Feed bytes to the connection's assembler and handle every frame they
    /// complete.
    async fn handle_data(&mut self, id: ConnectionId, mut input: Bytes) {
        loop {
            let online = self.connections.len();
            // Gone already: late bytes from a removed connection.
            let Some(conn) = self.connections.get_mut(id) else {
                return;
            };
            let frame = match conn.session.assembler_mut().feed(&mut input) {
                Ok(FrameResult::Complete(frame)) => frame,
                Ok(FrameResult::NeedMore) => return,
                Err(e) => {
                    self.remove_connection(id, &e.into());
                    self.flush_broadcasts().await;
                    return;
                }
            };

            let mut ctx = Context {
                grid: &mut self.grid,
                online,
                config: &self.config,
            };
            let actions = match conn.session.handle_frame(frame, &mut ctx) {
                Ok(actions) => actions,
                Err(e) => {
                    self.remove_connection(id, &e.into());
                    self.flush_broadcasts().await;
                    return;
                }
            };

            if let Err(e) = self.deliver(id, actions.outbound).await {
                self.remove_connection(id, &e);
                self.flush_broadcasts().await;
                return;
            }
            if actions.close {
                if let Some(conn) = self.connections.remove(id) {
                    debug!("Closing {} after status ping", conn.session.label());
                    conn.close();
                }
                return;
            }
        }
    }

    /// Write a frame handler's output in order. Only a failure writing to
    /// `id` itself is returned; broadcast failures drop the failing peers.
    async fn deliver(
        &mut self,
        id: ConnectionId,
        outbound: Vec<Outbound>,
    ) -> Result<(), ServerError> {
        let timeout = self.config.network.write_timeout();
        for message in outbound {
            match message {
                Outbound::Reply(frame) => {
                    let Some(conn) = self.connections.get_mut(id) else {
                        return Ok(());
                    };
                    conn.send(&frame, timeout).await?;
                }
                Outbound::Broadcast(frame) => {
                    self.pending_broadcasts.push_back(frame);
                    self.flush_broadcasts().await;
                }
            }
        }
        Ok(())
    }

    /// Send queued broadcasts to every connection. Connections that fail are
    /// removed, which may queue further broadcasts; those are sent too.
    async fn flush_broadcasts(&mut self) {
        let timeout = self.config.network.write_timeout();
        while let Some(frame) = self.pending_broadcasts.pop_front() {
            let mut failed = Vec::new();
            for id in self.connections.ids() {
                if let Some(conn) = self.connections.get_mut(id) {
                    if let Err(e) = conn.send(&frame, timeout).await {
                        failed.push((id, e));
                    }
                }
            }
            for (id, e) in failed {
                self.remove_connection(id, &e);
            }
        }
    }

    /// Remove and close a connection, queueing a quit notice if it was
    /// playing.
    fn remove_connection(&mut self, id: ConnectionId, reason: &ServerError) {
        let Some(conn) = self.connections.remove(id) else {
            return;
        };
        info!(
            "{} from {} disconnected: {reason} ({} left)",
            conn.session.label(),
            conn.peer,
            self.connections.len()
        );
        if conn.session.phase() == Phase::Play && self.config.game.announce_joins {
            if let Some(name) = conn.session.username() {
                match ChatMessage::notice(&format!("{name} left the game")) {
                    Ok(notice) => self.pending_broadcasts.push_back(notice.to_frame()),
                    Err(e) => warn!("Failed to build quit notice: {e}"),
                }
            }
        }
        conn.close();
    }

    fn close_all(&mut self) {
        for id in self.connections.ids() {
            if let Some(conn) = self.connections.remove(id) {
                conn.close();
            }
        }
    }
}
