//! Per-room game engine.
//!
//! A room is an independent, long-lived session. All state mutation is
//! serialized through two tasks: the event loop (inbound frames, joins,
//! leaves, cleanup) and the turn driver (phase transitions and timers, alive
//! only while a game runs). Connections feed the event loop through a single
//! inbound queue and drain per-client outbound queues.

pub mod chat;
pub mod drawing;
mod event_loop;
pub mod guess;
pub mod hint;
pub mod players;
pub mod status;
mod turn;

pub use players::{ConnectionHandle, PlayerRegistry};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::config::GameSettings;
use crate::protocol::{ChatMessageEvent, GameEvent, GamePhase, RehydrateEvent, User};
use crate::words::WordBank;

use chat::ChatLog;
use drawing::DrawingLog;
use event_loop::{EventLoop, Inbound};
use status::GameStatus;

/// Shared room state, reachable from the event loop, the turn driver and the
/// connection layer.
pub(crate) struct GameCore {
    pub(crate) settings: GameSettings,
    pub(crate) players: PlayerRegistry,
    pub(crate) chat: ChatLog,
    pub(crate) drawing: DrawingLog,
    pub(crate) status: GameStatus,
    pub(crate) bank: &'static WordBank,
}

impl GameCore {
    fn new(settings: GameSettings) -> Self {
        let max_players = settings.max_players;
        Self {
            settings,
            players: PlayerRegistry::new(max_players),
            chat: ChatLog::new(),
            drawing: DrawingLog::new(),
            status: GameStatus::new(),
            bank: WordBank::builtin(),
        }
    }

    /// Append to the chat history and broadcast to everyone connected.
    pub(crate) fn send_chat_all(&self, message: ChatMessageEvent) {
        self.chat.append(message.clone());
        self.players.send_to_all(&GameEvent::Chat(message));
    }

    /// The full-state envelope a newly connected client renders from.
    pub(crate) fn rehydrate_for(&self, viewer: &User) -> RehydrateEvent {
        let current_turn_user = self
            .status
            .current_turn_id()
            .and_then(|id| self.players.user_of(&id));
        RehydrateEvent {
            self_user: viewer.clone(),
            current_turn_user,
            chat_messages: self.chat.snapshot(),
            players: self.players.players_summary(),
            game: self.status.summary_for(&viewer.id, &self.settings),
            lines: self.drawing.snapshot(),
        }
    }
}

/// Returned when connecting to a room that has been cleaned up.
#[derive(Debug, thiserror::Error)]
#[error("room is closed")]
pub struct RoomClosed;

/// One game room. Created by the hub; owns the event-loop task.
pub struct Room {
    id: String,
    core: Arc<GameCore>,
    outbound_capacity: usize,
    inbound_tx: mpsc::UnboundedSender<Inbound>,
    cleanup_tx: mpsc::Sender<oneshot::Sender<()>>,
    closed: AtomicBool,
}

impl Room {
    /// Build the room and spawn its event loop. `outbound_capacity` bounds
    /// each client's outbound frame queue.
    #[must_use]
    pub fn new(id: String, settings: GameSettings, outbound_capacity: usize) -> Arc<Self> {
        let core = Arc::new(GameCore::new(settings));
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (cleanup_tx, cleanup_rx) = mpsc::channel(1);

        tokio::spawn(EventLoop::new(Arc::clone(&core), inbound_rx, cleanup_rx).run());

        Arc::new(Self {
            id,
            core,
            outbound_capacity,
            inbound_tx,
            cleanup_tx,
            closed: AtomicBool::new(false),
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// True while a game is in progress; such rooms refuse cleanup.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.core.status.phase() == GamePhase::Started
    }

    #[must_use]
    pub fn connected_count(&self) -> usize {
        self.core.players.connected_count()
    }

    /// Register `user` as connected: installs a fresh connection handle in
    /// the registry (replacing any previous one on reconnect) and notifies
    /// the event loop, which rehydrates the client and announces the join.
    pub fn connect(&self, user: User) -> Result<ClientConnection, RoomClosed> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(RoomClosed);
        }

        let (outbound_tx, outbound_rx) = mpsc::channel(self.outbound_capacity);
        let cancel = CancellationToken::new();
        let handle = ConnectionHandle::new(outbound_tx, cancel.clone());
        let conn_id = handle.conn_id();

        self.core.players.save_connection(&user, handle);

        self.inbound_tx
            .send(Inbound::Joined { user: user.clone() })
            .map_err(|_| RoomClosed)?;

        Ok(ClientConnection {
            outbound: outbound_rx,
            uplink: ClientUplink {
                user,
                conn_id,
                inbound_tx: self.inbound_tx.clone(),
                cancel,
                left: Arc::new(AtomicBool::new(false)),
            },
        })
    }

    /// Tear the room down. Refused while a game is running. Idempotent; on
    /// the first accepted call the event loop clears all state and exits.
    pub async fn cleanup(&self) -> bool {
        if self.is_running() {
            return false;
        }
        if self.closed.swap(true, Ordering::SeqCst) {
            return true;
        }

        let (ack_tx, ack_rx) = oneshot::channel();
        if self.cleanup_tx.send(ack_tx).await.is_ok() {
            let _ = ack_rx.await;
        }
        tracing::info!(room_id = %self.id, "Room cleaned up");
        true
    }
}

/// The transport-facing half of one client connection. The writer drains
/// [`next_frame`](Self::next_frame); the reader side lives on the
/// [`ClientUplink`].
pub struct ClientConnection {
    outbound: mpsc::Receiver<Arc<str>>,
    uplink: ClientUplink,
}

impl ClientConnection {
    #[must_use]
    pub fn user(&self) -> &User {
        self.uplink.user()
    }

    /// A clone of the inbound half, for the reader task.
    #[must_use]
    pub fn uplink(&self) -> ClientUplink {
        self.uplink.clone()
    }

    /// Next outbound frame for this client; `None` once the connection is
    /// replaced or the room torn down.
    pub async fn next_frame(&mut self) -> Option<Arc<str>> {
        self.outbound.recv().await
    }
}

/// Feeds one client's inbound frames into the room and signals disconnect.
#[derive(Clone)]
pub struct ClientUplink {
    user: User,
    conn_id: u64,
    inbound_tx: mpsc::UnboundedSender<Inbound>,
    cancel: CancellationToken,
    left: Arc<AtomicBool>,
}

impl ClientUplink {
    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    /// The token tripped when the room drops this connection (queue overflow
    /// or teardown); the transport should stop its reader and writer on it.
    #[must_use]
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Forward one raw text frame, tagged with this connection's identity.
    pub fn submit_frame(&self, frame: String) {
        let _ = self.inbound_tx.send(Inbound::Frame {
            sender: self.user.clone(),
            frame,
        });
    }

    /// Report this connection gone. The player record survives; only the
    /// connection state is dropped. Safe to call from both reader and writer
    /// teardown paths; the leave notification is delivered once.
    pub fn leave(&self) {
        self.cancel.cancel();
        if self.left.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.inbound_tx.send(Inbound::Left {
            user: self.user.clone(),
            conn_id: self.conn_id,
        });
    }
}
