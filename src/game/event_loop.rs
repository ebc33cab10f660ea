//! The room's event loop: the single consumer of the inbound queue.
//!
//! Every frame from every connection, plus join/leave notifications from the
//! connection layer, funnels through here in arrival order. Handlers mutate
//! the registry, chat, drawing and status directly; the only cross-task
//! signals are the selection and guess channels into the turn driver.

use std::sync::Arc;

use rand::seq::SliceRandom;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::config::MIN_TURN_PLAYERS;
use crate::protocol::{
    ChatKind, ChatMessageEvent, DrawAction, DrawEvent, DrawSelectColourEvent,
    DrawSelectThicknessEvent, DrawTempEvent, GameEvent, GamePhase, JoinLeaveAction,
    NewGameResetEvent, ReadyEvent, StartGameEvent, TurnPhase, TurnWordSelectedEvent,
    UserJoinLeaveEvent, User,
};

use super::turn::{GuessAttempt, TurnDriver, WordChoice};
use super::GameCore;

/// Everything the event loop consumes, in FIFO order per connection.
pub(crate) enum Inbound {
    /// A raw text frame from a connected client.
    Frame { sender: User, frame: String },
    /// Posted by the connection layer after a connection is registered;
    /// never travels over the wire.
    Joined { user: User },
    /// Posted by the connection layer when a connection dies. `conn_id`
    /// distinguishes a stale teardown from the connection that replaced it.
    Left { user: User, conn_id: u64 },
}

pub(crate) struct EventLoop {
    core: Arc<GameCore>,
    inbound: mpsc::UnboundedReceiver<Inbound>,
    cleanup: mpsc::Receiver<oneshot::Sender<()>>,
    selection_tx: Option<mpsc::UnboundedSender<WordChoice>>,
    guess_tx: Option<mpsc::UnboundedSender<GuessAttempt>>,
}

impl EventLoop {
    pub(crate) fn new(
        core: Arc<GameCore>,
        inbound: mpsc::UnboundedReceiver<Inbound>,
        cleanup: mpsc::Receiver<oneshot::Sender<()>>,
    ) -> Self {
        Self {
            core,
            inbound,
            cleanup,
            selection_tx: None,
            guess_tx: None,
        }
    }

    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                request = self.cleanup.recv() => {
                    let Some(ack) = request else { return };
                    self.teardown();
                    let _ = ack.send(());
                    return;
                }
                message = self.inbound.recv() => {
                    let Some(message) = message else { return };
                    match message {
                        Inbound::Frame { sender, frame } => self.handle_frame(&sender, &frame),
                        Inbound::Joined { user } => self.handle_joined(user),
                        Inbound::Left { user, conn_id } => self.handle_left(user, conn_id),
                    }
                }
            }
        }
    }

    fn handle_frame(&mut self, sender: &User, frame: &str) {
        if sender.is_system() {
            tracing::warn!("Dropping frame claiming the system identity");
            return;
        }

        let event = match GameEvent::decode(frame) {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(sender_id = %sender.id, error = %err, "Dropping malformed frame");
                return;
            }
        };

        if event.kind().is_server_only() {
            tracing::warn!(
                sender_id = %sender.id,
                kind = ?event.kind(),
                "Dropping server-only event from client"
            );
            return;
        }

        match event {
            GameEvent::Chat(chat) => self.handle_chat(sender, chat),
            GameEvent::Draw(draw) => self.handle_draw(sender, &draw),
            GameEvent::DrawTemp(temp) => self.handle_draw_temp(sender, temp),
            GameEvent::DrawSelectColour(select) => self.handle_select_colour(sender, &select),
            GameEvent::DrawSelectThickness(select) => self.handle_select_thickness(sender, &select),
            GameEvent::Ready(ready) => self.handle_ready(sender, &ready),
            GameEvent::StartGameIssued(_) => self.handle_start_issued(sender),
            GameEvent::TurnWordSelected(selected) => self.handle_word_selected(sender, &selected),
            GameEvent::NewGameIssued(_) => self.handle_new_game_issued(sender),
            other => {
                tracing::warn!(sender_id = %sender.id, kind = ?other.kind(), "Unhandled client event");
            }
        }
    }

    /// Chat doubles as the guessing channel while a drawing turn runs.
    fn handle_chat(&mut self, sender: &User, chat: ChatMessageEvent) {
        if chat.kind != ChatKind::UserMessage {
            tracing::warn!(sender_id = %sender.id, "Dropping chat with non-user message type");
            return;
        }

        if self.core.status.phase() == GamePhase::Started
            && self.core.status.turn_phase() == TurnPhase::Drawing
        {
            if let Some(tx) = &self.guess_tx {
                let attempt = GuessAttempt {
                    user: sender.clone(),
                    value: chat.message.clone(),
                    at: Instant::now(),
                };
                if tx.send(attempt).is_ok() {
                    return;
                }
            }
            // Driver already gone; fall through to a plain chat broadcast.
        }

        self.core
            .send_chat_all(ChatMessageEvent::user_message(sender.clone(), chat.message));
    }

    fn is_current_drawer(&self, sender: &User) -> bool {
        self.core.status.current_turn_id().as_deref() == Some(sender.id.as_str())
    }

    fn handle_draw(&self, sender: &User, draw: &DrawEvent) {
        if !self.is_current_drawer(sender) {
            tracing::warn!(sender_id = %sender.id, "Draw event from non-drawer");
            return;
        }

        let applied = match draw.action {
            DrawAction::Line => self.core.drawing.promote_temp(),
            DrawAction::Clear => self.core.drawing.clear(),
            DrawAction::Undo => self.core.drawing.undo(),
            DrawAction::Redo => self.core.drawing.redo(),
        };

        if applied {
            // The drawer already rendered locally; everyone else replays it.
            self.core.players.send_to_all_except(
                &GameEvent::Draw(DrawEvent {
                    user: sender.clone(),
                    action: draw.action,
                }),
                &sender.id,
            );
        }
    }

    fn handle_draw_temp(&self, sender: &User, temp: DrawTempEvent) {
        if !self.is_current_drawer(sender) {
            tracing::warn!(sender_id = %sender.id, "Temp stroke from non-drawer");
            return;
        }

        self.core.drawing.append_temp(&temp.line);
        self.core.players.send_to_all_except(
            &GameEvent::DrawTemp(DrawTempEvent {
                user: sender.clone(),
                line: temp.line,
            }),
            &sender.id,
        );
    }

    fn handle_select_colour(&self, sender: &User, select: &DrawSelectColourEvent) {
        if !self.is_current_drawer(sender) {
            tracing::warn!(sender_id = %sender.id, "Colour selection from non-drawer");
            return;
        }

        self.core.drawing.set_temp_colour(select.colour_idx);
        self.core.players.send_to_all_except(
            &GameEvent::DrawSelectColour(DrawSelectColourEvent {
                user: sender.clone(),
                colour_idx: select.colour_idx,
            }),
            &sender.id,
        );
    }

    fn handle_select_thickness(&self, sender: &User, select: &DrawSelectThicknessEvent) {
        if !self.is_current_drawer(sender) {
            tracing::warn!(sender_id = %sender.id, "Thickness selection from non-drawer");
            return;
        }

        self.core.drawing.set_temp_thickness(select.thickness_idx);
        self.core.players.send_to_all_except(
            &GameEvent::DrawSelectThickness(DrawSelectThicknessEvent {
                user: sender.clone(),
                thickness_idx: select.thickness_idx,
            }),
            &sender.id,
        );
    }

    fn handle_ready(&self, sender: &User, ready: &ReadyEvent) {
        let effective = self.core.players.ready_player(&sender.id, ready.ready);
        self.core.players.send_to_all(&GameEvent::Ready(ReadyEvent {
            user: sender.clone(),
            ready: effective,
        }));
    }

    fn handle_start_issued(&mut self, sender: &User) {
        if self.core.players.room_leader_id().as_deref() != Some(sender.id.as_str()) {
            tracing::warn!(sender_id = %sender.id, "Start request from non-leader");
            return;
        }
        if self.core.status.phase() != GamePhase::WaitingReadyUp {
            tracing::warn!(sender_id = %sender.id, "Start request outside ready-up phase");
            return;
        }
        self.start_game();
    }

    fn start_game(&mut self) {
        let Some(mut order) = self.core.players.all_players_ready() else {
            tracing::info!("Start refused: not all players ready");
            return;
        };
        if order.len() < MIN_TURN_PLAYERS {
            tracing::info!(count = order.len(), "Start refused: not enough players");
            return;
        }
        if order.len() > self.core.settings.max_players {
            tracing::warn!(count = order.len(), "Start refused: too many players");
            return;
        }

        order.shuffle(&mut rand::rng());

        self.core.status.set_player_order(order.clone());
        let first_id = &order[0];
        let Some(first_user) = self.core.players.user_of(first_id) else {
            tracing::error!(%first_id, "Turn order references unknown player");
            return;
        };

        self.core
            .players
            .send_to_all(&GameEvent::StartGame(StartGameEvent {
                player_order_ids: order.clone(),
                current_turn_user: first_user,
            }));
        self.core.status.set_phase(GamePhase::Started);

        let (selection_tx, selection_rx) = mpsc::unbounded_channel();
        let (guess_tx, guess_rx) = mpsc::unbounded_channel();
        self.selection_tx = Some(selection_tx);
        self.guess_tx = Some(guess_tx);

        tokio::spawn(TurnDriver::new(Arc::clone(&self.core), selection_rx, guess_rx).run());
        tracing::info!(players = order.len(), "Game started");
    }

    fn handle_word_selected(&self, sender: &User, selected: &TurnWordSelectedEvent) {
        if !self.is_current_drawer(sender) {
            tracing::warn!(sender_id = %sender.id, "Word selection from non-drawer");
            return;
        }
        if let Some(tx) = &self.selection_tx {
            let _ = tx.send(WordChoice {
                user: sender.clone(),
                index: selected.index,
                at: Instant::now(),
            });
        }
    }

    fn handle_new_game_issued(&mut self, sender: &User) {
        if self.core.players.room_leader_id().as_deref() != Some(sender.id.as_str()) {
            tracing::warn!(sender_id = %sender.id, "New-game request from non-leader");
            return;
        }
        if self.core.status.phase() == GamePhase::Started {
            tracing::warn!(sender_id = %sender.id, "New-game request while game in progress");
            return;
        }

        self.core.status.reset();
        self.core.players.reset();
        self.core.chat.clear();
        self.core.drawing.clear();
        self.selection_tx = None;
        self.guess_tx = None;

        let player_states = self.core.players.players_summary().player_states;
        self.core
            .players
            .send_to_all(&GameEvent::NewGameReset(NewGameResetEvent { player_states }));
        tracing::info!("Room reset for a new game");
    }

    fn handle_joined(&self, user: User) {
        let rehydrate = self.core.rehydrate_for(&user);
        self.core
            .players
            .send_to_one(&GameEvent::Rehydrate(Box::new(rehydrate)), &user.id);

        self.core
            .players
            .send_to_all(&GameEvent::UserJoinLeave(UserJoinLeaveEvent {
                user: user.clone(),
                action: JoinLeaveAction::Join,
            }));
        self.core.send_chat_all(ChatMessageEvent::joined(user.clone()));
        tracing::info!(user_id = %user.id, "User joined room");
    }

    fn handle_left(&self, user: User, conn_id: u64) {
        // A mismatched conn_id means the connection was already replaced by a
        // reconnect; nothing to announce.
        if self
            .core
            .players
            .remove_connection(&user.id, conn_id)
            .is_none()
        {
            return;
        }

        self.core
            .players
            .send_to_all(&GameEvent::UserJoinLeave(UserJoinLeaveEvent {
                user: user.clone(),
                action: JoinLeaveAction::Leave,
            }));
        self.core.send_chat_all(ChatMessageEvent::left(user.clone()));
        tracing::info!(user_id = %user.id, "User left room");
    }

    /// Room teardown: wipe all state and drop the coordination channels so a
    /// waiting turn driver terminates.
    fn teardown(&mut self) {
        self.core.chat.clear();
        self.core.drawing.clear();
        self.core.status.reset();
        self.core.players.cleanup();
        self.selection_tx = None;
        self.guess_tx = None;
    }
}
