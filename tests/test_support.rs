//! Shared helpers for engine-level integration tests: channel-backed fake
//! clients driven against a room's public connect surface, with virtual time.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use scrawl_server::config::GameSettings;
use scrawl_server::game::{ClientConnection, ClientUplink, Room};
use scrawl_server::protocol::{
    ChatMessageEvent, EventKind, GameEvent, ReadyEvent, StartGameIssuedEvent,
    TurnWordSelectedEvent, User,
};

/// Upper bound on frames scanned while waiting for a specific event.
pub const FRAME_SCAN_LIMIT: usize = 5000;

/// Short phase timers so full games run in a handful of virtual seconds.
pub fn fast_settings() -> GameSettings {
    GameSettings {
        max_players: 8,
        max_rounds: 1,
        max_selectable_words: 3,
        max_turn_next_secs: 1,
        max_selection_secs: 3,
        max_drawing_secs: 10,
        max_turn_end_secs: 1,
        drawing_time_cut_secs: 3,
        hint_reveal_secs: Vec::new(),
    }
}

pub fn test_room(settings: GameSettings) -> Arc<Room> {
    Room::new("testroom1".to_string(), settings, 4096)
}

/// One fake client: a registered connection plus its uplink.
pub struct TestClient {
    pub user: User,
    conn: ClientConnection,
    uplink: ClientUplink,
}

impl TestClient {
    pub fn join(room: &Arc<Room>, id: &str) -> Self {
        let user = User::new(id, format!("name-{id}"));
        let conn = room.connect(user.clone()).expect("room should be open");
        let uplink = conn.uplink();
        Self { user, conn, uplink }
    }

    pub fn send(&self, event: &GameEvent) {
        self.uplink.submit_frame(event.encode().expect("encode event"));
    }

    pub fn send_chat(&self, message: &str) {
        self.send(&GameEvent::Chat(ChatMessageEvent::user_message(
            self.user.clone(),
            message,
        )));
    }

    pub fn send_ready(&self, ready: bool) {
        self.send(&GameEvent::Ready(ReadyEvent {
            user: self.user.clone(),
            ready,
        }));
    }

    pub fn send_start_game(&self) {
        self.send(&GameEvent::StartGameIssued(StartGameIssuedEvent {
            issuer: self.user.clone(),
        }));
    }

    pub fn send_word_selected(&self, index: usize) {
        self.send(&GameEvent::TurnWordSelected(TurnWordSelectedEvent {
            user: self.user.clone(),
            index,
        }));
    }

    pub fn disconnect(&self) {
        self.uplink.leave();
    }

    pub async fn next_event(&mut self) -> GameEvent {
        let frame = tokio::time::timeout(Duration::from_secs(600), self.conn.next_frame())
            .await
            .expect("timed out waiting for a frame")
            .expect("connection closed unexpectedly");
        GameEvent::decode(&frame).expect("server sent an undecodable frame")
    }

    /// Skip frames until one matches, within a bounded scan.
    pub async fn expect_event(&mut self, mut pred: impl FnMut(&GameEvent) -> bool) -> GameEvent {
        for _ in 0..FRAME_SCAN_LIMIT {
            let event = self.next_event().await;
            if pred(&event) {
                return event;
            }
        }
        panic!("no matching event within {FRAME_SCAN_LIMIT} frames");
    }

    pub async fn expect_kind(&mut self, kind: EventKind) -> GameEvent {
        self.expect_event(|event| event.kind() == kind).await
    }

    /// Like [`expect_kind`](Self::expect_kind), but fails the test if a
    /// forbidden event shows up first.
    pub async fn expect_kind_rejecting(&mut self, target: EventKind, forbidden: EventKind) -> GameEvent {
        self.expect_event(|event| {
            assert_ne!(
                event.kind(),
                forbidden,
                "saw forbidden {forbidden:?} while waiting for {target:?}"
            );
            event.kind() == target
        })
        .await
    }
}

/// Ready both clients up and start the game from the leader (index 0).
/// Returns the broadcast turn order.
pub async fn ready_up_and_start(clients: &mut [TestClient]) -> Vec<String> {
    for client in clients.iter() {
        client.send_ready(true);
    }
    // Every client sees one Ready echo per player.
    let player_count = clients.len();
    for client in clients.iter_mut() {
        for _ in 0..player_count {
            client
                .expect_event(|event| {
                    matches!(event, GameEvent::Ready(ready) if ready.ready)
                })
                .await;
        }
    }

    clients[0].send_start_game();

    let mut order = Vec::new();
    for client in clients.iter_mut() {
        let event = client.expect_kind(EventKind::StartGame).await;
        let GameEvent::StartGame(start) = event else {
            unreachable!()
        };
        order = start.player_order_ids;
    }
    order
}

/// Drive one complete turn: the drawer picks the first offered word, one
/// non-drawer guesses it, and everyone sees the turn end. Returns
/// `(drawer_id, word)`.
pub async fn play_full_turn(clients: &mut [TestClient]) -> (String, String) {
    // The selection offer identifies the drawer; the drawer's copy carries
    // the candidate list.
    let mut drawer_id = String::new();
    let mut words: Option<Vec<String>> = None;
    for client in clients.iter_mut() {
        let event = client
            .expect_event(|event| {
                matches!(event, GameEvent::TurnWordSelection(ev) if ev.nonce.is_some())
            })
            .await;
        let GameEvent::TurnWordSelection(selection) = event else {
            unreachable!()
        };
        let nonce = selection.nonce.expect("begin event carries a nonce");
        drawer_id = nonce.user.id;
        if let Some(list) = nonce.words {
            words = Some(list);
        }
    }
    let words = words.expect("the drawer copy carries the candidate words");
    let word = words[0].clone();

    let drawer_idx = clients
        .iter()
        .position(|c| c.user.id == drawer_id)
        .expect("drawer is one of the clients");
    clients[drawer_idx].send_word_selected(0);

    // Wait until the drawing phase is live, then guess.
    let guesser_idx = clients
        .iter()
        .position(|c| c.user.id != drawer_id)
        .expect("at least one non-drawer");
    clients[guesser_idx]
        .expect_event(|event| matches!(event, GameEvent::TurnDrawing(ev) if ev.nonce.is_some()))
        .await;
    clients[guesser_idx].send_chat(&word);

    for client in clients.iter_mut() {
        client
            .expect_event(|event| matches!(event, GameEvent::TurnEnd(ev) if ev.nonce.is_some()))
            .await;
    }

    (drawer_id, word)
}
