//! Player registry: the per-room map of user-id to player record, room
//! leadership, and the broadcast/send primitives layered on each player's
//! outbound queue.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::protocol::{GameEvent, PlayerSnapshot, PlayersSummary, PointsAward, User};

static NEXT_CONN_ID: AtomicU64 = AtomicU64::new(1);

/// The writable half of one client connection: a bounded outbound frame
/// queue plus the token that tears the connection down.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    conn_id: u64,
    outbound: mpsc::Sender<Arc<str>>,
    cancel: CancellationToken,
}

impl ConnectionHandle {
    #[must_use]
    pub fn new(outbound: mpsc::Sender<Arc<str>>, cancel: CancellationToken) -> Self {
        Self {
            conn_id: NEXT_CONN_ID.fetch_add(1, Ordering::Relaxed),
            outbound,
            cancel,
        }
    }

    #[must_use]
    pub fn conn_id(&self) -> u64 {
        self.conn_id
    }

    /// Enqueue one frame. A full queue means the writer has stalled; the
    /// connection is cancelled rather than letting the queue grow unbounded.
    fn send(&self, frame: Arc<str>) -> bool {
        match self.outbound.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = self.conn_id, "Outbound queue overflow, dropping connection");
                self.cancel.cancel();
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }
}

#[derive(Debug)]
struct PlayerRecord {
    user: User,
    connection: Option<ConnectionHandle>,
    points: u32,
    wins: u32,
    is_spectator: bool,
    is_connected: bool,
    is_ready: bool,
    join_seq: u64,
}

impl PlayerRecord {
    fn snapshot(&self, leader_id: Option<&str>) -> PlayerSnapshot {
        PlayerSnapshot {
            user: self.user.clone(),
            points: self.points,
            wins: self.wins,
            is_spectator: self.is_spectator,
            is_connected: self.is_connected,
            is_ready: self.is_ready,
            is_room_leader: leader_id == Some(self.user.id.as_str()),
        }
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    players: HashMap<String, PlayerRecord>,
    room_leader_id: Option<String>,
    join_counter: u64,
}

impl RegistryInner {
    /// Reassign leadership to the earliest-joined still-connected
    /// non-spectator. Leaves the leader unchanged when nobody qualifies.
    fn reassign_leader(&mut self) {
        let successor = self
            .players
            .values()
            .filter(|p| p.is_connected && !p.is_spectator)
            .min_by_key(|p| p.join_seq)
            .map(|p| p.user.id.clone());
        if let Some(id) = successor {
            self.room_leader_id = Some(id);
        }
    }
}

/// Thread-safe player registry for one room. Player records are created on
/// first join and never removed; connections come and go.
#[derive(Debug)]
pub struct PlayerRegistry {
    inner: RwLock<RegistryInner>,
    max_players: usize,
}

impl PlayerRegistry {
    #[must_use]
    pub fn new(max_players: usize) -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
            max_players,
        }
    }

    fn read<R>(&self, f: impl FnOnce(&RegistryInner) -> R) -> R {
        let inner = self
            .inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&inner)
    }

    fn write<R>(&self, f: impl FnOnce(&mut RegistryInner) -> R) -> R {
        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut inner)
    }

    #[must_use]
    pub fn max_players(&self) -> usize {
        self.max_players
    }

    #[must_use]
    pub fn room_leader_id(&self) -> Option<String> {
        self.read(|inner| inner.room_leader_id.clone())
    }

    /// Register a connection for `user`. The first player ever to connect
    /// becomes room leader; a returning player keeps score and wins but gets
    /// the fresh connection handle; a brand-new player is flagged spectator
    /// when the room is already at capacity.
    pub fn save_connection(&self, user: &User, handle: ConnectionHandle) -> PlayerSnapshot {
        self.write(|inner| {
            if inner.room_leader_id.is_none() {
                inner.room_leader_id = Some(user.id.clone());
            }

            if let Some(record) = inner.players.get_mut(&user.id) {
                record.connection = Some(handle);
                record.is_connected = true;
                record.user = user.clone();
            } else {
                let is_spectator = inner.players.len() >= self.max_players;
                let join_seq = inner.join_counter;
                inner.join_counter += 1;
                inner.players.insert(
                    user.id.clone(),
                    PlayerRecord {
                        user: user.clone(),
                        connection: Some(handle),
                        points: 0,
                        wins: 0,
                        is_spectator,
                        is_connected: true,
                        is_ready: false,
                        join_seq,
                    },
                );
            }

            let leader = inner.room_leader_id.clone();
            inner.players[&user.id].snapshot(leader.as_deref())
        })
    }

    /// Mark the player disconnected and clear readiness. A `conn_id` that no
    /// longer matches the stored connection belongs to a connection that was
    /// already replaced by a reconnect and is ignored. Returns the
    /// post-removal snapshot when the disconnect applied.
    pub fn remove_connection(&self, user_id: &str, conn_id: u64) -> Option<PlayerSnapshot> {
        self.write(|inner| {
            let record = inner.players.get_mut(user_id)?;
            match &record.connection {
                Some(handle) if handle.conn_id() == conn_id => {}
                _ => return None,
            }
            record.connection = None;
            record.is_connected = false;
            record.is_ready = false;

            if inner.room_leader_id.as_deref() == Some(user_id) {
                inner.reassign_leader();
            }

            let leader = inner.room_leader_id.clone();
            Some(inner.players[user_id].snapshot(leader.as_deref()))
        })
    }

    /// Store a ready flag and return the value actually stored. Spectators
    /// and disconnected players are always forced to not-ready.
    pub fn ready_player(&self, user_id: &str, ready: bool) -> bool {
        self.write(|inner| {
            let Some(record) = inner.players.get_mut(user_id) else {
                tracing::warn!(%user_id, "Ready toggle for unknown player");
                return false;
            };
            let effective = ready && record.is_connected && !record.is_spectator;
            record.is_ready = effective;
            effective
        })
    }

    /// Ids of all connected non-spectators, iff every one of them is ready.
    #[must_use]
    pub fn all_players_ready(&self) -> Option<Vec<String>> {
        self.read(|inner| {
            let mut eligible: Vec<&PlayerRecord> = inner
                .players
                .values()
                .filter(|p| p.is_connected && !p.is_spectator)
                .collect();
            if eligible.iter().any(|p| !p.is_ready) {
                return None;
            }
            eligible.sort_by_key(|p| p.join_seq);
            Some(eligible.iter().map(|p| p.user.id.clone()).collect())
        })
    }

    /// True when no connected non-spectator remains.
    #[must_use]
    pub fn all_players_disconnected(&self) -> bool {
        self.read(|inner| {
            !inner
                .players
                .values()
                .any(|p| p.is_connected && !p.is_spectator)
        })
    }

    #[must_use]
    pub fn connected_players(&self, include_spectators: bool) -> Vec<User> {
        self.read(|inner| {
            let mut connected: Vec<&PlayerRecord> = inner
                .players
                .values()
                .filter(|p| p.is_connected && (include_spectators || !p.is_spectator))
                .collect();
            connected.sort_by_key(|p| p.join_seq);
            connected.iter().map(|p| p.user.clone()).collect()
        })
    }

    /// Number of connected clients, spectators included.
    #[must_use]
    pub fn connected_count(&self) -> usize {
        self.read(|inner| inner.players.values().filter(|p| p.is_connected).count())
    }

    #[must_use]
    pub fn user_of(&self, user_id: &str) -> Option<User> {
        self.read(|inner| inner.players.get(user_id).map(|p| p.user.clone()))
    }

    #[must_use]
    pub fn is_connected(&self, user_id: &str) -> bool {
        self.read(|inner| inner.players.get(user_id).is_some_and(|p| p.is_connected))
    }

    pub fn award_points(&self, user_id: &str, points: u32) {
        self.write(|inner| {
            if let Some(record) = inner.players.get_mut(user_id) {
                record.points += points;
            }
        });
    }

    pub fn reset_points(&self) {
        self.write(|inner| {
            for record in inner.players.values_mut() {
                record.points = 0;
            }
        });
    }

    /// All non-spectators sorted by points descending; ties keep join order.
    #[must_use]
    pub fn winners(&self) -> Vec<PointsAward> {
        self.read(|inner| {
            let mut standings: Vec<&PlayerRecord> = inner
                .players
                .values()
                .filter(|p| !p.is_spectator)
                .collect();
            standings.sort_by(|a, b| b.points.cmp(&a.points).then(a.join_seq.cmp(&b.join_seq)));
            standings
                .iter()
                .map(|p| PointsAward {
                    user: p.user.clone(),
                    points: p.points,
                })
                .collect()
        })
    }

    /// Credit a win to each listed player.
    pub fn record_wins(&self, user_ids: &[String]) {
        self.write(|inner| {
            for id in user_ids {
                if let Some(record) = inner.players.get_mut(id) {
                    record.wins += 1;
                }
            }
        });
    }

    /// Wipe readiness and points for all players (new-game reset).
    pub fn reset(&self) {
        self.write(|inner| {
            for record in inner.players.values_mut() {
                record.is_ready = false;
                record.points = 0;
            }
        });
    }

    /// Drop every record (room teardown).
    pub fn cleanup(&self) {
        self.write(|inner| {
            inner.players.clear();
            inner.room_leader_id = None;
        });
    }

    #[must_use]
    pub fn players_summary(&self) -> PlayersSummary {
        self.read(|inner| {
            let leader = inner.room_leader_id.clone();
            let mut records: Vec<&PlayerRecord> = inner.players.values().collect();
            records.sort_by_key(|p| p.join_seq);
            PlayersSummary {
                player_states: records
                    .iter()
                    .map(|p| p.snapshot(leader.as_deref()))
                    .collect(),
                max_players: self.max_players as u32,
            }
        })
    }

    /// Enqueue `event` on every connected player's outbound queue.
    pub fn send_to_all(&self, event: &GameEvent) {
        let Some(frame) = encode_frame(event) else {
            return;
        };
        self.read(|inner| {
            for record in inner.players.values().filter(|p| p.is_connected) {
                if let Some(handle) = &record.connection {
                    handle.send(Arc::clone(&frame));
                }
            }
        });
    }

    /// Broadcast to everyone except `excluded_id` (typically the sender, who
    /// already rendered the change locally).
    pub fn send_to_all_except(&self, event: &GameEvent, excluded_id: &str) {
        let Some(frame) = encode_frame(event) else {
            return;
        };
        self.read(|inner| {
            for record in inner
                .players
                .values()
                .filter(|p| p.is_connected && p.user.id != excluded_id)
            {
                if let Some(handle) = &record.connection {
                    handle.send(Arc::clone(&frame));
                }
            }
        });
    }

    /// Targeted send to a single connected player.
    pub fn send_to_one(&self, event: &GameEvent, user_id: &str) {
        let Some(frame) = encode_frame(event) else {
            return;
        };
        self.read(|inner| {
            let Some(record) = inner.players.get(user_id) else {
                tracing::warn!(%user_id, "Targeted send to unknown player");
                return;
            };
            if !record.is_connected {
                return;
            }
            if let Some(handle) = &record.connection {
                handle.send(frame);
            }
        });
    }
}

fn encode_frame(event: &GameEvent) -> Option<Arc<str>> {
    match event.encode() {
        Ok(frame) => Some(Arc::from(frame)),
        Err(err) => {
            tracing::error!(kind = ?event.kind(), error = %err, "Failed to encode outbound event");
            None
        }
    }
}
