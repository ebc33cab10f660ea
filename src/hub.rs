//! The hub: room lookup, creation, and reaping of abandoned rooms.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use rand::distr::Alphanumeric;
use rand::Rng;

use crate::config::GameSettings;
use crate::game::Room;

/// Rooms are addressed by an opaque 9-character alphanumeric id.
pub const ROOM_ID_LENGTH: usize = 9;

/// Generate a random room id. Uniqueness against live rooms is the hub's job.
#[must_use]
pub fn generate_room_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ROOM_ID_LENGTH)
        .map(char::from)
        .collect()
}

struct HubEntry {
    room: Arc<Room>,
    created_at: Instant,
}

/// Maps room ids to live rooms. Shared across all HTTP handlers.
pub struct Hub {
    rooms: DashMap<String, HubEntry>,
    settings: GameSettings,
    outbound_capacity: usize,
}

impl Hub {
    #[must_use]
    pub fn new(settings: GameSettings, outbound_capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            rooms: DashMap::new(),
            settings,
            outbound_capacity,
        })
    }

    /// Create a room under a fresh unique id.
    pub fn create_room(&self) -> Arc<Room> {
        loop {
            let room_id = generate_room_id();
            // DashMap entry keeps the id check and insert atomic.
            let entry = self.rooms.entry(room_id.clone());
            if let dashmap::mapref::entry::Entry::Vacant(vacant) = entry {
                let room = Room::new(room_id.clone(), self.settings.clone(), self.outbound_capacity);
                vacant.insert(HubEntry {
                    room: Arc::clone(&room),
                    created_at: Instant::now(),
                });
                tracing::info!(%room_id, "Created room");
                return room;
            }
        }
    }

    #[must_use]
    pub fn room(&self, room_id: &str) -> Option<Arc<Room>> {
        self.rooms.get(room_id).map(|entry| Arc::clone(&entry.room))
    }

    #[must_use]
    pub fn contains(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn remove(&self, room_id: &str) {
        self.rooms.remove(room_id);
    }

    /// Periodically clean up rooms with no connected players. Rooms younger
    /// than one interval are spared so a creator has time to connect, and
    /// running games are never reaped.
    pub async fn reap_task(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            self.reap_once(interval).await;
        }
    }

    async fn reap_once(&self, min_age: Duration) {
        let expired: Vec<Arc<Room>> = self
            .rooms
            .iter()
            .filter(|entry| {
                entry.room.connected_count() == 0
                    && !entry.room.is_running()
                    && entry.created_at.elapsed() >= min_age
            })
            .map(|entry| Arc::clone(&entry.room))
            .collect();

        for room in expired {
            if room.cleanup().await {
                tracing::info!(room_id = %room.id(), "Removing empty room");
                self.remove(room.id());
            }
        }
    }
}
