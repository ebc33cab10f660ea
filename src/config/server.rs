//! Server behavior configuration types.

use serde::{Deserialize, Serialize};

use super::defaults::{
    default_max_message_size, default_outbound_queue_capacity, default_room_reap_interval_secs,
};

/// Connection and room-lifecycle configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Per-client outbound frame queue depth; a client that falls this far
    /// behind is disconnected
    #[serde(default = "default_outbound_queue_capacity")]
    pub outbound_queue_capacity: usize,
    /// Maximum accepted inbound frame size (bytes)
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
    /// Interval of the task that removes empty, idle rooms (seconds)
    #[serde(default = "default_room_reap_interval_secs")]
    pub room_reap_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            outbound_queue_capacity: default_outbound_queue_capacity(),
            max_message_size: default_max_message_size(),
            room_reap_interval_secs: default_room_reap_interval_secs(),
        }
    }
}
