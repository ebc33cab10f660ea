//! Default value functions for configuration fields, referenced by serde's
//! `#[serde(default = ...)]` attributes.

use super::logging::LogFormat;

// =============================================================================
// Port & Root Config
// =============================================================================

pub const fn default_port() -> u16 {
    3999
}

pub fn default_cors_origins() -> String {
    "*".to_string()
}

// =============================================================================
// Server Defaults
// =============================================================================

pub const fn default_outbound_queue_capacity() -> usize {
    256
}

pub const fn default_max_message_size() -> usize {
    64 * 1024
}

pub const fn default_room_reap_interval_secs() -> u64 {
    60
}

// =============================================================================
// Game Defaults
// =============================================================================

pub const fn default_max_players() -> usize {
    8
}

pub const fn default_max_rounds() -> u32 {
    2
}

pub const fn default_max_selectable_words() -> usize {
    3
}

pub const fn default_max_turn_next_secs() -> u32 {
    5
}

pub const fn default_max_selection_secs() -> u32 {
    5
}

pub const fn default_max_drawing_secs() -> u32 {
    60
}

pub const fn default_max_turn_end_secs() -> u32 {
    5
}

/// Seconds the drawing countdown is truncated to once the first correct
/// guess lands.
pub const fn default_drawing_time_cut_secs() -> u32 {
    10
}

/// Seconds-left marks at which single characters of the word are revealed.
pub fn default_hint_reveal_secs() -> Vec<u32> {
    vec![20, 15, 10]
}

// =============================================================================
// Logging Defaults
// =============================================================================

pub fn default_log_dir() -> String {
    "logs".to_string()
}

pub fn default_log_filename() -> String {
    "server.log".to_string()
}

pub fn default_rotation() -> String {
    "daily".to_string()
}

pub const fn default_enable_file_logging() -> bool {
    false
}

pub const fn default_log_format() -> LogFormat {
    LogFormat::Text
}
