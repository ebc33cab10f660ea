//! Game rule configuration: room capacity, round count and phase timers.

use serde::{Deserialize, Serialize};

use super::defaults::{
    default_drawing_time_cut_secs, default_hint_reveal_secs, default_max_drawing_secs,
    default_max_players, default_max_rounds, default_max_selectable_words,
    default_max_selection_secs, default_max_turn_end_secs, default_max_turn_next_secs,
};

/// A game cannot start with fewer ready players than this.
pub const MIN_TURN_PLAYERS: usize = 2;

/// Immutable per-room game settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct GameSettings {
    /// Room capacity; joiners beyond it become spectators
    #[serde(default = "default_max_players")]
    pub max_players: usize,
    /// Full cycles through the turn order before the game ends
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    /// Candidate words offered to the drawer each turn
    #[serde(default = "default_max_selectable_words")]
    pub max_selectable_words: usize,
    /// Turn-intro countdown (seconds)
    #[serde(default = "default_max_turn_next_secs")]
    pub max_turn_next_secs: u32,
    /// Word-selection countdown (seconds)
    #[serde(default = "default_max_selection_secs")]
    pub max_selection_secs: u32,
    /// Drawing countdown (seconds)
    #[serde(default = "default_max_drawing_secs")]
    pub max_drawing_secs: u32,
    /// Turn-end countdown (seconds)
    #[serde(default = "default_max_turn_end_secs")]
    pub max_turn_end_secs: u32,
    /// Remaining drawing time after the first correct guess (seconds)
    #[serde(default = "default_drawing_time_cut_secs")]
    pub drawing_time_cut_secs: u32,
    /// Seconds-left marks for hint reveals, descending
    #[serde(default = "default_hint_reveal_secs")]
    pub hint_reveal_secs: Vec<u32>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            max_players: default_max_players(),
            max_rounds: default_max_rounds(),
            max_selectable_words: default_max_selectable_words(),
            max_turn_next_secs: default_max_turn_next_secs(),
            max_selection_secs: default_max_selection_secs(),
            max_drawing_secs: default_max_drawing_secs(),
            max_turn_end_secs: default_max_turn_end_secs(),
            drawing_time_cut_secs: default_drawing_time_cut_secs(),
            hint_reveal_secs: default_hint_reveal_secs(),
        }
    }
}
