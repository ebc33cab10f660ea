//! Configuration validation.

use super::game::MIN_TURN_PLAYERS;
use super::Config;

/// Configuration problems that make the server refuse to start.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("game.max_players must be at least {MIN_TURN_PLAYERS}, got {0}")]
    TooFewPlayers(usize),
    #[error("game.max_selectable_words must be at least 1")]
    NoSelectableWords,
    #[error("game.drawing_time_cut_secs ({cut}) must be below game.max_drawing_secs ({max})")]
    CutExceedsDrawingTime { cut: u32, max: u32 },
    #[error("game.hint_reveal_secs must be strictly descending and below max_drawing_secs")]
    BadHintThresholds,
    #[error("server.outbound_queue_capacity must be at least 1")]
    ZeroOutboundCapacity,
}

/// Check the invariants the game engine assumes about its settings.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let game = &config.game;

    if game.max_players < MIN_TURN_PLAYERS {
        return Err(ConfigError::TooFewPlayers(game.max_players));
    }
    if game.max_selectable_words == 0 {
        return Err(ConfigError::NoSelectableWords);
    }
    if game.drawing_time_cut_secs >= game.max_drawing_secs {
        return Err(ConfigError::CutExceedsDrawingTime {
            cut: game.drawing_time_cut_secs,
            max: game.max_drawing_secs,
        });
    }
    let descending = game
        .hint_reveal_secs
        .windows(2)
        .all(|pair| pair[0] > pair[1]);
    let in_range = game
        .hint_reveal_secs
        .iter()
        .all(|&mark| mark < game.max_drawing_secs);
    if !descending || !in_range {
        return Err(ConfigError::BadHintThresholds);
    }
    if config.server.outbound_queue_capacity == 0 {
        return Err(ConfigError::ZeroOutboundCapacity);
    }

    Ok(())
}
