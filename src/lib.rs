#![cfg_attr(not(test), deny(clippy::panic))]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_excessive_bools
)]

//! # Scrawl Server
//!
//! A multi-room, real-time drawing-and-guessing game server over WebSockets.
//!
//! Each room runs an independent game session: players ready up, take turns
//! picking and drawing a word, and score points by guessing it from the
//! drawing before the clock runs out.

/// Server configuration and environment variables
pub mod config;

/// Per-room game engine: event loop, turn driver, players, chat, drawing
pub mod game;

/// Room registry and lifecycle
pub mod hub;

/// Structured logging configuration
pub mod logging;

/// Wire envelope and event payload definitions
pub mod protocol;

/// WebSocket connection handling and HTTP routes
pub mod websocket;

/// Word bank, censoring and hint derivation
pub mod words;
