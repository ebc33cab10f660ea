//! Root configuration types.

use serde::{Deserialize, Serialize};

use super::defaults::{default_cors_origins, default_port};
use super::game::GameSettings;
use super::logging::LoggingConfig;
use super::server::ServerConfig;

/// Root configuration struct for the scrawl server.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Comma-separated allowed CORS origins, or "*" for permissive
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub game: GameSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            cors_origins: default_cors_origins(),
            server: ServerConfig::default(),
            game: GameSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}
