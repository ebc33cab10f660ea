#![cfg_attr(not(test), deny(clippy::panic))]

use clap::Parser;
use scrawl_server::websocket::AppState;
use scrawl_server::{config, hub::Hub, logging, websocket};
use std::net::SocketAddr;
use std::time::Duration;

/// Scrawl -- multi-room drawing-and-guessing game server
#[derive(Parser, Debug)]
#[command(name = "scrawl-server")]
#[command(about = "A multi-room, real-time drawing-and-guessing game server over WebSockets")]
#[command(version)]
struct Cli {
    /// Validate configuration and exit without starting the server.
    #[arg(long, short = 'c', conflicts_with = "print_config")]
    validate_config: bool,

    /// Print the loaded configuration to stdout (as JSON) and exit.
    #[arg(long, conflicts_with = "validate_config")]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from config.json if present; otherwise use code defaults.
    let cfg = config::load();

    if cli.print_config {
        let json = serde_json::to_string_pretty(&cfg)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    // config::load() only reports validation problems to stderr; capture the
    // result here for a proper exit code.
    let validation_result = config::validate(&cfg);

    if cli.validate_config {
        match validation_result {
            Ok(()) => {
                println!("Configuration validation passed");
                println!();
                println!("Configuration summary:");
                println!("  Port: {}", cfg.port);
                println!("  Max players per room: {}", cfg.game.max_players);
                println!("  Rounds per game: {}", cfg.game.max_rounds);
                println!("  Drawing time: {}s", cfg.game.max_drawing_secs);
                println!("  Room reap interval: {}s", cfg.server.room_reap_interval_secs);
                return Ok(());
            }
            Err(e) => {
                eprintln!("Configuration validation failed:\n{e}");
                std::process::exit(1);
            }
        }
    }

    validation_result?;

    // Initialize logging from config.
    logging::init_with_config(&cfg.logging);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!(%addr, "Starting scrawl server");

    let hub = Hub::new(cfg.game.clone(), cfg.server.outbound_queue_capacity);

    // Reap empty rooms in the background.
    let reap_interval = Duration::from_secs(cfg.server.room_reap_interval_secs);
    tokio::spawn(std::sync::Arc::clone(&hub).reap_task(reap_interval));

    let state = AppState {
        hub,
        max_message_size: cfg.server.max_message_size,
    };
    let app = websocket::create_router(&cfg.cors_origins).with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        cors_origins = %cfg.cors_origins,
        "Server started - WebSocket: /ws/{{room_id}}, rooms: /api/room"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
