//! HTTP surface: room creation and lookup, the WebSocket upgrade, and a
//! health check.

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::hub::Hub;
use crate::protocol::{User, SYSTEM_USER_ID};

use super::connection::serve_connection;

/// Shared state for all routes.
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<Hub>,
    pub max_message_size: usize,
}

/// Create the Axum router with WebSocket support
pub fn create_router(cors_origins: &str) -> axum::Router<AppState> {
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    // Parse CORS origins
    let cors = if cors_origins == "*" {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!("No valid CORS origins configured, using permissive CORS");
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };

    axum::Router::new()
        .route("/api/room", post(create_room))
        .route("/api/room/{room_id}", get(room_exists))
        .route("/ws/{room_id}", get(websocket_handler))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoomResponse {
    #[serde(rename = "roomID")]
    pub room_id: String,
    pub exists: bool,
}

async fn create_room(State(state): State<AppState>) -> Json<RoomResponse> {
    let room = state.hub.create_room();
    Json(RoomResponse {
        room_id: room.id().to_string(),
        exists: true,
    })
}

async fn room_exists(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Json<RoomResponse> {
    let exists = state.hub.contains(&room_id);
    Json(RoomResponse { room_id, exists })
}

/// Identity presented at upgrade time. Both halves are optional; missing
/// parts are generated server-side.
#[derive(Debug, Deserialize)]
struct IdentityQuery {
    uid: Option<String>,
    name: Option<String>,
}

fn resolve_identity(query: IdentityQuery) -> Result<User, &'static str> {
    let id = match query.uid {
        Some(uid) => {
            let uid = uid.trim().to_string();
            if uid.is_empty() {
                uuid::Uuid::new_v4().to_string()
            } else if uid == SYSTEM_USER_ID {
                return Err("reserved user id");
            } else {
                uid
            }
        }
        None => uuid::Uuid::new_v4().to_string(),
    };

    let name = match query.name {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => {
            let short: String = id.chars().take(6).collect();
            format!("player-{short}")
        }
    };

    Ok(User::new(id, name))
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Query(query): Query<IdentityQuery>,
) -> Response {
    let Some(room) = state.hub.room(&room_id) else {
        return (StatusCode::NOT_FOUND, "no such room").into_response();
    };

    let user = match resolve_identity(query) {
        Ok(user) => user,
        Err(reason) => return (StatusCode::BAD_REQUEST, reason).into_response(),
    };

    let max_message_size = state.max_message_size;
    ws.on_upgrade(move |socket| serve_connection(socket, room, user, max_message_size))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
