// WebSocket module: the transport glue between sockets and rooms.
//
// - routes: HTTP route setup (room create/lookup, upgrade, health)
// - connection: per-socket reader/writer task pair

mod connection;
mod routes;

pub use routes::{create_router, AppState, RoomResponse};
