//! Drives one WebSocket against a room's client connection: a writer task
//! draining the outbound queue and a reader loop feeding the inbound queue.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

use crate::game::Room;
use crate::protocol::User;

pub(super) async fn serve_connection(
    socket: WebSocket,
    room: Arc<Room>,
    user: User,
    max_message_size: usize,
) {
    let connection = match room.connect(user) {
        Ok(connection) => connection,
        Err(err) => {
            tracing::warn!(room_id = %room.id(), error = %err, "Rejecting connection");
            return;
        }
    };
    let user_id = connection.user().id.clone();
    tracing::info!(room_id = %room.id(), %user_id, "WebSocket connection established");

    let uplink = connection.uplink();
    let (mut sink, mut stream) = socket.split();

    // Writer: drains the room's outbound queue for this client. A stalled or
    // failed write tears the connection down.
    let writer_uplink = uplink.clone();
    let writer_cancel = uplink.cancellation();
    let mut writer_connection = connection;
    let write_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                () = writer_cancel.cancelled() => break,
                frame = writer_connection.next_frame() => {
                    let Some(frame) = frame else { break };
                    if sink
                        .send(Message::Text(frame.as_ref().into()))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            }
        }
        writer_uplink.leave();
    });

    // Reader: one framed text message per iteration, forwarded to the room
    // tagged with this connection's identity.
    let reader_cancel = uplink.cancellation();
    loop {
        tokio::select! {
            () = reader_cancel.cancelled() => break,
            message = stream.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        if text.len() > max_message_size {
                            tracing::warn!(
                                %user_id,
                                size = text.len(),
                                max = max_message_size,
                                "Dropping oversized frame"
                            );
                            continue;
                        }
                        uplink.submit_frame(text.to_string());
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {
                        // Binary frames and control messages are not part of
                        // the protocol.
                    }
                    Some(Err(err)) => {
                        tracing::debug!(%user_id, error = %err, "WebSocket read error");
                        break;
                    }
                }
            }
        }
    }

    uplink.leave();
    let _ = write_task.await;
    tracing::info!(room_id = %room.id(), %user_id, "WebSocket connection closed");
}
