//! One WebSocket connection, from upgrade to disconnect
//!
//! The connection is registered before anything is read, greeted with a
//! `connected` frame, and unregistered (with all of its rooms) as soon as
//! the read side ends.

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};
use trackit_common::events::{names, Connected};
use trackit_common::time::now_iso;
use uuid::Uuid;

use super::EventRelay;

/// New opaque connection id
pub fn new_connection_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Drive a connection until the client goes away
pub async fn run_connection(ws: WebSocket, relay: EventRelay) {
    let conn_id = new_connection_id();
    let hub = relay.hub().clone();

    let Some(mut outbox) = hub.register(&conn_id).await else {
        warn!(conn_id, "Connection id collision, closing");
        return;
    };
    let connections = hub.count().await;
    info!(conn_id, connections, "Client connected");

    hub.send_to(
        &conn_id,
        names::CONNECTED,
        &Connected {
            message: "Connected to TrackIt relay".to_string(),
            socket_id: conn_id.clone(),
            timestamp: now_iso(),
        },
    )
    .await;

    let (mut ws_tx, mut ws_rx) = ws.split();

    let writer_id = conn_id.clone();
    let writer = tokio::spawn(async move {
        while let Some(text) = outbox.recv().await {
            if ws_tx.send(Message::Text(text)).await.is_err() {
                debug!(conn_id = %writer_id, "Socket closed while writing");
                break;
            }
        }
    });

    while let Some(Ok(msg)) = ws_rx.next().await {
        match msg {
            Message::Text(text) => {
                relay.handle_text(&conn_id, &text).await;
            }
            Message::Binary(data) => match std::str::from_utf8(&data) {
                Ok(text) => {
                    relay.handle_text(&conn_id, text).await;
                }
                Err(_) => debug!(conn_id, len = data.len(), "Ignoring non-UTF8 binary frame"),
            },
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    hub.unregister(&conn_id).await;
    writer.abort();
    let connections = hub.count().await;
    info!(conn_id, connections, "Client disconnected");
}
