//! Relay HTTP surface: WebSocket upgrade, info and event injection

use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
    Json,
};
use serde_json::{json, Value};
use trackit_common::time::now_iso;

use super::validation::JsonBody;
use crate::error::{ApiError, ApiResult};
use crate::relay::{socket::run_connection, Origin};
use crate::AppState;

pub const WS_PATH: &str = "/ws";

/// GET /ws
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let relay = state.relay.clone();
    ws.on_upgrade(move |socket| run_connection(socket, relay))
}

/// GET /socketio
pub async fn relay_info(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "Relay server info endpoint",
        "path": WS_PATH,
        "connectedClients": state.relay.hub().count().await,
        "websocket": true,
    }))
}

/// POST /socketio
///
/// Injects a server-originated event: `type` names the event, the remaining
/// fields are its payload. There is no sender, so nobody is excluded.
pub async fn inject_event(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Json<Value>> {
    let Value::Object(mut fields) = body else {
        return Err(ApiError::bad_request("Request body must be a JSON object"));
    };

    let event_type = match fields.remove("type") {
        Some(Value::String(t)) if !t.trim().is_empty() => t,
        _ => return Err(ApiError::bad_request("type is required")),
    };

    let delivered = state
        .relay
        .handle_raw(Origin::Server, &event_type, Value::Object(fields))
        .await;
    tracing::debug!(event = %event_type, delivered, "Injected relay event");

    Ok(Json(json!({
        "message": "Event received",
        "type": event_type,
        "timestamp": now_iso(),
    })))
}
