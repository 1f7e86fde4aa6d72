//! Liveness and database check

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    /// `ok`, or `degraded` when the database does not answer
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    pub database: bool,
    pub relay_connections: usize,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<Health> {
    let database = sqlx::query("SELECT 1").execute(&state.db).await.is_ok();

    Json(Health {
        status: if database { "ok" } else { "degraded" },
        module: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        database,
        relay_connections: state.relay.hub().count().await,
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
