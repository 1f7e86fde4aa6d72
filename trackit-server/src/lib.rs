//! trackit-server library
//!
//! HTTP API over the attendance schema plus the room-scoped WebSocket
//! relay. `main` wires configuration and the database into [`AppState`];
//! tests build the same router around an in-memory database.

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod analytics;
pub mod api;
pub mod client;
pub mod db;
pub mod error;
pub mod insight;
pub mod relay;

use insight::InsightProvider;
use relay::{EventRelay, RelayHub};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Room relay, shared with every WebSocket connection
    pub relay: EventRelay,
    pub insight: Arc<dyn InsightProvider>,
}

impl AppState {
    pub fn new(db: SqlitePool, hub: Arc<RelayHub>, insight: Arc<dyn InsightProvider>) -> Self {
        Self {
            db,
            relay: EventRelay::new(hub),
            insight,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let resources = Router::new()
        .route("/users", post(api::register_user))
        .route("/classes", get(api::list_classes).post(api::create_class))
        .route(
            "/classes/:id/students",
            get(api::list_students).post(api::enroll_student),
        )
        .route("/sessions", get(api::list_sessions).post(api::create_session))
        .route(
            "/attendance",
            get(api::list_attendance).post(api::record_attendance),
        )
        .route("/skills", get(api::list_skills).post(api::add_skill))
        .route("/career-goals", get(api::list_goals).post(api::create_goal))
        .route("/schedule", get(api::list_items).post(api::create_item));

    let ai = Router::new()
        .route("/ai/face-recognition", post(api::face_recognition))
        .route("/ai/analytics", post(api::attendance_analytics));

    let relay = Router::new()
        .route(api::socket::WS_PATH, get(api::ws_upgrade))
        .route("/socketio", get(api::relay_info).post(api::inject_event));

    Router::new()
        .merge(resources)
        .merge(ai)
        .merge(relay)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
