//! Shared helpers for trackit-server integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot`
use trackit_server::insight::{CannedInsightProvider, InsightProvider};
use trackit_server::relay::RelayHub;
use trackit_server::{build_router, AppState};

/// Router plus handles on the state behind it
pub struct TestApp {
    pub router: Router,
    pub db: sqlx::SqlitePool,
    pub hub: Arc<RelayHub>,
}

pub async fn setup_app() -> TestApp {
    setup_app_with(Arc::new(CannedInsightProvider)).await
}

pub async fn setup_app_with(insight: Arc<dyn InsightProvider>) -> TestApp {
    let db = trackit_common::db::init_memory_database()
        .await
        .expect("Should create in-memory database");
    let hub = Arc::new(RelayHub::default());
    let state = AppState::new(db.clone(), hub.clone(), insight);
    TestApp {
        router: build_router(state),
        db,
        hub,
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.post_raw(uri, body.to_string()).await
    }

    pub async fn post_raw(&self, uri: &str, body: String) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, extract_json(response.into_body()).await)
    }

    /// Register a user and return its id
    pub async fn user(&self, email: &str, role: &str) -> String {
        let (status, body) = self
            .post("/users", json!({ "email": email, "role": role, "name": email }))
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");
        body["id"].as_str().unwrap().to_string()
    }

    /// Create a class taught by `teacher_id` and return its id
    pub async fn class(&self, teacher_id: &str, name: &str) -> String {
        let (status, body) = self
            .post(
                "/classes",
                json!({
                    "name": name,
                    "teacherId": teacher_id,
                    "startTime": "09:00",
                    "endTime": "10:30",
                    "daysOfWeek": ["MON", "WED"],
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create class failed: {body}");
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn enroll(&self, class_id: &str, student_id: &str) {
        let (status, body) = self
            .post(
                &format!("/classes/{class_id}/students"),
                json!({ "studentId": student_id }),
            )
            .await;
        assert!(status.is_success(), "enroll failed: {body}");
    }

    /// Open a session for `class_id` and return its id
    pub async fn session(&self, class_id: &str) -> String {
        let (status, body) = self
            .post(
                "/sessions",
                json!({
                    "classId": class_id,
                    "startTime": "2025-03-03T09:00:00Z",
                    "endTime": "2025-03-03T10:30:00Z",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create session failed: {body}");
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn mark(&self, session_id: &str, student_id: &str, status: &str) -> Value {
        let (code, body) = self
            .post(
                "/attendance",
                json!({ "sessionId": session_id, "studentId": student_id, "status": status }),
            )
            .await;
        assert_eq!(code, StatusCode::OK, "mark failed: {body}");
        body
    }
}

/// Extract JSON body from response; empty bodies become `null`
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Poll until `room` has exactly `count` members
pub async fn wait_for_members(hub: &RelayHub, room: &str, count: usize) {
    for _ in 0..200 {
        if hub.members(room).await.len() == count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("room {room} never reached {count} members");
}

/// Poll until the hub has exactly `count` connections
pub async fn wait_for_connections(hub: &RelayHub, count: usize) {
    for _ in 0..200 {
        if hub.count().await == count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("hub never reached {count} connections");
}
