//! Attendance sessions

use axum::{
    extract::State,
    Json,
};
use serde::Deserialize;
use trackit_common::db::models::{AttendanceSession, SessionWithCounts};

use super::validation::{parse_timestamp, require_text, JsonBody, QueryParams};
use crate::db::{classes, sessions};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    pub class_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub class_id: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// GET /sessions?classId=
pub async fn list_sessions(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SessionQuery>,
) -> ApiResult<Json<Vec<SessionWithCounts>>> {
    let class_id = require_text(query.class_id, "classId")?;
    Ok(Json(sessions::list_by_class(&state.db, &class_id).await?))
}

/// POST /sessions
pub async fn create_session(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateSessionRequest>,
) -> ApiResult<Json<AttendanceSession>> {
    let class_id = require_text(req.class_id, "classId")?;
    let start_time = parse_timestamp(&require_text(req.start_time, "startTime")?, "startTime")?;
    let end_time = parse_timestamp(&require_text(req.end_time, "endTime")?, "endTime")?;

    if classes::find_by_id(&state.db, &class_id).await?.is_none() {
        return Err(ApiError::not_found(format!("Class {class_id} not found")));
    }

    let session = sessions::create(&state.db, &class_id, &start_time, &end_time).await?;
    tracing::info!(session_id = %session.id, class_id = %class_id, "Opened session");
    Ok(Json(session))
}
