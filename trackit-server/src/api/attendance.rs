//! Attendance records

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use trackit_common::db::models::{Attendance, AttendanceMethod, AttendanceStatus};

use super::validation::{optional_text, parse_enum, require_text, JsonBody, QueryParams};
use crate::db::attendance::{self, AttendanceMark};
use crate::db::{sessions, users};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceQuery {
    pub student_id: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordAttendanceRequest {
    pub session_id: Option<String>,
    pub student_id: Option<String>,
    pub status: Option<String>,
    pub method: Option<String>,
    pub confidence: Option<f64>,
}

/// GET /attendance?studentId= or ?sessionId=
///
/// By student: history with session and class. By session: records with
/// the student. `studentId` wins when both are given.
pub async fn list_attendance(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<AttendanceQuery>,
) -> ApiResult<Response> {
    if let Some(student_id) = optional_text(query.student_id) {
        let history = attendance::list_by_student(&state.db, &student_id).await?;
        return Ok(Json(history).into_response());
    }
    if let Some(session_id) = optional_text(query.session_id) {
        let records = attendance::list_by_session(&state.db, &session_id).await?;
        return Ok(Json(records).into_response());
    }
    Err(ApiError::bad_request("studentId or sessionId is required"))
}

/// POST /attendance
///
/// Upserts by (sessionId, studentId).
pub async fn record_attendance(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RecordAttendanceRequest>,
) -> ApiResult<Json<Attendance>> {
    let session_id = require_text(req.session_id, "sessionId")?;
    let student_id = require_text(req.student_id, "studentId")?;
    let status: AttendanceStatus = parse_enum(&require_text(req.status, "status")?, "status")?;
    let method = match optional_text(req.method) {
        Some(m) => parse_enum(&m, "method")?,
        None => AttendanceMethod::Manual,
    };

    if sessions::find_by_id(&state.db, &session_id).await?.is_none() {
        return Err(ApiError::not_found(format!("Session {session_id} not found")));
    }
    if !users::exists(&state.db, &student_id).await? {
        return Err(ApiError::not_found(format!("Student {student_id} not found")));
    }

    let record = attendance::upsert(
        &state.db,
        &AttendanceMark {
            session_id,
            student_id,
            status,
            method,
            confidence: req.confidence,
        },
    )
    .await?;

    tracing::debug!(
        attendance_id = %record.id,
        status = %record.status,
        method = %record.method,
        "Recorded attendance"
    );
    Ok(Json(record))
}
