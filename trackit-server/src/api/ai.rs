//! AI-labelled endpoints
//!
//! Both endpoints go through the configured [`InsightProvider`] and fall
//! back to canned content whenever it fails.
//!
//! [`InsightProvider`]: crate::insight::InsightProvider

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::{json, Value};
use trackit_common::db::models::{AttendanceMethod, AttendanceStatus};
use trackit_common::events::{names, session_room, AiRecognitionCompleted};
use trackit_common::time::now_iso;

use super::validation::{optional_text, require_text, JsonBody};
use crate::analytics::AttendanceStats;
use crate::db::attendance::{self, AttendanceMark};
use crate::db::{classes, sessions, users};
use crate::error::{ApiError, ApiResult};
use crate::insight::{
    attendance_analysis_or_fallback, face_analysis_or_fallback, AnalysisTarget, InsightRequest,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceRecognitionRequest {
    pub image_data: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRequest {
    pub class_id: Option<String>,
    pub student_id: Option<String>,
    pub time_range: Option<String>,
}

/// POST /ai/face-recognition
///
/// Marks one student of the session's class present by facial recognition.
/// The student is picked at random from the roster: matching faces against
/// students is outside what the insight provider offers.
pub async fn face_recognition(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<FaceRecognitionRequest>,
) -> ApiResult<Response> {
    let image_data = require_text(req.image_data, "imageData")?;
    let session_id = require_text(req.session_id, "sessionId")?;

    let session = sessions::find_by_id(&state.db, &session_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Session {session_id} not found")))?;

    let analysis = face_analysis_or_fallback(
        state.insight.as_ref(),
        &InsightRequest::Face {
            session_id: session_id.clone(),
            image_data,
        },
    )
    .await;

    if !analysis.is_face_detected {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "No face detected in image",
                "analysis": analysis,
            })),
        )
            .into_response());
    }

    let roster = classes::list_students(&state.db, &session.class_id).await?;
    let student = roster
        .choose(&mut rand::thread_rng())
        .cloned()
        .ok_or_else(|| ApiError::not_found("No students found in class"))?;

    let record = attendance::upsert(
        &state.db,
        &AttendanceMark {
            session_id: session_id.clone(),
            student_id: student.id.clone(),
            status: AttendanceStatus::Present,
            method: AttendanceMethod::FacialRecognition,
            confidence: Some(analysis.confidence),
        },
    )
    .await?;

    let analysis_value =
        serde_json::to_value(&analysis).map_err(|e| ApiError::Internal(e.to_string()))?;
    sessions::set_ai_analysis(&state.db, &session_id, analysis_value.clone()).await?;

    state
        .relay
        .hub()
        .broadcast(
            &session_room(&session_id),
            names::AI_RECOGNITION_COMPLETED,
            &AiRecognitionCompleted {
                session_id: json!(session_id),
                student_id: json!(student.id),
                success: json!(true),
                confidence: Some(json!(analysis.confidence)),
                timestamp: now_iso(),
            },
            None,
        )
        .await;

    tracing::info!(
        session_id = %session_id,
        student_id = %student.id,
        confidence = analysis.confidence,
        "Face recognition check-in"
    );

    Ok(Json(json!({
        "success": true,
        "attendance": record,
        "student": student,
        "analysis": analysis_value,
    }))
    .into_response())
}

/// POST /ai/analytics
pub async fn attendance_analytics(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AnalyticsRequest>,
) -> ApiResult<Json<Value>> {
    let class_id = require_text(req.class_id, "classId")?;
    let student_id = optional_text(req.student_id);

    let records = attendance::list_for_class(&state.db, &class_id, student_id.as_deref()).await?;
    if records.is_empty() {
        return Err(ApiError::not_found("No attendance data found"));
    }

    let (target_kind, target) = match &student_id {
        Some(id) => (
            AnalysisTarget::Student,
            serde_json::to_value(users::find_by_id(&state.db, id).await?),
        ),
        None => (
            AnalysisTarget::Class,
            serde_json::to_value(classes::find_by_id(&state.db, &class_id).await?),
        ),
    };
    let target = target.map_err(|e| ApiError::Internal(e.to_string()))?;

    let stats = AttendanceStats::from_records(&records);
    let stats_value =
        serde_json::to_value(&stats).map_err(|e| ApiError::Internal(e.to_string()))?;

    let analysis = attendance_analysis_or_fallback(
        state.insight.as_ref(),
        &InsightRequest::Attendance {
            target: target_kind,
            stats: stats_value.clone(),
            time_range: optional_text(req.time_range),
        },
    )
    .await;

    Ok(Json(json!({
        "stats": stats_value,
        "analysis": analysis,
        "target": target,
        "generatedAt": now_iso(),
    })))
}
