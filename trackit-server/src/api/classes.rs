//! Classes and rosters

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use trackit_common::db::models::{Class, ClassWithCount, StudentSummary};

use super::validation::{
    optional_text, parse_clock_time, require, require_text, JsonBody, QueryParams,
};
use crate::db::{classes, users};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassQuery {
    pub teacher_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub teacher_id: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub days_of_week: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub student_id: Option<String>,
}

/// GET /classes?teacherId=
pub async fn list_classes(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ClassQuery>,
) -> ApiResult<Json<Vec<ClassWithCount>>> {
    let teacher_id = require_text(query.teacher_id, "teacherId")?;
    Ok(Json(classes::list_by_teacher(&state.db, &teacher_id).await?))
}

/// POST /classes
pub async fn create_class(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateClassRequest>,
) -> ApiResult<Json<Class>> {
    let name = require_text(req.name, "name")?;
    let teacher_id = require_text(req.teacher_id, "teacherId")?;
    let start_time = parse_clock_time(&require_text(req.start_time, "startTime")?, "startTime")?;
    let end_time = parse_clock_time(&require_text(req.end_time, "endTime")?, "endTime")?;
    let days_of_week = match require(req.days_of_week, "daysOfWeek")? {
        days @ Value::Array(_) => days,
        _ => return Err(ApiError::bad_request("daysOfWeek must be an array")),
    };

    if !users::exists(&state.db, &teacher_id).await? {
        return Err(ApiError::not_found(format!("Teacher {teacher_id} not found")));
    }

    let class = classes::create(
        &state.db,
        classes::NewClass {
            name,
            description: optional_text(req.description),
            teacher_id,
            start_time,
            end_time,
            days_of_week,
        },
    )
    .await?;

    tracing::info!(class_id = %class.id, teacher_id = %class.teacher_id, "Created class");
    Ok(Json(class))
}

/// GET /classes/:id/students
pub async fn list_students(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
) -> ApiResult<Json<Vec<StudentSummary>>> {
    if classes::find_by_id(&state.db, &class_id).await?.is_none() {
        return Err(ApiError::not_found(format!("Class {class_id} not found")));
    }
    Ok(Json(classes::list_students(&state.db, &class_id).await?))
}

/// POST /classes/:id/students
///
/// 201 when the student was newly enrolled, 200 when already on the roster.
pub async fn enroll_student(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
    JsonBody(req): JsonBody<EnrollRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let student_id = require_text(req.student_id, "studentId")?;

    if classes::find_by_id(&state.db, &class_id).await?.is_none() {
        return Err(ApiError::not_found(format!("Class {class_id} not found")));
    }
    if !users::exists(&state.db, &student_id).await? {
        return Err(ApiError::not_found(format!("Student {student_id} not found")));
    }

    let enrolled = classes::enroll(&state.db, &class_id, &student_id).await?;
    let status = if enrolled {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(json!({
            "classId": class_id,
            "studentId": student_id,
            "enrolled": enrolled,
        })),
    ))
}
