//! Schedule items

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use trackit_common::db::models::{Priority, ScheduleItem};

use super::validation::{
    optional_text, parse_clock_time, parse_date, parse_enum, require_text, JsonBody, QueryParams,
};
use crate::db::schedule::{self, DateRange, NewScheduleItem};
use crate::db::users;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleQuery {
    pub user_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub user_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub priority: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub reminders: Option<Value>,
}

/// GET /schedule?userId=&startDate=&endDate=
///
/// The date range applies only when both ends are given.
pub async fn list_items(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ScheduleQuery>,
) -> ApiResult<Json<Vec<ScheduleItem>>> {
    let user_id = require_text(query.user_id, "userId")?;

    let range = match (optional_text(query.start_date), optional_text(query.end_date)) {
        (Some(start), Some(end)) => Some(DateRange {
            start: parse_date(&start, "startDate")?,
            end: parse_date(&end, "endDate")?,
        }),
        _ => None,
    };

    Ok(Json(
        schedule::list_by_user(&state.db, &user_id, range.as_ref()).await?,
    ))
}

/// POST /schedule
pub async fn create_item(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateItemRequest>,
) -> ApiResult<(StatusCode, Json<ScheduleItem>)> {
    let user_id = require_text(req.user_id, "userId")?;
    let title = require_text(req.title, "title")?;
    let date = parse_date(&require_text(req.date, "date")?, "date")?;
    let start_time = parse_clock_time(&require_text(req.start_time, "startTime")?, "startTime")?;
    let end_time = parse_clock_time(&require_text(req.end_time, "endTime")?, "endTime")?;
    let item_type = require_text(req.item_type, "type")?;
    let priority = match optional_text(req.priority) {
        Some(p) => parse_enum(&p, "priority")?,
        None => Priority::Medium,
    };

    if !users::exists(&state.db, &user_id).await? {
        return Err(ApiError::not_found(format!("User {user_id} not found")));
    }

    let item = schedule::create(
        &state.db,
        NewScheduleItem {
            user_id,
            title,
            description: optional_text(req.description),
            date,
            start_time,
            end_time,
            item_type,
            priority,
            location: optional_text(req.location),
            notes: optional_text(req.notes),
            reminders: req.reminders.filter(|v| !v.is_null()),
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(item)))
}
