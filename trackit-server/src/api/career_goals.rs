//! Career goals

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use trackit_common::db::models::{CareerGoal, Priority};

use super::validation::{
    optional_text, parse_date_or_timestamp, parse_enum, require_text, JsonBody, QueryParams,
};
use crate::db::career_goals::{self, NewCareerGoal};
use crate::db::users;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalQuery {
    pub user_id: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalRequest {
    pub user_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub target_date: Option<String>,
    pub priority: Option<String>,
    pub salary_range: Option<Value>,
    pub market_demand: Option<String>,
}

fn priority_or_medium(value: Option<String>, field: &str) -> ApiResult<Priority> {
    match optional_text(value) {
        Some(p) => parse_enum(&p, field),
        None => Ok(Priority::Medium),
    }
}

/// GET /career-goals?userId=&category=
pub async fn list_goals(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<GoalQuery>,
) -> ApiResult<Json<Vec<CareerGoal>>> {
    let user_id = require_text(query.user_id, "userId")?;
    let category = optional_text(query.category);
    Ok(Json(
        career_goals::list_by_user(&state.db, &user_id, category.as_deref()).await?,
    ))
}

/// POST /career-goals
pub async fn create_goal(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateGoalRequest>,
) -> ApiResult<(StatusCode, Json<CareerGoal>)> {
    let user_id = require_text(req.user_id, "userId")?;
    let title = require_text(req.title, "title")?;
    let description = require_text(req.description, "description")?;
    let category = require_text(req.category, "category")?;
    let target_date =
        parse_date_or_timestamp(&require_text(req.target_date, "targetDate")?, "targetDate")?;
    let priority = priority_or_medium(req.priority, "priority")?;
    let market_demand = priority_or_medium(req.market_demand, "marketDemand")?;

    if !users::exists(&state.db, &user_id).await? {
        return Err(ApiError::not_found(format!("User {user_id} not found")));
    }

    let goal = career_goals::create(
        &state.db,
        NewCareerGoal {
            user_id,
            title,
            description,
            category,
            target_date,
            priority,
            salary_range: req.salary_range.filter(|v| !v.is_null()),
            market_demand,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(goal)))
}
