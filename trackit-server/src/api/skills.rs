//! User skills

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::validation::{optional_text, require_text, JsonBody, QueryParams};
use crate::db::skills::{self, UserSkillWithSkill};
use crate::db::users;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const DEFAULT_TARGET_LEVEL: i64 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillQuery {
    pub user_id: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSkillRequest {
    pub user_id: Option<String>,
    pub skill_id: Option<String>,
    pub target_level: Option<i64>,
}

/// GET /skills?userId=&category=
pub async fn list_skills(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SkillQuery>,
) -> ApiResult<Json<Vec<UserSkillWithSkill>>> {
    let user_id = require_text(query.user_id, "userId")?;
    let category = optional_text(query.category);
    Ok(Json(
        skills::list_by_user(&state.db, &user_id, category.as_deref()).await?,
    ))
}

/// POST /skills
///
/// 201 for a newly tracked skill, 200 with the existing record otherwise.
pub async fn add_skill(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AddSkillRequest>,
) -> ApiResult<(StatusCode, Json<UserSkillWithSkill>)> {
    let user_id = require_text(req.user_id, "userId")?;
    let skill_id = require_text(req.skill_id, "skillId")?;
    let target_level = req.target_level.unwrap_or(DEFAULT_TARGET_LEVEL);
    if !(0..=100).contains(&target_level) {
        return Err(ApiError::bad_request("targetLevel must be between 0 and 100"));
    }

    if !users::exists(&state.db, &user_id).await? {
        return Err(ApiError::not_found(format!("User {user_id} not found")));
    }

    let (user_skill, created) =
        skills::add_user_skill(&state.db, &user_id, &skill_id, target_level).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(user_skill)))
}
