//! User registration
//!
//! Find-or-create by email. No credentials are checked.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use trackit_common::db::models::UserRole;

use super::validation::{optional_text, parse_enum, require_text, JsonBody};
use crate::db::users;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
}

/// POST /users
pub async fn register_user(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> ApiResult<Json<UserResponse>> {
    let email = require_text(req.email, "email")?;
    let role = require_text(req.role, "role")?;
    let role: UserRole = parse_enum(&role.to_uppercase(), "role")?;

    let (user, _created) =
        users::find_or_create(&state.db, email.trim(), optional_text(req.name).as_deref(), role)
            .await?;

    Ok(Json(UserResponse {
        id: user.id,
        email: user.email,
        name: user.name,
        role: user.role,
    }))
}
