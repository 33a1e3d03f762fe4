//! Staff management Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{LoginLog, Role, UserCreate, UserResponse, UserUpdate};

use crate::api::{ApiResult, ok};
use crate::auth::CurrentUser;
use crate::services::auth as auth_service;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub limit: Option<i64>,
}

/// GET /api/users - list users, optionally by role
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<UserResponse>> {
    let users = auth_service::list_users(&state, user.restaurant_id, query.role).await?;
    Ok(ok(users))
}

/// POST /api/users - create a user with any role
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<UserCreate>,
) -> ApiResult<UserResponse> {
    let created = auth_service::create_user(&state, &user, payload).await?;
    Ok(ok(created))
}

/// PUT /api/users/{id} - change name, role, rate or active flag
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> ApiResult<UserResponse> {
    let updated = auth_service::update_user(&state, &user, id, payload).await?;
    Ok(ok(updated))
}

/// GET /api/login-logs - newest login attempts first
pub async fn login_logs(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<LogQuery>,
) -> ApiResult<Vec<LoginLog>> {
    let logs = auth_service::login_history(&state, user.restaurant_id, query.limit).await?;
    Ok(ok(logs))
}
