//! Restaurant settings API
//!
//! | Path | Method | Roles |
//! |------|--------|-------|
//! | /api/settings | GET | staff |
//! | /api/settings | PUT | admin |

use axum::{
    Extension, Json, Router,
    extract::State,
    middleware,
    routing::{get, put},
};
use shared::models::{Role, SettingsMap};

use crate::api::{ApiResult, ok};
use crate::auth::{CurrentUser, require_role};
use crate::services::settings;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    let read_routes = Router::new()
        .route("/api/settings", get(list))
        .layer(middleware::from_fn(require_role(Role::STAFF)));

    let manage_routes = Router::new()
        .route("/api/settings", put(update))
        .layer(middleware::from_fn(require_role(Role::ADMIN)));

    read_routes.merge(manage_routes)
}

/// GET /api/settings - every known key, defaults filled in
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<SettingsMap> {
    let map = settings::effective(&state.pool, user.restaurant_id).await?;
    Ok(ok(map))
}

/// PUT /api/settings - validate and store all keys or none
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<SettingsMap>,
) -> ApiResult<SettingsMap> {
    let map = settings::update(&state.pool, user.restaurant_id, &payload).await?;
    tracing::info!(keys = payload.len(), by = user.user_id, "Settings updated");
    Ok(ok(map))
}
