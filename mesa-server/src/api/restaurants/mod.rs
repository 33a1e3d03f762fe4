//! Restaurant onboarding
//!
//! POST /api/restaurants creates a restaurant and its first admin. Public and
//! rate limited.

use axum::{Json, Router, extract::State, middleware, routing::post};
use shared::models::{OnboardResponse, RestaurantCreate};

use crate::api::{ApiResult, ok};
use crate::auth::rate_limit::register_rate_limit;
use crate::services::auth as auth_service;
use crate::state::AppState;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/restaurants", post(onboard))
        .layer(middleware::from_fn_with_state(state.clone(), register_rate_limit))
}

/// POST /api/restaurants - onboard a restaurant
pub async fn onboard(
    State(state): State<AppState>,
    Json(req): Json<RestaurantCreate>,
) -> ApiResult<OnboardResponse> {
    let created = auth_service::onboard(&state, req).await?;
    Ok(ok(created))
}
