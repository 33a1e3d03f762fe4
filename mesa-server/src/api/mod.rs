//! HTTP API
//!
//! # Structure
//!
//! - [`health`] - liveness and database check
//! - [`ws`] - real-time WebSocket
//! - [`auth`] - login, one-time codes, registration, session
//! - [`restaurants`] - restaurant onboarding
//! - [`public`] - public menu
//! - [`users`] - staff management and login logs
//! - [`menu`] - categories and items
//! - [`tables`] - dining tables
//! - [`orders`] - order lifecycle and payments
//! - [`kitchen`] - kitchen queue and item progress
//! - [`loyalty`] - points balance and redemption
//! - [`support`] - support tickets
//! - [`payroll`] - time clock and payroll report
//! - [`settings`] - restaurant settings
//!
//! Every route outside the public set runs behind [`require_auth`]; role
//! guards are layered per resource.

pub mod auth;
pub mod health;
pub mod kitchen;
pub mod loyalty;
pub mod menu;
pub mod orders;
pub mod payroll;
pub mod public;
pub mod restaurants;
pub mod settings;
pub mod support;
pub mod tables;
pub mod users;
pub mod ws;

use axum::{Json, Router, middleware};
use serde::Serialize;
use shared::error::{ApiResponse, AppError, ErrorCode};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::db::repository::RepoError;
use crate::state::AppState;

/// Handler result wrapped in the `ApiResponse` envelope
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

/// Map a unique-constraint violation to a resource-specific conflict
///
/// ```ignore
/// category::create(&state.pool, rid, &payload)
///     .await
///     .map_err(conflict_as(ErrorCode::CategoryNameExists))?;
/// ```
pub fn conflict_as(code: ErrorCode) -> impl FnOnce(RepoError) -> AppError {
    move |err| match err {
        RepoError::Duplicate(_) => AppError::new(code),
        other => other.into(),
    }
}

/// Routes that need a logged-in user
fn protected_routes() -> Router<AppState> {
    Router::new()
        .merge(users::router())
        .merge(menu::router())
        .merge(tables::router())
        .merge(orders::router())
        .merge(kitchen::router())
        .merge(loyalty::router())
        .merge(support::router())
        .merge(payroll::router())
        .merge(settings::router())
}

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    let protected =
        protected_routes().layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(health::router())
        .merge(ws::router())
        .merge(auth::router(&state))
        .merge(restaurants::router(&state))
        .merge(public::router())
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
