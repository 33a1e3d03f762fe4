//! Staff management and login log API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use shared::models::Role;

use crate::auth::require_role;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    let read_routes = Router::new()
        .route("/api/users", get(handler::list))
        .layer(middleware::from_fn(require_role(Role::MANAGEMENT)));

    let manage_routes = Router::new()
        .route("/api/users", post(handler::create))
        .route("/api/users/{id}", put(handler::update))
        .route("/api/login-logs", get(handler::login_logs))
        .layer(middleware::from_fn(require_role(Role::ADMIN)));

    read_routes.merge(manage_routes)
}
