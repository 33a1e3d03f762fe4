//! Dining Table API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use shared::models::Role;

use crate::auth::require_role;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<AppState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_role(Role::STAFF)));

    let floor_routes = Router::new()
        .route("/{id}/status", put(handler::update_status))
        .layer(middleware::from_fn(require_role(Role::FRONT_OF_HOUSE)));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .layer(middleware::from_fn(require_role(Role::MANAGEMENT)));

    read_routes.merge(floor_routes).merge(manage_routes)
}
