//! Support ticket API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};
use shared::models::Role;

use crate::auth::require_role;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/support", routes())
}

fn routes() -> Router<AppState> {
    let open_routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id));

    let manage_routes = Router::new()
        .route("/{id}", put(handler::update))
        .layer(middleware::from_fn(require_role(Role::MANAGEMENT)));

    open_routes.merge(manage_routes)
}
