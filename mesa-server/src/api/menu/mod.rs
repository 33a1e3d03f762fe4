//! Menu API
//!
//! Categories and items. Any logged-in user may read; admins and managers
//! edit.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use shared::models::Role;

use crate::auth::require_role;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/menu", routes())
}

fn routes() -> Router<AppState> {
    let read_routes = Router::new()
        .route("/categories", get(handler::list_categories))
        .route("/items", get(handler::list_items))
        .route("/items/{id}", get(handler::get_item));

    let manage_routes = Router::new()
        .route("/categories", post(handler::create_category))
        .route(
            "/categories/{id}",
            put(handler::update_category).delete(handler::delete_category),
        )
        .route("/items", post(handler::create_item))
        .route("/items/{id}", put(handler::update_item).delete(handler::delete_item))
        .route("/items/{id}/availability", put(handler::set_availability))
        .layer(middleware::from_fn(require_role(Role::MANAGEMENT)));

    read_routes.merge(manage_routes)
}
