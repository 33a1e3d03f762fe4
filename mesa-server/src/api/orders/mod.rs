//! Order API
//!
//! Any logged-in user may place and read orders (customers only see their
//! own); closing orders and taking payments is front-of-house work.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use shared::models::Role;

use crate::auth::require_role;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<AppState> {
    let open_routes = Router::new()
        .route("/", get(handler::list).post(handler::place))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/payments", get(handler::list_payments));

    let floor_routes = Router::new()
        .route("/{id}/complete", post(handler::complete))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/payments", post(handler::record_payment))
        .layer(middleware::from_fn(require_role(Role::FRONT_OF_HOUSE)));

    open_routes.merge(floor_routes)
}
