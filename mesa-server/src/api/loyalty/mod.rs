//! Loyalty API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use shared::models::Role;

use crate::auth::require_role;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/loyalty", routes())
}

fn routes() -> Router<AppState> {
    let read_routes = Router::new()
        .route("/me", get(handler::my_balance))
        .route("/customers/{customer_id}", get(handler::balance));

    let redeem_routes = Router::new()
        .route("/redeem", post(handler::redeem))
        .layer(middleware::from_fn(require_role(Role::FRONT_OF_HOUSE)));

    read_routes.merge(redeem_routes)
}
