//! Time clock and payroll API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use shared::models::Role;

use crate::auth::require_role;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/payroll", routes())
}

fn routes() -> Router<AppState> {
    let staff_routes = Router::new()
        .route("/clock-in", post(handler::clock_in))
        .route("/clock-out", post(handler::clock_out))
        .route("/entries/me", get(handler::my_entries))
        .layer(middleware::from_fn(require_role(Role::STAFF)));

    let manage_routes = Router::new()
        .route("/report", get(handler::report))
        .layer(middleware::from_fn(require_role(Role::MANAGEMENT)));

    staff_routes.merge(manage_routes)
}
