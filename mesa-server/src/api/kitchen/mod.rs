//! Kitchen API
//!
//! | Path | Method |
//! |------|--------|
//! | /api/kitchen/orders | GET |
//! | /api/kitchen/orders/{order_id}/accept | POST |
//! | /api/kitchen/orders/{order_id}/items/{index} | PUT |
//! | /api/kitchen/orders/{order_id}/ready | POST |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use shared::models::Role;

use crate::auth::require_role;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    let routes = Router::new()
        .route("/orders", get(handler::queue))
        .route("/orders/{order_id}/accept", post(handler::accept))
        .route("/orders/{order_id}/items/{index}", put(handler::update_item))
        .route("/orders/{order_id}/ready", post(handler::ready))
        .layer(middleware::from_fn(require_role(Role::KITCHEN)));

    Router::new().nest("/api/kitchen", routes)
}
