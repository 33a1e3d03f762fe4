//! Kitchen API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::models::{ItemStatusUpdate, KitchenOrder, OrderDetail};

use crate::api::{ApiResult, ok};
use crate::auth::CurrentUser;
use crate::services::ordering;
use crate::state::AppState;

/// GET /api/kitchen/orders - open kitchen orders, oldest first
pub async fn queue(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Vec<KitchenOrder>> {
    let queue = ordering::kitchen_queue(&state, user.restaurant_id).await?;
    Ok(ok(queue))
}

/// POST /api/kitchen/orders/{order_id}/accept
pub async fn accept(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(order_id): Path<i64>,
) -> ApiResult<OrderDetail> {
    let detail = ordering::accept_kitchen_order(&state, &user, order_id).await?;
    Ok(ok(detail))
}

/// PUT /api/kitchen/orders/{order_id}/items/{index}
pub async fn update_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((order_id, index)): Path<(i64, usize)>,
    Json(payload): Json<ItemStatusUpdate>,
) -> ApiResult<OrderDetail> {
    let detail =
        ordering::update_item_status(&state, &user, order_id, index, payload.status).await?;
    Ok(ok(detail))
}

/// POST /api/kitchen/orders/{order_id}/ready
pub async fn ready(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(order_id): Path<i64>,
) -> ApiResult<OrderDetail> {
    let detail = ordering::mark_ready(&state, &user, order_id).await?;
    Ok(ok(detail))
}
