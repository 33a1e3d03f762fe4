//! Order API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    Order, OrderDetail, OrderStatus, Payment, PaymentCreate, PaymentReceipt, PlaceOrderRequest,
};

use crate::api::{ApiResult, ok};
use crate::auth::CurrentUser;
use crate::db::repository::order::OrderFilter;
use crate::services::{ordering, payments};
use crate::state::AppState;

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
    pub table_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /api/orders - newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Order>> {
    let filter = OrderFilter {
        status: query.status,
        table_id: query.table_id,
        customer_id: query.customer_id,
    };
    let orders = ordering::list_orders(&state, &user, filter, query.limit).await?;
    Ok(ok(orders))
}

/// POST /api/orders - place a dine-in, takeaway or delivery order
pub async fn place(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<PlaceOrderRequest>,
) -> ApiResult<Order> {
    let order = ordering::place_order(&state, &user, payload).await?;
    Ok(ok(order))
}

/// GET /api/orders/{id} - order with its kitchen order
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<OrderDetail> {
    let detail = ordering::get_order(&state, &user, id).await?;
    Ok(ok(detail))
}

/// POST /api/orders/{id}/complete - ready → completed
pub async fn complete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<OrderDetail> {
    let detail = ordering::complete_order(&state, &user, id).await?;
    Ok(ok(detail))
}

/// POST /api/orders/{id}/cancel - from pending or preparing
pub async fn cancel(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<OrderDetail> {
    let detail = ordering::cancel_order(&state, &user, id).await?;
    Ok(ok(detail))
}

/// POST /api/orders/{id}/payments - record a payment
pub async fn record_payment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<PaymentCreate>,
) -> ApiResult<PaymentReceipt> {
    let receipt = payments::record_payment(&state, &user, id, &payload).await?;
    Ok(ok(receipt))
}

/// GET /api/orders/{id}/payments
pub async fn list_payments(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<Payment>> {
    let list = payments::list_payments(&state, &user, id).await?;
    Ok(ok(list))
}
