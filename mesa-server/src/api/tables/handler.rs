//! Dining Table API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::event::RealtimeEvent;
use shared::models::{
    DiningTable, DiningTableCreate, DiningTableUpdate, TableStatus, TableStatusUpdate,
};

use crate::api::{ApiResult, conflict_as, ok};
use crate::auth::CurrentUser;
use crate::db::repository::dining_table;
use crate::state::AppState;

const MAX_CAPACITY: i32 = 100;

fn table_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::TableNotFound).with_detail("table_id", id)
}

fn validate_capacity(capacity: i32) -> Result<(), AppError> {
    if !(1..=MAX_CAPACITY).contains(&capacity) {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("capacity must be between 1 and {MAX_CAPACITY}"),
        )
        .with_detail("field", "capacity"));
    }
    Ok(())
}

/// Tell apart a missing table from one held by an open order
async fn idle_write_error(state: &AppState, restaurant_id: i64, id: i64) -> AppError {
    match dining_table::find_by_id(&state.pool, restaurant_id, id).await {
        Ok(Some(_)) => AppError::new(ErrorCode::TableHasOpenOrder).with_detail("table_id", id),
        Ok(None) => table_not_found(id),
        Err(e) => e.into(),
    }
}

/// GET /api/tables - all tables by number
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Vec<DiningTable>> {
    let tables = dining_table::list(&state.pool, user.restaurant_id).await?;
    Ok(ok(tables))
}

/// GET /api/tables/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<DiningTable> {
    let table = dining_table::find_by_id(&state.pool, user.restaurant_id, id)
        .await?
        .ok_or_else(|| table_not_found(id))?;
    Ok(ok(table))
}

/// POST /api/tables - new table, initially available
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<DiningTableCreate>,
) -> ApiResult<DiningTable> {
    if payload.number <= 0 {
        return Err(AppError::with_message(ErrorCode::ValueOutOfRange, "number must be positive")
            .with_detail("field", "number"));
    }
    if let Some(capacity) = payload.capacity {
        validate_capacity(capacity)?;
    }

    let table = dining_table::create(&state.pool, user.restaurant_id, &payload)
        .await
        .map_err(conflict_as(ErrorCode::TableNumberExists))?;
    state.hub.publish(user.restaurant_id, RealtimeEvent::table_update(&table));
    Ok(ok(table))
}

/// PUT /api/tables/{id} - change capacity
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<DiningTableUpdate>,
) -> ApiResult<DiningTable> {
    let Some(capacity) = payload.capacity else {
        return get_by_id(State(state), Extension(user), Path(id)).await;
    };
    validate_capacity(capacity)?;
    let table = dining_table::update_capacity(&state.pool, user.restaurant_id, id, capacity)
        .await?
        .ok_or_else(|| table_not_found(id))?;
    Ok(ok(table))
}

/// PUT /api/tables/{id}/status
///
/// `available` and `reserved` are refused while an open order sits on the
/// table.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<TableStatusUpdate>,
) -> ApiResult<DiningTable> {
    let rid = user.restaurant_id;
    let updated = match payload.status {
        TableStatus::Available | TableStatus::Reserved => {
            dining_table::set_status_if_idle(&state.pool, rid, id, payload.status).await?
        }
        TableStatus::Occupied => {
            dining_table::set_status(&state.pool, rid, id, payload.status).await?
        }
    };
    let Some(table) = updated else {
        return Err(idle_write_error(&state, rid, id).await);
    };

    tracing::info!(
        table_id = id,
        status = ?table.status,
        user_id = user.user_id,
        "Table status changed"
    );
    state.hub.publish(rid, RealtimeEvent::table_update(&table));
    Ok(ok(table))
}

/// DELETE /api/tables/{id} - refused while an open order references it
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    if !dining_table::delete_if_idle(&state.pool, user.restaurant_id, id).await? {
        return Err(idle_write_error(&state, user.restaurant_id, id).await);
    }
    Ok(ok(true))
}
