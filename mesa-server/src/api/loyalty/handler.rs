//! Loyalty API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::error::AppError;
use shared::models::{LoyaltyBalance, RedeemRequest, Role};

use crate::api::{ApiResult, ok};
use crate::auth::CurrentUser;
use crate::services::loyalty;
use crate::state::AppState;

/// GET /api/loyalty/me - the caller's balance and history
pub async fn my_balance(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<LoyaltyBalance> {
    let balance = loyalty::balance(&state.pool, user.restaurant_id, user.user_id).await?;
    Ok(ok(balance))
}

/// GET /api/loyalty/customers/{customer_id}
///
/// Customers may only read their own account.
pub async fn balance(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(customer_id): Path<i64>,
) -> ApiResult<LoyaltyBalance> {
    if user.role == Role::Customer && customer_id != user.user_id {
        return Err(AppError::permission_denied("Customers may only read their own points"));
    }
    let balance = loyalty::balance(&state.pool, user.restaurant_id, customer_id).await?;
    Ok(ok(balance))
}

/// POST /api/loyalty/redeem - spend a customer's points
pub async fn redeem(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<RedeemRequest>,
) -> ApiResult<LoyaltyBalance> {
    let balance = loyalty::redeem(&state.pool, user.restaurant_id, &payload).await?;
    tracing::info!(
        customer_id = payload.customer_id,
        points = payload.points,
        by = user.user_id,
        "Loyalty points redeemed"
    );
    Ok(ok(balance))
}
