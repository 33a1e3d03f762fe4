//! Loyalty points ledger
//!
//! Balance is the sum of signed ledger entries. Points are earned when an
//! order with a customer completes and spent through [`redeem`].

use rust_decimal::prelude::*;
use shared::error::{AppError, ErrorCode};
use shared::models::setting::LOYALTY_POINTS_PER_UNIT;
use shared::models::{LoyaltyBalance, LoyaltyTransaction, Order, RedeemRequest, Role};
use shared::money;
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::repository::{RepoResult, loyalty as loyalty_repo, user as user_repo};
use crate::error::ServiceResult;
use crate::services::settings;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};

/// `floor(total × rate)`, never negative
pub fn points_for(total: f64, rate: Decimal) -> i64 {
    (money::to_decimal(total) * rate)
        .floor()
        .to_i64()
        .unwrap_or_default()
        .max(0)
}

/// Credit the order's customer; `None` when there is no customer or nothing to award
pub async fn award_for_order(
    conn: &mut SqliteConnection,
    order: &Order,
) -> RepoResult<Option<LoyaltyTransaction>> {
    let Some(customer_id) = order.customer_id else {
        return Ok(None);
    };
    let rate = settings::decimal(&mut *conn, order.restaurant_id, LOYALTY_POINTS_PER_UNIT).await?;
    let points = points_for(order.total, rate);
    if points == 0 {
        return Ok(None);
    }

    let entry = loyalty_repo::create(
        &mut *conn,
        order.restaurant_id,
        customer_id,
        Some(order.id),
        points,
        &format!("Order {}", order.id),
    )
    .await?;
    tracing::info!(order_id = order.id, customer_id, points, "Loyalty points awarded");
    Ok(Some(entry))
}

pub async fn balance(
    pool: &SqlitePool,
    restaurant_id: i64,
    customer_id: i64,
) -> ServiceResult<LoyaltyBalance> {
    let balance = loyalty_repo::balance(pool, restaurant_id, customer_id).await?;
    let history = loyalty_repo::history(pool, restaurant_id, customer_id).await?;
    Ok(LoyaltyBalance {
        customer_id,
        balance,
        history,
    })
}

/// Debit points from a customer's balance
pub async fn redeem(
    pool: &SqlitePool,
    restaurant_id: i64,
    req: &RedeemRequest,
) -> ServiceResult<LoyaltyBalance> {
    if req.points <= 0 {
        let err = AppError::with_message(ErrorCode::ValueOutOfRange, "Points must be positive");
        return Err(err.into());
    }
    validate_optional_text(&req.reason, "reason", MAX_NOTE_LEN)?;

    let customer = user_repo::find_by_id(pool, restaurant_id, req.customer_id)
        .await?
        .filter(|u| u.role == Role::Customer)
        .ok_or_else(|| {
            AppError::new(ErrorCode::UserNotFound).with_detail("customer_id", req.customer_id)
        })?;

    let reason = req.reason.as_deref().unwrap_or("Redemption");
    if loyalty_repo::redeem(pool, restaurant_id, customer.id, req.points, reason)
        .await?
        .is_none()
    {
        let available = loyalty_repo::balance(pool, restaurant_id, customer.id).await?;
        return Err(AppError::new(ErrorCode::InsufficientPoints)
            .with_detail("requested", req.points)
            .with_detail("available", available)
            .into());
    }

    tracing::info!(
        restaurant_id,
        customer_id = customer.id,
        points = req.points,
        "Loyalty points redeemed"
    );
    balance(pool, restaurant_id, customer.id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;
    use crate::db::repository::user::NewUser;

    #[test]
    fn points_are_floored() {
        assert_eq!(points_for(12.99, Decimal::ONE), 12);
        assert_eq!(points_for(10.0, Decimal::new(15, 1)), 15);
        assert_eq!(points_for(0.99, Decimal::ONE), 0);
        assert_eq!(points_for(50.0, Decimal::ZERO), 0);
    }

    async fn customer(pool: &SqlitePool, rid: i64) -> i64 {
        user_repo::create(
            pool,
            NewUser {
                restaurant_id: rid,
                email: "guest@example.com",
                name: "Guest",
                password_hash: "x",
                role: Role::Customer,
                hourly_rate: 0.0,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn cannot_over_redeem() {
        let (pool, rid) = testing::setup().await;
        let cid = customer(&pool, rid).await;
        loyalty_repo::create(&pool, rid, cid, None, 30, "Welcome").await.unwrap();

        let req = RedeemRequest {
            customer_id: cid,
            points: 31,
            reason: None,
        };
        let err: AppError = redeem(&pool, rid, &req).await.unwrap_err().into();
        assert_eq!(err.code, ErrorCode::InsufficientPoints);

        let req = RedeemRequest { points: 30, ..req };
        let after = redeem(&pool, rid, &req).await.unwrap();
        assert_eq!(after.balance, 0);
        assert_eq!(after.history.len(), 2);
    }

    #[tokio::test]
    async fn redeem_rejects_non_positive_points() {
        let (pool, rid) = testing::setup().await;
        let cid = customer(&pool, rid).await;
        let req = RedeemRequest {
            customer_id: cid,
            points: 0,
            reason: None,
        };
        let err: AppError = redeem(&pool, rid, &req).await.unwrap_err().into();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
    }
}
