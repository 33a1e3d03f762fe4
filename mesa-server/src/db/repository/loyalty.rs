//! Loyalty Ledger Repository

use super::RepoResult;
use shared::models::LoyaltyTransaction;
use sqlx::SqliteExecutor;

const COLUMNS: &str = "id, restaurant_id, customer_id, order_id, points, reason, created_at";

pub async fn create(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    customer_id: i64,
    order_id: Option<i64>,
    points: i64,
    reason: &str,
) -> RepoResult<LoyaltyTransaction> {
    let tx = sqlx::query_as::<_, LoyaltyTransaction>(&format!(
        "INSERT INTO loyalty_transaction ({COLUMNS}) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(restaurant_id)
    .bind(customer_id)
    .bind(order_id)
    .bind(points)
    .bind(reason)
    .bind(shared::util::now_millis())
    .fetch_one(exec)
    .await?;
    Ok(tx)
}

/// Debit `points` only if the balance covers them
///
/// Returns `None` when the balance is too low at write time.
pub async fn redeem(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    customer_id: i64,
    points: i64,
    reason: &str,
) -> RepoResult<Option<LoyaltyTransaction>> {
    let tx = sqlx::query_as::<_, LoyaltyTransaction>(&format!(
        "INSERT INTO loyalty_transaction ({COLUMNS}) \
         SELECT ?1, ?2, ?3, NULL, -?4, ?5, ?6 \
         WHERE (SELECT COALESCE(SUM(points), 0) FROM loyalty_transaction \
                WHERE restaurant_id = ?2 AND customer_id = ?3) >= ?4 \
         RETURNING {COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(restaurant_id)
    .bind(customer_id)
    .bind(points)
    .bind(reason)
    .bind(shared::util::now_millis())
    .fetch_optional(exec)
    .await?;
    Ok(tx)
}

/// Sum of all ledger entries (0 when there are none)
pub async fn balance(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    customer_id: i64,
) -> RepoResult<i64> {
    let balance: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(points), 0) FROM loyalty_transaction \
         WHERE restaurant_id = ? AND customer_id = ?",
    )
    .bind(restaurant_id)
    .bind(customer_id)
    .fetch_one(exec)
    .await?;
    Ok(balance)
}

/// Newest first
pub async fn history(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    customer_id: i64,
) -> RepoResult<Vec<LoyaltyTransaction>> {
    let entries = sqlx::query_as::<_, LoyaltyTransaction>(&format!(
        "SELECT {COLUMNS} FROM loyalty_transaction WHERE restaurant_id = ? AND customer_id = ? \
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(restaurant_id)
    .bind(customer_id)
    .fetch_all(exec)
    .await?;
    Ok(entries)
}
