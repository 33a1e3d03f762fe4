//! Payment Repository

use super::RepoResult;
use shared::models::{Payment, PaymentMethod};
use sqlx::SqliteExecutor;

const COLUMNS: &str = "id, restaurant_id, order_id, method, amount, received_by, created_at";

/// Record a payment against an order that is still unpaid and not cancelled
///
/// The balance is read by the INSERT itself. With `cap_to_balance` the stored
/// amount is cut down to what is still owed (cash); without it the row is
/// only written when `amount` fits in the remaining balance (card, online).
/// Both comparisons allow half a cent of float noise.
///
/// Returns `None` when the order is missing, cancelled, already paid or the
/// amount does not fit at write time.
pub async fn create(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    order_id: i64,
    method: PaymentMethod,
    amount: f64,
    cap_to_balance: bool,
    received_by: i64,
) -> RepoResult<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>(&format!(
        "INSERT INTO payment ({COLUMNS}) \
         SELECT ?1, ?2, ?3, ?4, \
                CASE WHEN ?6 THEN MIN(?5, ROUND(o.total - paid.settled, 2)) ELSE ?5 END, \
                ?7, ?8 \
         FROM orders o, \
              (SELECT COALESCE(SUM(amount), 0.0) AS settled FROM payment WHERE order_id = ?3) paid \
         WHERE o.restaurant_id = ?2 AND o.id = ?3 \
           AND o.payment_status = 'unpaid' AND o.status != 'cancelled' \
           AND ((?6 AND o.total - paid.settled > 0.005) \
             OR (NOT ?6 AND paid.settled + ?5 <= o.total + 0.005)) \
         RETURNING {COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(restaurant_id)
    .bind(order_id)
    .bind(method)
    .bind(amount)
    .bind(cap_to_balance)
    .bind(received_by)
    .bind(shared::util::now_millis())
    .fetch_optional(exec)
    .await?;
    Ok(payment)
}

/// Sum of recorded payment amounts (0 when there are none)
pub async fn total_by_order(exec: impl SqliteExecutor<'_>, order_id: i64) -> RepoResult<f64> {
    let total: f64 =
        sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0.0) FROM payment WHERE order_id = ?")
            .bind(order_id)
            .fetch_one(exec)
            .await?;
    Ok(total)
}

pub async fn list_by_order(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    order_id: i64,
) -> RepoResult<Vec<Payment>> {
    let payments = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {COLUMNS} FROM payment WHERE restaurant_id = ? AND order_id = ? \
         ORDER BY created_at, id"
    ))
    .bind(restaurant_id)
    .bind(order_id)
    .fetch_all(exec)
    .await?;
    Ok(payments)
}

pub async fn count_by_order(exec: impl SqliteExecutor<'_>, order_id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payment WHERE order_id = ?")
        .bind(order_id)
        .fetch_one(exec)
        .await?;
    Ok(count)
}
