//! Dining Table Repository

use super::RepoResult;
use shared::models::{DiningTable, DiningTableCreate, TableStatus};
use sqlx::SqliteExecutor;

const COLUMNS: &str = "id, restaurant_id, number, capacity, status, updated_at";

pub async fn list(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
) -> RepoResult<Vec<DiningTable>> {
    let tables = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {COLUMNS} FROM dining_table WHERE restaurant_id = ? ORDER BY number"
    ))
    .bind(restaurant_id)
    .fetch_all(exec)
    .await?;
    Ok(tables)
}

pub async fn find_by_id(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    id: i64,
) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {COLUMNS} FROM dining_table WHERE restaurant_id = ? AND id = ?"
    ))
    .bind(restaurant_id)
    .bind(id)
    .fetch_optional(exec)
    .await?;
    Ok(table)
}

pub async fn find_by_number(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    number: i32,
) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {COLUMNS} FROM dining_table WHERE restaurant_id = ? AND number = ?"
    ))
    .bind(restaurant_id)
    .bind(number)
    .fetch_optional(exec)
    .await?;
    Ok(table)
}

pub async fn create(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    data: &DiningTableCreate,
) -> RepoResult<DiningTable> {
    let table = sqlx::query_as::<_, DiningTable>(&format!(
        "INSERT INTO dining_table (id, restaurant_id, number, capacity, status, updated_at) \
         VALUES (?, ?, ?, ?, 'available', ?) RETURNING {COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(restaurant_id)
    .bind(data.number)
    .bind(data.capacity.unwrap_or(4))
    .bind(shared::util::now_millis())
    .fetch_one(exec)
    .await?;
    Ok(table)
}

pub async fn update_capacity(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    id: i64,
    capacity: i32,
) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(&format!(
        "UPDATE dining_table SET capacity = ?, updated_at = ? \
         WHERE restaurant_id = ? AND id = ? RETURNING {COLUMNS}"
    ))
    .bind(capacity)
    .bind(shared::util::now_millis())
    .bind(restaurant_id)
    .bind(id)
    .fetch_optional(exec)
    .await?;
    Ok(table)
}

/// Unconditional status write
pub async fn set_status(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    id: i64,
    status: TableStatus,
) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(&format!(
        "UPDATE dining_table SET status = ?, updated_at = ? \
         WHERE restaurant_id = ? AND id = ? RETURNING {COLUMNS}"
    ))
    .bind(status)
    .bind(shared::util::now_millis())
    .bind(restaurant_id)
    .bind(id)
    .fetch_optional(exec)
    .await?;
    Ok(table)
}

/// Mark an `available` table `occupied`
///
/// Returns `None` when the table was not available at the time of the write.
pub async fn claim(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    id: i64,
) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(&format!(
        "UPDATE dining_table SET status = 'occupied', updated_at = ? \
         WHERE restaurant_id = ? AND id = ? AND status = 'available' RETURNING {COLUMNS}"
    ))
    .bind(shared::util::now_millis())
    .bind(restaurant_id)
    .bind(id)
    .fetch_optional(exec)
    .await?;
    Ok(table)
}

/// Number of open (pending/preparing/ready) orders on a table
pub async fn count_open_orders(exec: impl SqliteExecutor<'_>, table_id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM orders \
         WHERE table_id = ? AND status IN ('pending', 'preparing', 'ready')",
    )
    .bind(table_id)
    .fetch_one(exec)
    .await?;
    Ok(count)
}

const NO_OPEN_ORDER: &str = "NOT EXISTS (SELECT 1 FROM orders o WHERE o.table_id = dining_table.id \
     AND o.status IN ('pending', 'preparing', 'ready'))";

/// Status write that only matches while no open order references the table
pub async fn set_status_if_idle(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    id: i64,
    status: TableStatus,
) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(&format!(
        "UPDATE dining_table SET status = ?, updated_at = ? \
         WHERE restaurant_id = ? AND id = ? AND {NO_OPEN_ORDER} RETURNING {COLUMNS}"
    ))
    .bind(status)
    .bind(shared::util::now_millis())
    .bind(restaurant_id)
    .bind(id)
    .fetch_optional(exec)
    .await?;
    Ok(table)
}

/// Delete a table that no open order references
pub async fn delete_if_idle(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    id: i64,
) -> RepoResult<bool> {
    let result = sqlx::query(&format!(
        "DELETE FROM dining_table WHERE restaurant_id = ? AND id = ? AND {NO_OPEN_ORDER}"
    ))
    .bind(restaurant_id)
    .bind(id)
    .execute(exec)
    .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{RepoError, testing};

    fn table(number: i32) -> DiningTableCreate {
        DiningTableCreate {
            number,
            capacity: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_to_available() {
        let (pool, rid) = testing::setup().await;
        let t = create(&pool, rid, &table(4)).await.unwrap();
        assert_eq!(t.status, TableStatus::Available);
        assert_eq!(t.capacity, 4);

        let dup = create(&pool, rid, &table(4)).await;
        assert!(matches!(dup, Err(RepoError::Duplicate(_))));
    }

    #[tokio::test]
    async fn claim_only_succeeds_once() {
        let (pool, rid) = testing::setup().await;
        let t = create(&pool, rid, &table(1)).await.unwrap();

        let first = claim(&pool, rid, t.id).await.unwrap();
        assert_eq!(first.unwrap().status, TableStatus::Occupied);

        let second = claim(&pool, rid, t.id).await.unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn reserved_table_cannot_be_claimed() {
        let (pool, rid) = testing::setup().await;
        let t = create(&pool, rid, &table(2)).await.unwrap();
        set_status(&pool, rid, t.id, TableStatus::Reserved).await.unwrap();
        assert!(claim(&pool, rid, t.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn idle_writes_skip_tables_with_open_orders() {
        let (pool, rid) = testing::setup().await;
        let busy = create(&pool, rid, &table(7)).await.unwrap();
        let idle = create(&pool, rid, &table(8)).await.unwrap();
        sqlx::query(
            "INSERT INTO orders (id, restaurant_id, order_type, table_id, table_number, items, \
             subtotal, tax, total, status, payment_status, created_by, created_at, updated_at) \
             VALUES (1, ?, 'dine_in', ?, 7, '[]', 0, 0, 0, 'preparing', 'unpaid', 1, 0, 0)",
        )
        .bind(rid)
        .bind(busy.id)
        .execute(&pool)
        .await
        .unwrap();

        assert_eq!(count_open_orders(&pool, busy.id).await.unwrap(), 1);
        let freed = set_status_if_idle(&pool, rid, busy.id, TableStatus::Available).await;
        assert!(freed.unwrap().is_none());
        assert!(!delete_if_idle(&pool, rid, busy.id).await.unwrap());

        let reserved = set_status_if_idle(&pool, rid, idle.id, TableStatus::Reserved).await;
        assert_eq!(reserved.unwrap().unwrap().status, TableStatus::Reserved);
        assert!(delete_if_idle(&pool, rid, idle.id).await.unwrap());
        assert!(find_by_id(&pool, rid, idle.id).await.unwrap().is_none());
    }
}
