//! Order and Kitchen Order Repository
//!
//! `orders.items` and `kitchen_order.items` hold the same JSON array. Callers
//! keep them in step by writing both inside one transaction.

use super::RepoResult;
use shared::models::{ItemStatus, KitchenOrder, Order, OrderItem, OrderStatus, PaymentStatus};
use sqlx::SqliteExecutor;
use sqlx::types::Json;

const ORDER_COLUMNS: &str = "id, restaurant_id, order_type, table_id, table_number, customer_id, \
    items, subtotal, tax, total, status, payment_status, note, created_by, created_at, updated_at";
const KITCHEN_COLUMNS: &str = "id, order_id, restaurant_id, items, status, staff_id, started_at, \
    ready_at, created_at, updated_at";

/// Filters for [`list`]
#[derive(Debug, Default, Clone, Copy)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub table_id: Option<i64>,
    pub customer_id: Option<i64>,
}

pub async fn insert_order(exec: impl SqliteExecutor<'_>, order: &Order) -> RepoResult<()> {
    sqlx::query(&format!(
        "INSERT INTO orders ({ORDER_COLUMNS}) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(order.id)
    .bind(order.restaurant_id)
    .bind(order.order_type)
    .bind(order.table_id)
    .bind(order.table_number)
    .bind(order.customer_id)
    .bind(Json(&order.items))
    .bind(order.subtotal)
    .bind(order.tax)
    .bind(order.total)
    .bind(order.status)
    .bind(order.payment_status)
    .bind(order.note.as_deref())
    .bind(order.created_by)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn insert_kitchen_order(
    exec: impl SqliteExecutor<'_>,
    kitchen: &KitchenOrder,
) -> RepoResult<()> {
    sqlx::query(&format!(
        "INSERT INTO kitchen_order ({KITCHEN_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(kitchen.id)
    .bind(kitchen.order_id)
    .bind(kitchen.restaurant_id)
    .bind(Json(&kitchen.items))
    .bind(kitchen.status)
    .bind(kitchen.staff_id)
    .bind(kitchen.started_at)
    .bind(kitchen.ready_at)
    .bind(kitchen.created_at)
    .bind(kitchen.updated_at)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn find_by_id(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    id: i64,
) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE restaurant_id = ? AND id = ?"
    ))
    .bind(restaurant_id)
    .bind(id)
    .fetch_optional(exec)
    .await?;
    Ok(order)
}

/// Newest first
pub async fn list(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    filter: OrderFilter,
    limit: i64,
) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE restaurant_id = ?1 \
         AND (?2 IS NULL OR status = ?2) AND (?3 IS NULL OR table_id = ?3) \
         AND (?4 IS NULL OR customer_id = ?4) \
         ORDER BY created_at DESC, id DESC LIMIT ?5"
    ))
    .bind(restaurant_id)
    .bind(filter.status)
    .bind(filter.table_id)
    .bind(filter.customer_id)
    .bind(limit)
    .fetch_all(exec)
    .await?;
    Ok(orders)
}

pub async fn find_kitchen_order(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    order_id: i64,
) -> RepoResult<Option<KitchenOrder>> {
    let kitchen = sqlx::query_as::<_, KitchenOrder>(&format!(
        "SELECT {KITCHEN_COLUMNS} FROM kitchen_order WHERE restaurant_id = ? AND order_id = ?"
    ))
    .bind(restaurant_id)
    .bind(order_id)
    .fetch_optional(exec)
    .await?;
    Ok(kitchen)
}

/// Open kitchen orders, oldest first
pub async fn kitchen_queue(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
) -> RepoResult<Vec<KitchenOrder>> {
    let queue = sqlx::query_as::<_, KitchenOrder>(&format!(
        "SELECT {KITCHEN_COLUMNS} FROM kitchen_order WHERE restaurant_id = ? \
         AND status IN ('pending', 'preparing', 'ready') ORDER BY created_at, id"
    ))
    .bind(restaurant_id)
    .fetch_all(exec)
    .await?;
    Ok(queue)
}

/// `pending → preparing`, stamping the accepting staff member
///
/// Returns `None` when the kitchen order was not pending at write time.
pub async fn accept_kitchen_order(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    order_id: i64,
    staff_id: i64,
    now: i64,
) -> RepoResult<Option<KitchenOrder>> {
    let kitchen = sqlx::query_as::<_, KitchenOrder>(&format!(
        "UPDATE kitchen_order \
         SET status = 'preparing', staff_id = ?1, started_at = ?2, updated_at = ?2 \
         WHERE restaurant_id = ?3 AND order_id = ?4 AND status = 'pending' \
         RETURNING {KITCHEN_COLUMNS}"
    ))
    .bind(staff_id)
    .bind(now)
    .bind(restaurant_id)
    .bind(order_id)
    .fetch_optional(exec)
    .await?;
    Ok(kitchen)
}

/// Conditional status change `from → to`; stamps `ready_at` on `ready`
///
/// Returns `None` when the current status is no longer `from`.
pub async fn transition_kitchen_order(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    order_id: i64,
    from: OrderStatus,
    to: OrderStatus,
    now: i64,
) -> RepoResult<Option<KitchenOrder>> {
    let kitchen = sqlx::query_as::<_, KitchenOrder>(&format!(
        "UPDATE kitchen_order SET status = ?1, updated_at = ?2, \
         ready_at = CASE WHEN ?1 = 'ready' THEN ?2 ELSE ready_at END \
         WHERE restaurant_id = ?3 AND order_id = ?4 AND status = ?5 RETURNING {KITCHEN_COLUMNS}"
    ))
    .bind(to)
    .bind(now)
    .bind(restaurant_id)
    .bind(order_id)
    .bind(from)
    .fetch_optional(exec)
    .await?;
    Ok(kitchen)
}

/// Mirror a status onto the parent order
pub async fn set_order_status(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    order_id: i64,
    status: OrderStatus,
    now: i64,
) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "UPDATE orders SET status = ?, updated_at = ? WHERE restaurant_id = ? AND id = ? \
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(status)
    .bind(now)
    .bind(restaurant_id)
    .bind(order_id)
    .fetch_optional(exec)
    .await?;
    Ok(order)
}

/// Set `items[index].status` on an open order in a single statement
///
/// Returns `None` when the order is missing, closed, or has no such index.
pub async fn set_item_status(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    order_id: i64,
    index: usize,
    status: ItemStatus,
    now: i64,
) -> RepoResult<Option<Order>> {
    let index = i64::try_from(index).unwrap_or(i64::MAX);
    let order = sqlx::query_as::<_, Order>(&format!(
        "UPDATE orders SET items = json_set(items, '$[' || ?1 || '].status', ?2), updated_at = ?3 \
         WHERE restaurant_id = ?4 AND id = ?5 AND status IN ('pending', 'preparing', 'ready') \
         AND ?1 < json_array_length(items) RETURNING {ORDER_COLUMNS}"
    ))
    .bind(index)
    .bind(status.as_str())
    .bind(now)
    .bind(restaurant_id)
    .bind(order_id)
    .fetch_optional(exec)
    .await?;
    Ok(order)
}

pub async fn set_kitchen_items(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    order_id: i64,
    items: &[OrderItem],
    now: i64,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE kitchen_order SET items = ?, updated_at = ? \
         WHERE restaurant_id = ? AND order_id = ?",
    )
    .bind(Json(items))
    .bind(now)
    .bind(restaurant_id)
    .bind(order_id)
    .execute(exec)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn set_payment_status(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    order_id: i64,
    status: PaymentStatus,
    now: i64,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE orders SET payment_status = ?, updated_at = ? WHERE restaurant_id = ? AND id = ?",
    )
    .bind(status)
    .bind(now)
    .bind(restaurant_id)
    .bind(order_id)
    .execute(exec)
    .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;
    use shared::models::{ItemStatus, OrderType};

    fn sample(restaurant_id: i64, id: i64) -> (Order, KitchenOrder) {
        let items = vec![OrderItem {
            menu_item_id: 1,
            name: "Soup".into(),
            quantity: 2,
            unit_price: 4.5,
            note: None,
            status: ItemStatus::Pending,
        }];
        let order = Order {
            id,
            restaurant_id,
            order_type: OrderType::Takeaway,
            table_id: None,
            table_number: None,
            customer_id: None,
            items: items.clone(),
            subtotal: 9.0,
            tax: 0.0,
            total: 9.0,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            note: None,
            created_by: 7,
            created_at: id,
            updated_at: id,
        };
        let kitchen = KitchenOrder {
            id: id + 1000,
            order_id: id,
            restaurant_id,
            items,
            status: OrderStatus::Pending,
            staff_id: None,
            started_at: None,
            ready_at: None,
            created_at: id,
            updated_at: id,
        };
        (order, kitchen)
    }

    async fn seed(pool: &sqlx::SqlitePool, rid: i64, id: i64) {
        let (order, kitchen) = sample(rid, id);
        insert_order(pool, &order).await.unwrap();
        insert_kitchen_order(pool, &kitchen).await.unwrap();
    }

    #[tokio::test]
    async fn items_round_trip_through_json_column() {
        let (pool, rid) = testing::setup().await;
        seed(&pool, rid, 1).await;

        let order = find_by_id(&pool, rid, 1).await.unwrap().unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].name, "Soup");

        let kitchen = find_kitchen_order(&pool, rid, 1).await.unwrap().unwrap();
        assert_eq!(kitchen.items, order.items);
    }

    #[tokio::test]
    async fn accept_is_conditional_on_pending() {
        let (pool, rid) = testing::setup().await;
        seed(&pool, rid, 1).await;

        let accepted = accept_kitchen_order(&pool, rid, 1, 42, 100).await.unwrap().unwrap();
        assert_eq!(accepted.status, OrderStatus::Preparing);
        assert_eq!(accepted.staff_id, Some(42));
        assert_eq!(accepted.started_at, Some(100));

        let again = accept_kitchen_order(&pool, rid, 1, 43, 200).await.unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn transition_stamps_ready_at() {
        let (pool, rid) = testing::setup().await;
        seed(&pool, rid, 1).await;
        accept_kitchen_order(&pool, rid, 1, 42, 100).await.unwrap();

        let (pending, preparing) = (OrderStatus::Pending, OrderStatus::Preparing);
        let stale = transition_kitchen_order(&pool, rid, 1, pending, OrderStatus::Cancelled, 150)
            .await
            .unwrap();
        assert!(stale.is_none());

        let ready = transition_kitchen_order(&pool, rid, 1, preparing, OrderStatus::Ready, 300)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ready.status, OrderStatus::Ready);
        assert_eq!(ready.ready_at, Some(300));
    }

    #[tokio::test]
    async fn queue_is_oldest_first_and_open_only() {
        let (pool, rid) = testing::setup().await;
        seed(&pool, rid, 3).await;
        seed(&pool, rid, 1).await;
        seed(&pool, rid, 2).await;
        transition_kitchen_order(&pool, rid, 2, OrderStatus::Pending, OrderStatus::Cancelled, 10)
            .await
            .unwrap();

        let queue = kitchen_queue(&pool, rid).await.unwrap();
        let ids: Vec<i64> = queue.iter().map(|k| k.order_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let (pool, rid) = testing::setup().await;
        seed(&pool, rid, 1).await;
        seed(&pool, rid, 2).await;
        set_order_status(&pool, rid, 2, OrderStatus::Cancelled, 5).await.unwrap();

        let filter = OrderFilter {
            status: Some(OrderStatus::Pending),
            ..Default::default()
        };
        let pending = list(&pool, rid, filter, 50).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, 1);
        assert_eq!(list(&pool, rid, OrderFilter::default(), 50).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn item_status_touches_only_the_target_index() {
        let (pool, rid) = testing::setup().await;
        let (mut order, mut kitchen) = sample(rid, 1);
        let mut second = order.items[0].clone();
        second.name = "Bread".into();
        order.items.push(second);
        kitchen.items = order.items.clone();
        insert_order(&pool, &order).await.unwrap();
        insert_kitchen_order(&pool, &kitchen).await.unwrap();

        let updated = set_item_status(&pool, rid, 1, 1, ItemStatus::Fulfilled, 50)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.items[0].status, ItemStatus::Pending);
        assert_eq!(updated.items[1].status, ItemStatus::Fulfilled);
        assert_eq!(updated.items[1].name, "Bread");

        let past_end = set_item_status(&pool, rid, 1, 2, ItemStatus::Fulfilled, 60).await.unwrap();
        assert!(past_end.is_none());

        set_order_status(&pool, rid, 1, OrderStatus::Cancelled, 70).await.unwrap();
        let closed = set_item_status(&pool, rid, 1, 0, ItemStatus::Fulfilled, 80).await.unwrap();
        assert!(closed.is_none());
    }
}
