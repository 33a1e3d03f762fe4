//! Order / kitchen / table coordination
//!
//! Every committed operation keeps `KitchenOrder.status == Order.status` and
//! `KitchenOrder.items == Order.items`. Status preconditions are part of the
//! first UPDATE of each transaction, so a concurrent writer that got there
//! first makes the statement match no row and the caller gets a 409.
//!
//! ```text
//! place ──► pending ──accept──► preparing ──ready──► ready ──complete──► completed
//!              │                    │
//!              └──────cancel────────┴──► cancelled
//! ```
//!
//! Events are published after commit; publishing never fails the operation.

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::event::RealtimeEvent;
use shared::models::setting::TAX_RATE_PERCENT;
use shared::models::{
    DiningTable, ItemStatus, KitchenOrder, Order, OrderDetail, OrderItem, OrderStatus,
    OrderTotals, OrderType, PaymentStatus, PlaceOrderRequest, Role, TableStatus,
};
use shared::money;
use sqlx::SqliteConnection;

use crate::auth::CurrentUser;
use crate::db::repository::order::OrderFilter;
use crate::db::repository::{
    RepoResult, dining_table, menu_item, order as order_repo, payment as payment_repo,
    user as user_repo,
};
use crate::error::ServiceResult;
use crate::services::{loyalty, settings};
use crate::state::AppState;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text, validate_quantity};

/// Maximum rows returned by [`list_orders`]
pub const MAX_LIST_LIMIT: i64 = 500;

/// Server-computed order totals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Subtotal = Σ price × qty; tax = subtotal × rate / 100; each rounded to 2 dp
pub fn compute_totals(items: &[OrderItem], tax_rate_percent: Decimal) -> Totals {
    let subtotal = money::round(
        items
            .iter()
            .map(|i| money::to_decimal(i.unit_price) * Decimal::from(i.quantity))
            .sum(),
    );
    let tax = money::round(subtotal * tax_rate_percent / Decimal::ONE_HUNDRED);
    Totals {
        subtotal,
        tax,
        total: subtotal + tax,
    }
}

fn check_client_totals(client: &OrderTotals, server: &Totals) -> Result<(), AppError> {
    let matches = money::approx_eq(money::to_decimal(client.subtotal), server.subtotal)
        && money::approx_eq(money::to_decimal(client.tax), server.tax)
        && money::approx_eq(money::to_decimal(client.total), server.total);
    if matches {
        return Ok(());
    }
    Err(AppError::new(ErrorCode::OrderTotalsMismatch)
        .with_detail("expected_subtotal", money::to_f64(server.subtotal))
        .with_detail("expected_tax", money::to_f64(server.tax))
        .with_detail("expected_total", money::to_f64(server.total)))
}

fn order_not_found(order_id: i64) -> AppError {
    AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id)
}

fn kitchen_order_not_found(order_id: i64) -> AppError {
    AppError::new(ErrorCode::KitchenOrderNotFound).with_detail("order_id", order_id)
}

/// Resolve requested lines against the menu; prices always come from the menu
async fn resolve_items(
    state: &AppState,
    restaurant_id: i64,
    req: &PlaceOrderRequest,
) -> ServiceResult<Vec<OrderItem>> {
    let mut items = Vec::with_capacity(req.items.len());
    for line in &req.items {
        validate_quantity(line.quantity)?;
        validate_optional_text(&line.note, "note", MAX_NOTE_LEN)?;

        let menu = menu_item::find_by_id(&state.pool, restaurant_id, line.menu_item_id)
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::MenuItemNotFound)
                    .with_detail("menu_item_id", line.menu_item_id)
            })?;
        if !menu.is_available {
            return Err(AppError::new(ErrorCode::MenuItemUnavailable)
                .with_detail("menu_item_id", menu.id)
                .with_detail("name", menu.name)
                .into());
        }

        items.push(OrderItem {
            menu_item_id: menu.id,
            name: menu.name,
            quantity: line.quantity,
            unit_price: menu.price,
            note: line.note.clone(),
            status: ItemStatus::Pending,
        });
    }
    Ok(items)
}

/// The customer the order is for: customers always order for themselves
async fn resolve_customer(
    state: &AppState,
    user: &CurrentUser,
    requested: Option<i64>,
) -> ServiceResult<Option<i64>> {
    if user.role == Role::Customer {
        return Ok(Some(user.user_id));
    }
    let Some(customer_id) = requested else {
        return Ok(None);
    };
    user_repo::find_by_id(&state.pool, user.restaurant_id, customer_id)
        .await?
        .filter(|u| u.role == Role::Customer)
        .ok_or_else(|| {
            AppError::new(ErrorCode::UserNotFound).with_detail("customer_id", customer_id)
        })?;
    Ok(Some(customer_id))
}

/// Place a dine-in, takeaway or delivery order
///
/// Dine-in orders claim their table in the same transaction that writes the
/// order and its kitchen mirror; a table that is not `available` aborts the
/// whole placement.
pub async fn place_order(
    state: &AppState,
    user: &CurrentUser,
    req: PlaceOrderRequest,
) -> ServiceResult<Order> {
    let rid = user.restaurant_id;
    if req.items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty).into());
    }
    validate_optional_text(&req.note, "note", MAX_NOTE_LEN)?;

    let customer_id = resolve_customer(state, user, req.customer_id).await?;
    let items = resolve_items(state, rid, &req).await?;
    let tax_rate = settings::decimal(&state.pool, rid, TAX_RATE_PERCENT).await?;
    let totals = compute_totals(&items, tax_rate);
    if let Some(client) = &req.totals {
        check_client_totals(client, &totals)?;
    }

    let table = match req.order_type {
        OrderType::DineIn => {
            let number = req.table_number.ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::RequiredField,
                    "table_number is required for dine-in orders",
                )
                .with_detail("field", "table_number")
            })?;
            let table = dining_table::find_by_number(&state.pool, rid, number)
                .await?
                .ok_or_else(|| {
                    AppError::new(ErrorCode::TableNotFound).with_detail("table_number", number)
                })?;
            Some(table)
        }
        OrderType::Takeaway | OrderType::Delivery => None,
    };

    let now = shared::util::now_millis();
    let order = Order {
        id: shared::util::snowflake_id(),
        restaurant_id: rid,
        order_type: req.order_type,
        table_id: table.as_ref().map(|t| t.id),
        table_number: table.as_ref().map(|t| t.number),
        customer_id,
        items,
        subtotal: money::to_f64(totals.subtotal),
        tax: money::to_f64(totals.tax),
        total: money::to_f64(totals.total),
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Unpaid,
        note: req.note,
        created_by: user.user_id,
        created_at: now,
        updated_at: now,
    };
    let kitchen = KitchenOrder {
        id: shared::util::snowflake_id(),
        order_id: order.id,
        restaurant_id: rid,
        items: order.items.clone(),
        status: OrderStatus::Pending,
        staff_id: None,
        started_at: None,
        ready_at: None,
        created_at: now,
        updated_at: now,
    };

    let mut tx = state.pool.begin().await?;
    let claimed = match &table {
        Some(table) => {
            let claimed = dining_table::claim(&mut *tx, rid, table.id).await?.ok_or_else(|| {
                AppError::new(ErrorCode::TableNotAvailable)
                    .with_detail("table_number", table.number)
                    .with_detail("status", table.status.as_str())
            })?;
            Some(claimed)
        }
        None => None,
    };
    order_repo::insert_order(&mut *tx, &order).await?;
    order_repo::insert_kitchen_order(&mut *tx, &kitchen).await?;
    tx.commit().await?;

    tracing::info!(
        order_id = order.id,
        restaurant_id = rid,
        order_type = ?order.order_type,
        table_number = ?order.table_number,
        total = order.total,
        "Order placed"
    );

    state.hub.publish(rid, RealtimeEvent::OrderPlaced {
        order: Box::new(order.clone()),
    });
    if let Some(table) = &claimed {
        state.hub.publish(rid, RealtimeEvent::table_update(table));
    }
    Ok(order)
}

/// Order plus kitchen mirror; a missing mirror is reported as not found
async fn load_detail(
    conn: &mut SqliteConnection,
    rid: i64,
    order_id: i64,
) -> ServiceResult<OrderDetail> {
    let order = order_repo::find_by_id(&mut *conn, rid, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    let kitchen_order = order_repo::find_kitchen_order(&mut *conn, rid, order_id)
        .await?
        .ok_or_else(|| kitchen_order_not_found(order_id))?;
    Ok(OrderDetail { order, kitchen_order })
}

/// Explain why a conditional kitchen transition matched no row
async fn transition_error(
    state: &AppState,
    rid: i64,
    order_id: i64,
    to: OrderStatus,
) -> ServiceResult<AppError> {
    let mut conn = state.pool.acquire().await?;
    let current = load_detail(&mut conn, rid, order_id).await?;
    let status = current.kitchen_order.status;
    let err = match (status, to) {
        (OrderStatus::Completed, _) => AppError::new(ErrorCode::OrderAlreadyCompleted),
        (OrderStatus::Cancelled, _) => AppError::new(ErrorCode::OrderAlreadyCancelled),
        (_, OrderStatus::Preparing) => AppError::new(ErrorCode::KitchenOrderNotPending),
        _ => AppError::new(ErrorCode::InvalidStatusTransition),
    };
    Ok(err
        .with_detail("order_id", order_id)
        .with_detail("from", status.as_str())
        .with_detail("to", to.as_str()))
}

/// Make the table available again when no other open order is on it
async fn release_table(
    conn: &mut SqliteConnection,
    rid: i64,
    table_id: Option<i64>,
) -> RepoResult<Option<DiningTable>> {
    let Some(table_id) = table_id else {
        return Ok(None);
    };
    if dining_table::count_open_orders(&mut *conn, table_id).await? > 0 {
        return Ok(None);
    }
    dining_table::set_status(&mut *conn, rid, table_id, TableStatus::Available).await
}

/// `pending → preparing` for the kitchen order and its parent
pub async fn accept_kitchen_order(
    state: &AppState,
    user: &CurrentUser,
    order_id: i64,
) -> ServiceResult<OrderDetail> {
    let rid = user.restaurant_id;
    let now = shared::util::now_millis();

    let mut tx = state.pool.begin().await?;
    let Some(kitchen_order) =
        order_repo::accept_kitchen_order(&mut *tx, rid, order_id, user.user_id, now).await?
    else {
        tx.rollback().await?;
        return Err(transition_error(state, rid, order_id, OrderStatus::Preparing).await?.into());
    };
    let order = order_repo::set_order_status(&mut *tx, rid, order_id, kitchen_order.status, now)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    tx.commit().await?;

    tracing::info!(order_id, staff_id = user.user_id, "Kitchen order accepted");
    state.hub.publish(rid, RealtimeEvent::OrderAccepted {
        order_id,
        kitchen_order_id: kitchen_order.id,
        staff_id: user.user_id,
        status: kitchen_order.status,
        started_at: kitchen_order.started_at.unwrap_or(now),
    });
    Ok(OrderDetail { order, kitchen_order })
}

/// Set the status of one item, rewriting the item list on both records
pub async fn update_item_status(
    state: &AppState,
    user: &CurrentUser,
    order_id: i64,
    item_index: usize,
    status: ItemStatus,
) -> ServiceResult<OrderDetail> {
    let rid = user.restaurant_id;
    let now = shared::util::now_millis();

    let mut tx = state.pool.begin().await?;
    let Some(order) =
        order_repo::set_item_status(&mut *tx, rid, order_id, item_index, status, now).await?
    else {
        tx.rollback().await?;
        let mut conn = state.pool.acquire().await?;
        let current = order_repo::find_by_id(&mut *conn, rid, order_id)
            .await?
            .ok_or_else(|| order_not_found(order_id))?;
        let err = if !current.status.is_open() {
            AppError::new(ErrorCode::OrderClosed).with_detail("status", current.status.as_str())
        } else {
            AppError::new(ErrorCode::OrderItemNotFound)
                .with_detail("item_index", item_index)
                .with_detail("item_count", current.items.len())
        };
        return Err(err.with_detail("order_id", order_id).into());
    };
    if !order_repo::set_kitchen_items(&mut *tx, rid, order_id, &order.items, now).await? {
        return Err(kitchen_order_not_found(order_id).into());
    }
    let detail = load_detail(&mut tx, rid, order_id).await?;
    tx.commit().await?;

    tracing::debug!(order_id, item_index, status = status.as_str(), "Order item status updated");
    state.hub.publish(rid, RealtimeEvent::ItemStatusUpdate {
        order_id,
        item_index,
        status,
        items: detail.order.items.clone(),
    });
    Ok(detail)
}

/// `preparing → ready`, stamping `ready_at`
pub async fn mark_ready(
    state: &AppState,
    user: &CurrentUser,
    order_id: i64,
) -> ServiceResult<OrderDetail> {
    let rid = user.restaurant_id;
    let now = shared::util::now_millis();

    let mut tx = state.pool.begin().await?;
    let Some(kitchen_order) = order_repo::transition_kitchen_order(
        &mut *tx,
        rid,
        order_id,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        now,
    )
    .await?
    else {
        tx.rollback().await?;
        return Err(transition_error(state, rid, order_id, OrderStatus::Ready).await?.into());
    };
    let order = order_repo::set_order_status(&mut *tx, rid, order_id, kitchen_order.status, now)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    tx.commit().await?;

    tracing::info!(order_id, "Order ready");
    state.hub.publish(rid, RealtimeEvent::order_status(&order));
    Ok(OrderDetail { order, kitchen_order })
}

/// `ready → completed`; requires full payment, frees the table and awards points
pub async fn complete_order(
    state: &AppState,
    user: &CurrentUser,
    order_id: i64,
) -> ServiceResult<OrderDetail> {
    let rid = user.restaurant_id;
    let current = order_repo::find_by_id(&state.pool, rid, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    if current.status == OrderStatus::Ready && current.payment_status != PaymentStatus::Paid {
        return Err(AppError::new(ErrorCode::OrderNotPaid)
            .with_detail("order_id", order_id)
            .with_detail("total", current.total)
            .into());
    }

    let now = shared::util::now_millis();
    let mut tx = state.pool.begin().await?;
    let Some(kitchen_order) = order_repo::transition_kitchen_order(
        &mut *tx,
        rid,
        order_id,
        OrderStatus::Ready,
        OrderStatus::Completed,
        now,
    )
    .await?
    else {
        tx.rollback().await?;
        return Err(transition_error(state, rid, order_id, OrderStatus::Completed).await?.into());
    };
    let order = order_repo::set_order_status(&mut *tx, rid, order_id, kitchen_order.status, now)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    let released = release_table(&mut tx, rid, order.table_id).await?;
    loyalty::award_for_order(&mut tx, &order).await?;
    tx.commit().await?;

    tracing::info!(order_id, table_released = released.is_some(), "Order completed");
    state.hub.publish(rid, RealtimeEvent::order_status(&order));
    if let Some(table) = &released {
        state.hub.publish(rid, RealtimeEvent::table_update(table));
    }
    Ok(OrderDetail { order, kitchen_order })
}

/// Cancel a `pending` or `preparing` order that has no recorded payment
pub async fn cancel_order(
    state: &AppState,
    user: &CurrentUser,
    order_id: i64,
) -> ServiceResult<OrderDetail> {
    let rid = user.restaurant_id;
    let current = order_repo::find_by_id(&state.pool, rid, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    if !current.status.can_transition_to(OrderStatus::Cancelled) {
        return Err(transition_error(state, rid, order_id, OrderStatus::Cancelled).await?.into());
    }

    let now = shared::util::now_millis();
    let mut tx = state.pool.begin().await?;
    let Some(kitchen_order) = order_repo::transition_kitchen_order(
        &mut *tx,
        rid,
        order_id,
        current.status,
        OrderStatus::Cancelled,
        now,
    )
    .await?
    else {
        tx.rollback().await?;
        return Err(transition_error(state, rid, order_id, OrderStatus::Cancelled).await?.into());
    };
    if payment_repo::count_by_order(&mut *tx, order_id).await? > 0 {
        tx.rollback().await?;
        let err = AppError::new(ErrorCode::OrderHasPayments).with_detail("order_id", order_id);
        return Err(err.into());
    }
    let order = order_repo::set_order_status(&mut *tx, rid, order_id, kitchen_order.status, now)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    let released = release_table(&mut tx, rid, order.table_id).await?;
    tx.commit().await?;

    tracing::info!(order_id, cancelled_by = user.user_id, "Order cancelled");
    state.hub.publish(rid, RealtimeEvent::order_status(&order));
    if let Some(table) = &released {
        state.hub.publish(rid, RealtimeEvent::table_update(table));
    }
    Ok(OrderDetail { order, kitchen_order })
}

/// Orders visible to the caller; customers only see their own
pub async fn list_orders(
    state: &AppState,
    user: &CurrentUser,
    mut filter: OrderFilter,
    limit: Option<i64>,
) -> ServiceResult<Vec<Order>> {
    if user.role == Role::Customer {
        filter.customer_id = Some(user.user_id);
    }
    let limit = limit.unwrap_or(100).clamp(1, MAX_LIST_LIMIT);
    Ok(order_repo::list(&state.pool, user.restaurant_id, filter, limit).await?)
}

pub async fn get_order(
    state: &AppState,
    user: &CurrentUser,
    order_id: i64,
) -> ServiceResult<OrderDetail> {
    let mut conn = state.pool.acquire().await?;
    let detail = load_detail(&mut conn, user.restaurant_id, order_id).await?;
    if user.role == Role::Customer && detail.order.customer_id != Some(user.user_id) {
        return Err(order_not_found(order_id).into());
    }
    Ok(detail)
}

/// Open kitchen orders, oldest first
pub async fn kitchen_queue(
    state: &AppState,
    restaurant_id: i64,
) -> ServiceResult<Vec<KitchenOrder>> {
    Ok(order_repo::kitchen_queue(&state.pool, restaurant_id).await?)
}
