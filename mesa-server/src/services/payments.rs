//! Payment recording and settlement
//!
//! Card and online payments may not exceed the remaining balance. Cash may
//! be over-tendered: the applied amount is capped at the balance and the
//! receipt reports the change. An order flips to `paid` once the recorded
//! payments cover its total.

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Order, OrderStatus, Payment, PaymentCreate, PaymentMethod, PaymentReceipt, PaymentStatus, Role,
};
use shared::money;

use crate::auth::CurrentUser;
use crate::db::repository::{order as order_repo, payment as payment_repo};
use crate::error::ServiceResult;
use crate::state::AppState;

/// Slack when comparing an amount against the balance
const HALF_CENT: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

/// Card and online amounts must fit in the remaining balance; cash may exceed it
pub fn check_fits(
    method: PaymentMethod,
    tendered: Decimal,
    remaining: Decimal,
) -> Result<(), AppError> {
    let remaining = remaining.max(Decimal::ZERO);
    if method == PaymentMethod::Cash || tendered <= remaining + HALF_CENT {
        return Ok(());
    }
    Err(AppError::new(ErrorCode::PaymentExceedsBalance)
        .with_detail("amount", money::to_f64(tendered))
        .with_detail("remaining", money::to_f64(remaining)))
}

fn order_error(code: ErrorCode, order_id: i64) -> AppError {
    AppError::new(code).with_detail("order_id", order_id)
}

fn closed_error(order: &Order) -> Option<AppError> {
    if order.status == OrderStatus::Cancelled {
        return Some(order_error(ErrorCode::OrderAlreadyCancelled, order.id));
    }
    if order.payment_status == PaymentStatus::Paid {
        return Some(order_error(ErrorCode::OrderAlreadyPaid, order.id));
    }
    None
}

async fn find_order(state: &AppState, restaurant_id: i64, order_id: i64) -> ServiceResult<Order> {
    Ok(order_repo::find_by_id(&state.pool, restaurant_id, order_id)
        .await?
        .ok_or_else(|| order_error(ErrorCode::OrderNotFound, order_id))?)
}

async fn paid_so_far(state: &AppState, order_id: i64) -> ServiceResult<Decimal> {
    Ok(money::to_decimal(payment_repo::total_by_order(&state.pool, order_id).await?))
}

/// Why the guarded insert wrote nothing, judged from a fresh read
async fn rejection(
    state: &AppState,
    restaurant_id: i64,
    order_id: i64,
    method: PaymentMethod,
    tendered: Decimal,
) -> ServiceResult<AppError> {
    let current = find_order(state, restaurant_id, order_id).await?;
    if let Some(err) = closed_error(&current) {
        return Ok(err);
    }
    let remaining = money::to_decimal(current.total) - paid_so_far(state, order_id).await?;
    Ok(check_fits(method, tendered, remaining)
        .err()
        .unwrap_or_else(|| AppError::new(ErrorCode::PaymentFailed)))
}

/// Record a payment and settle the order when fully covered
///
/// The balance check is repeated by the insert itself, so two payments racing
/// on the same order cannot both take the last of the balance.
pub async fn record_payment(
    state: &AppState,
    user: &CurrentUser,
    order_id: i64,
    req: &PaymentCreate,
) -> ServiceResult<PaymentReceipt> {
    let rid = user.restaurant_id;
    if !money::is_valid_amount(req.amount) || req.amount <= 0.0 {
        return Err(AppError::new(ErrorCode::PaymentInvalidAmount)
            .with_detail("amount", req.amount)
            .into());
    }

    let order = find_order(state, rid, order_id).await?;
    if let Some(err) = closed_error(&order) {
        return Err(err.into());
    }
    let total = money::to_decimal(order.total);
    let tendered = money::round(money::to_decimal(req.amount));
    check_fits(req.method, tendered, total - paid_so_far(state, order_id).await?)?;

    let now = shared::util::now_millis();
    let mut tx = state.pool.begin().await?;
    let Some(payment) = payment_repo::create(
        &mut *tx,
        rid,
        order_id,
        req.method,
        money::to_f64(tendered),
        req.method == PaymentMethod::Cash,
        user.user_id,
    )
    .await?
    else {
        tx.rollback().await?;
        return Err(rejection(state, rid, order_id, req.method, tendered).await?.into());
    };

    let paid_total = money::to_decimal(payment_repo::total_by_order(&mut *tx, order_id).await?);
    let payment_status = if paid_total + money::MONEY_TOLERANCE > total {
        order_repo::set_payment_status(&mut *tx, rid, order_id, PaymentStatus::Paid, now).await?;
        PaymentStatus::Paid
    } else {
        PaymentStatus::Unpaid
    };
    tx.commit().await?;

    let change = money::round(tendered - money::to_decimal(payment.amount)).max(Decimal::ZERO);
    tracing::info!(
        order_id,
        payment_id = payment.id,
        method = ?payment.method,
        amount = payment.amount,
        paid = payment_status == PaymentStatus::Paid,
        "Payment recorded"
    );

    Ok(PaymentReceipt {
        payment,
        payment_status,
        paid_total: money::to_f64(paid_total),
        remaining: money::to_f64((total - paid_total).max(Decimal::ZERO)),
        change: money::to_f64(change),
    })
}

/// Payments of an order; customers may only see their own orders
pub async fn list_payments(
    state: &AppState,
    user: &CurrentUser,
    order_id: i64,
) -> ServiceResult<Vec<Payment>> {
    let order = find_order(state, user.restaurant_id, order_id).await?;
    if user.role == Role::Customer && order.customer_id != Some(user.user_id) {
        return Err(order_error(ErrorCode::OrderNotFound, order_id).into());
    }
    Ok(payment_repo::list_by_order(&state.pool, user.restaurant_id, order_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixture;
    use crate::services::ordering;
    use shared::models::{OrderItemInput, OrderType, PlaceOrderRequest};

    fn dec(v: f64) -> Decimal {
        money::to_decimal(v)
    }

    fn code(err: crate::error::ServiceError) -> ErrorCode {
        AppError::from(err).code
    }

    async fn order_of(fx: &fixture::Fixture) -> Order {
        let req = PlaceOrderRequest {
            order_type: OrderType::Takeaway,
            table_number: None,
            customer_id: None,
            items: vec![OrderItemInput {
                menu_item_id: fx.steak.id,
                quantity: 1,
                note: None,
            }],
            totals: None,
            note: None,
        };
        ordering::place_order(&fx.state, &fx.waiter, req).await.unwrap()
    }

    fn pay(method: PaymentMethod, amount: f64) -> PaymentCreate {
        PaymentCreate { method, amount }
    }

    #[test]
    fn only_cash_may_exceed_the_balance() {
        assert!(check_fits(PaymentMethod::Card, dec(10.0), dec(18.0)).is_ok());
        assert!(check_fits(PaymentMethod::Card, dec(18.0), dec(18.0)).is_ok());
        assert!(check_fits(PaymentMethod::Cash, dec(20.0), dec(18.0)).is_ok());
        let err = check_fits(PaymentMethod::Online, dec(18.01), dec(18.0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentExceedsBalance);
        let err = check_fits(PaymentMethod::Card, dec(1.0), dec(-3.0)).unwrap_err();
        assert_eq!(err.details.unwrap()["remaining"], 0.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_card_payments_cannot_exceed_the_total() {
        let fx = fixture::setup().await;
        let order_id = order_of(&fx).await.id;

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let state = fx.state.clone();
                let waiter = fx.waiter.clone();
                tokio::spawn(async move {
                    record_payment(&state, &waiter, order_id, &pay(PaymentMethod::Card, 12.0)).await
                })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(receipt) => {
                    accepted += 1;
                    assert_eq!(receipt.payment.amount, 12.0);
                }
                Err(err) => assert_eq!(code(err), ErrorCode::PaymentExceedsBalance),
            }
        }
        assert_eq!(accepted, 1);
        let recorded = payment_repo::total_by_order(&fx.state.pool, order_id).await.unwrap();
        assert_eq!(recorded, 12.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_cash_is_capped_at_what_is_still_owed() {
        let fx = fixture::setup().await;
        let order_id = order_of(&fx).await.id;

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let state = fx.state.clone();
                let waiter = fx.waiter.clone();
                tokio::spawn(async move {
                    record_payment(&state, &waiter, order_id, &pay(PaymentMethod::Cash, 12.0)).await
                })
            })
            .collect();

        let mut changes = Vec::new();
        for handle in handles {
            changes.push(handle.await.unwrap().unwrap().change);
        }
        changes.sort_by(f64::total_cmp);
        assert_eq!(changes, [0.0, 6.0]);

        let recorded = payment_repo::total_by_order(&fx.state.pool, order_id).await.unwrap();
        assert_eq!(recorded, 18.0);
        let current = order_repo::find_by_id(&fx.state.pool, fx.rid, order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn status_flips_exactly_when_covered() {
        let fx = fixture::setup().await;
        let order = order_of(&fx).await;

        let first = record_payment(&fx.state, &fx.waiter, order.id, &pay(PaymentMethod::Card, 10.0))
            .await
            .unwrap();
        assert_eq!(first.payment_status, PaymentStatus::Unpaid);
        assert_eq!(first.remaining, 8.0);

        let err = record_payment(&fx.state, &fx.waiter, order.id, &pay(PaymentMethod::Card, 9.0))
            .await
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::PaymentExceedsBalance);

        let cash = pay(PaymentMethod::Cash, 10.0);
        let second = record_payment(&fx.state, &fx.waiter, order.id, &cash).await.unwrap();
        assert_eq!(second.payment_status, PaymentStatus::Paid);
        assert_eq!(second.payment.amount, 8.0);
        assert_eq!(second.change, 2.0);
        assert_eq!(second.paid_total, 18.0);
        assert_eq!(second.remaining, 0.0);

        let err = record_payment(&fx.state, &fx.waiter, order.id, &pay(PaymentMethod::Cash, 1.0))
            .await
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::OrderAlreadyPaid);

        let listed = list_payments(&fx.state, &fx.waiter, order.id).await.unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn rejects_bad_amounts_and_cancelled_orders() {
        let fx = fixture::setup().await;
        let order = order_of(&fx).await;

        for amount in [0.0, -5.0, f64::NAN] {
            let cash = pay(PaymentMethod::Cash, amount);
            let err = record_payment(&fx.state, &fx.waiter, order.id, &cash).await.unwrap_err();
            assert_eq!(code(err), ErrorCode::PaymentInvalidAmount);
        }

        ordering::cancel_order(&fx.state, &fx.waiter, order.id).await.unwrap();
        let err = record_payment(&fx.state, &fx.waiter, order.id, &pay(PaymentMethod::Cash, 5.0))
            .await
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::OrderAlreadyCancelled);
    }
}
