//! Support ticket Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Role, SupportTicket, SupportTicketCreate, SupportTicketUpdate, TicketStatus};

use crate::api::{ApiResult, ok};
use crate::auth::CurrentUser;
use crate::db::repository::{order as order_repo, support};
use crate::state::AppState;
use crate::utils::validation::{
    MAX_MESSAGE_LEN, MAX_NAME_LEN, validate_optional_text, validate_required_text,
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<TicketStatus>,
}

fn ticket_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::TicketNotFound).with_detail("ticket_id", id)
}

/// Customers are scoped to their own tickets
fn owner_filter(user: &CurrentUser) -> Option<i64> {
    (user.role == Role::Customer).then_some(user.user_id)
}

/// GET /api/support - staff see every ticket, customers their own
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<SupportTicket>> {
    let owner = owner_filter(&user);
    let tickets = support::list(&state.pool, user.restaurant_id, owner, query.status).await?;
    Ok(ok(tickets))
}

/// POST /api/support - open a ticket, optionally about an order
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<SupportTicketCreate>,
) -> ApiResult<SupportTicket> {
    validate_required_text(&payload.subject, "subject", MAX_NAME_LEN)?;
    validate_required_text(&payload.message, "message", MAX_MESSAGE_LEN)?;

    if let Some(order_id) = payload.order_id {
        let order = order_repo::find_by_id(&state.pool, user.restaurant_id, order_id).await?;
        let owner = owner_filter(&user);
        let visible = order.is_some_and(|o| owner.is_none_or(|id| o.customer_id == Some(id)));
        if !visible {
            return Err(AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id));
        }
    }

    let ticket = support::create(&state.pool, user.restaurant_id, user.user_id, &payload).await?;
    tracing::info!(ticket_id = ticket.id, user_id = user.user_id, "Support ticket opened");
    Ok(ok(ticket))
}

/// GET /api/support/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<SupportTicket> {
    let ticket = support::find_by_id(&state.pool, user.restaurant_id, id)
        .await?
        .filter(|t| owner_filter(&user).is_none_or(|owner| t.customer_id == owner))
        .ok_or_else(|| ticket_not_found(id))?;
    Ok(ok(ticket))
}

/// PUT /api/support/{id} - set status and/or response
///
/// Closed tickets stay closed.
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<SupportTicketUpdate>,
) -> ApiResult<SupportTicket> {
    validate_optional_text(&payload.response, "response", MAX_MESSAGE_LEN)?;
    let rid = user.restaurant_id;

    let response = payload.response.as_deref();
    let updated = support::update(&state.pool, rid, id, payload.status, response).await?;
    let Some(ticket) = updated else {
        let existing = support::find_by_id(&state.pool, rid, id).await?;
        return Err(match existing {
            Some(t) => AppError::new(ErrorCode::InvalidStatusTransition)
                .with_detail("from", serde_json::json!(t.status))
                .with_detail("to", serde_json::json!(payload.status)),
            None => ticket_not_found(id),
        });
    };

    tracing::info!(
        ticket_id = id,
        status = ?ticket.status,
        by = user.user_id,
        "Support ticket updated"
    );
    Ok(ok(ticket))
}
