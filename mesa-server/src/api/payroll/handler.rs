//! Time clock and payroll Handlers

use axum::{
    Extension,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::models::{PayrollReport, TimeEntry};

use crate::api::{ApiResult, ok};
use crate::auth::CurrentUser;
use crate::db::repository::time_entry;
use crate::services::payroll;
use crate::state::AppState;

/// `[from, to)` in epoch milliseconds
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub from: i64,
    pub to: i64,
}

#[derive(Debug, Deserialize)]
pub struct EntriesQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

/// POST /api/payroll/clock-in
pub async fn clock_in(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<TimeEntry> {
    let entry = payroll::clock_in(&state.pool, &user).await?;
    Ok(ok(entry))
}

/// POST /api/payroll/clock-out
pub async fn clock_out(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<TimeEntry> {
    let entry = payroll::clock_out(&state.pool, &user).await?;
    Ok(ok(entry))
}

/// GET /api/payroll/entries/me - the caller's latest time entries
pub async fn my_entries(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<EntriesQuery>,
) -> ApiResult<Vec<TimeEntry>> {
    let limit = query.limit.clamp(1, 500);
    let entries =
        time_entry::list_for_user(&state.pool, user.restaurant_id, user.user_id, limit).await?;
    Ok(ok(entries))
}

/// GET /api/payroll/report?from=&to=
pub async fn report(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<PayrollReport> {
    let report = payroll::report(&state.pool, user.restaurant_id, query.from, query.to).await?;
    Ok(ok(report))
}
