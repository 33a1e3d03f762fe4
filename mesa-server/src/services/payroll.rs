//! Clock in / clock out and payroll reports

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{PayrollLine, PayrollReport, TimeEntry, User};
use shared::money;
use sqlx::SqlitePool;
use std::collections::BTreeMap;

use crate::auth::CurrentUser;
use crate::db::repository::{RepoError, time_entry, user as user_repo};
use crate::error::ServiceResult;

const MILLIS_PER_HOUR: i64 = 3_600_000;

pub async fn clock_in(pool: &SqlitePool, user: &CurrentUser) -> ServiceResult<TimeEntry> {
    let now = shared::util::now_millis();
    match time_entry::clock_in(pool, user.restaurant_id, user.user_id, now).await {
        Ok(entry) => {
            tracing::info!(user_id = user.user_id, "Clocked in");
            Ok(entry)
        }
        Err(RepoError::Duplicate(_)) => Err(AppError::new(ErrorCode::AlreadyClockedIn).into()),
        Err(e) => Err(e.into()),
    }
}

pub async fn clock_out(pool: &SqlitePool, user: &CurrentUser) -> ServiceResult<TimeEntry> {
    let now = shared::util::now_millis();
    let entry = time_entry::clock_out(pool, user.restaurant_id, user.user_id, now)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::NotClockedIn))?;
    let minutes = (now - entry.clock_in) / 60_000;
    tracing::info!(user_id = user.user_id, minutes, "Clocked out");
    Ok(entry)
}

/// Portion of a closed entry inside `[from, to)`, in milliseconds
pub fn clipped_millis(entry: &TimeEntry, from: i64, to: i64) -> i64 {
    let Some(clock_out) = entry.clock_out else {
        return 0;
    };
    (clock_out.min(to) - entry.clock_in.max(from)).max(0)
}

/// Aggregate entries per user; hours and gross pay are rounded to 2 dp
pub fn build_report(users: &[User], entries: &[TimeEntry], from: i64, to: i64) -> PayrollReport {
    let mut worked: BTreeMap<i64, i64> = BTreeMap::new();
    for entry in entries {
        *worked.entry(entry.user_id).or_default() += clipped_millis(entry, from, to);
    }

    let mut lines: Vec<PayrollLine> = users
        .iter()
        .filter_map(|u| {
            let millis = *worked.get(&u.id)?;
            let hours = money::round(Decimal::from(millis) / Decimal::from(MILLIS_PER_HOUR));
            let gross = money::round(hours * money::to_decimal(u.hourly_rate));
            Some((u, hours, gross))
        })
        .map(|(u, hours, gross)| PayrollLine {
            user_id: u.id,
            name: u.name.clone(),
            hourly_rate: u.hourly_rate,
            hours: money::to_f64(hours),
            gross_pay: money::to_f64(gross),
        })
        .collect();
    lines.sort_by(|a, b| a.name.cmp(&b.name).then(a.user_id.cmp(&b.user_id)));

    let total: Decimal = lines.iter().map(|l| money::to_decimal(l.gross_pay)).sum();
    PayrollReport {
        from,
        to,
        lines,
        total_gross_pay: money::to_f64(total),
    }
}

/// Payroll for closed time entries overlapping `[from, to)`
pub async fn report(
    pool: &SqlitePool,
    restaurant_id: i64,
    from: i64,
    to: i64,
) -> ServiceResult<PayrollReport> {
    if from >= to {
        return Err(AppError::with_message(ErrorCode::ValueOutOfRange, "'from' must be before 'to'")
            .with_detail("from", from)
            .with_detail("to", to)
            .into());
    }
    let entries = time_entry::find_closed_overlapping(pool, restaurant_id, from, to).await?;
    let users = user_repo::list(pool, restaurant_id, None).await?;
    Ok(build_report(&users, &entries, from, to))
}
