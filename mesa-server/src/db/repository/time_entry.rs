//! Time Entry Repository (clock in / clock out)

use super::RepoResult;
use shared::models::TimeEntry;
use sqlx::SqliteExecutor;

const COLUMNS: &str = "id, restaurant_id, user_id, clock_in, clock_out";

/// Open a new entry; the partial unique index rejects a second open entry
/// for the same user with [`super::RepoError::Duplicate`]
pub async fn clock_in(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    user_id: i64,
    now: i64,
) -> RepoResult<TimeEntry> {
    let entry = sqlx::query_as::<_, TimeEntry>(&format!(
        "INSERT INTO time_entry (id, restaurant_id, user_id, clock_in) \
         VALUES (?, ?, ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(restaurant_id)
    .bind(user_id)
    .bind(now)
    .fetch_one(exec)
    .await?;
    Ok(entry)
}

/// Close the user's open entry; `None` when there is none
pub async fn clock_out(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    user_id: i64,
    now: i64,
) -> RepoResult<Option<TimeEntry>> {
    let entry = sqlx::query_as::<_, TimeEntry>(&format!(
        "UPDATE time_entry SET clock_out = ? \
         WHERE restaurant_id = ? AND user_id = ? AND clock_out IS NULL \
         RETURNING {COLUMNS}"
    ))
    .bind(now)
    .bind(restaurant_id)
    .bind(user_id)
    .fetch_optional(exec)
    .await?;
    Ok(entry)
}

pub async fn find_open(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    user_id: i64,
) -> RepoResult<Option<TimeEntry>> {
    let entry = sqlx::query_as::<_, TimeEntry>(&format!(
        "SELECT {COLUMNS} FROM time_entry \
         WHERE restaurant_id = ? AND user_id = ? AND clock_out IS NULL"
    ))
    .bind(restaurant_id)
    .bind(user_id)
    .fetch_optional(exec)
    .await?;
    Ok(entry)
}

/// Closed entries overlapping `[from, to)`
pub async fn find_closed_overlapping(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    from: i64,
    to: i64,
) -> RepoResult<Vec<TimeEntry>> {
    let entries = sqlx::query_as::<_, TimeEntry>(&format!(
        "SELECT {COLUMNS} FROM time_entry WHERE restaurant_id = ? AND clock_out IS NOT NULL \
         AND clock_in < ? AND clock_out > ? ORDER BY user_id, clock_in"
    ))
    .bind(restaurant_id)
    .bind(to)
    .bind(from)
    .fetch_all(exec)
    .await?;
    Ok(entries)
}

/// A user's own entries, newest first
pub async fn list_for_user(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    user_id: i64,
    limit: i64,
) -> RepoResult<Vec<TimeEntry>> {
    let entries = sqlx::query_as::<_, TimeEntry>(&format!(
        "SELECT {COLUMNS} FROM time_entry WHERE restaurant_id = ? AND user_id = ? \
         ORDER BY clock_in DESC LIMIT ?"
    ))
    .bind(restaurant_id)
    .bind(user_id)
    .bind(limit)
    .fetch_all(exec)
    .await?;
    Ok(entries)
}
