//! Session Repository

use super::RepoResult;
use shared::models::Session;
use sqlx::SqliteExecutor;

pub async fn create(
    exec: impl SqliteExecutor<'_>,
    user_id: i64,
    restaurant_id: i64,
    expires_at: i64,
) -> RepoResult<Session> {
    let session = sqlx::query_as::<_, Session>(
        "INSERT INTO session (id, user_id, restaurant_id, expires_at, created_at) \
         VALUES (?, ?, ?, ?, ?) \
         RETURNING id, user_id, restaurant_id, expires_at, created_at",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(restaurant_id)
    .bind(expires_at)
    .bind(shared::util::now_millis())
    .fetch_one(exec)
    .await?;
    Ok(session)
}

/// Session that exists and has not expired at `now`
pub async fn find_valid(
    exec: impl SqliteExecutor<'_>,
    id: &str,
    now: i64,
) -> RepoResult<Option<Session>> {
    let session = sqlx::query_as::<_, Session>(
        "SELECT id, user_id, restaurant_id, expires_at, created_at FROM session \
         WHERE id = ? AND expires_at > ?",
    )
    .bind(id)
    .bind(now)
    .fetch_optional(exec)
    .await?;
    Ok(session)
}

pub async fn delete(exec: impl SqliteExecutor<'_>, id: &str) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM session WHERE id = ?")
        .bind(id)
        .execute(exec)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_for_user(exec: impl SqliteExecutor<'_>, user_id: i64) -> RepoResult<u64> {
    let result = sqlx::query("DELETE FROM session WHERE user_id = ?")
        .bind(user_id)
        .execute(exec)
        .await?;
    Ok(result.rows_affected())
}

/// Delete sessions with `expires_at <= now`; returns the number removed
pub async fn delete_expired(exec: impl SqliteExecutor<'_>, now: i64) -> RepoResult<u64> {
    let result = sqlx::query("DELETE FROM session WHERE expires_at <= ?")
        .bind(now)
        .execute(exec)
        .await?;
    Ok(result.rows_affected())
}
