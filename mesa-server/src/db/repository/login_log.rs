//! Login Log Repository

use super::RepoResult;
use shared::models::{LoginLog, LoginMethod};
use sqlx::SqliteExecutor;

pub struct NewLoginLog<'a> {
    pub restaurant_id: i64,
    pub user_id: Option<i64>,
    pub email: &'a str,
    pub method: LoginMethod,
    pub success: bool,
    pub ip: Option<&'a str>,
}

pub async fn create(exec: impl SqliteExecutor<'_>, entry: NewLoginLog<'_>) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO login_log \
         (id, restaurant_id, user_id, email, method, success, ip, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(shared::util::snowflake_id())
    .bind(entry.restaurant_id)
    .bind(entry.user_id)
    .bind(entry.email)
    .bind(entry.method)
    .bind(entry.success)
    .bind(entry.ip)
    .bind(shared::util::now_millis())
    .execute(exec)
    .await?;
    Ok(())
}

/// Newest first
pub async fn list(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    limit: i64,
) -> RepoResult<Vec<LoginLog>> {
    let logs = sqlx::query_as::<_, LoginLog>(
        "SELECT id, restaurant_id, user_id, email, method, success, ip, created_at FROM login_log \
         WHERE restaurant_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
    )
    .bind(restaurant_id)
    .bind(limit)
    .fetch_all(exec)
    .await?;
    Ok(logs)
}
