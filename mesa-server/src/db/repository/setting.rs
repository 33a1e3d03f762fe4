//! Setting Repository (key/value per restaurant)

use super::RepoResult;
use shared::models::Setting;
use sqlx::SqliteExecutor;

pub async fn list(exec: impl SqliteExecutor<'_>, restaurant_id: i64) -> RepoResult<Vec<Setting>> {
    let settings = sqlx::query_as::<_, Setting>(
        "SELECT restaurant_id, key, value, updated_at FROM setting \
         WHERE restaurant_id = ? ORDER BY key",
    )
    .bind(restaurant_id)
    .fetch_all(exec)
    .await?;
    Ok(settings)
}

pub async fn get(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    key: &str,
) -> RepoResult<Option<String>> {
    let value: Option<String> =
        sqlx::query_scalar("SELECT value FROM setting WHERE restaurant_id = ? AND key = ?")
            .bind(restaurant_id)
            .bind(key)
            .fetch_optional(exec)
            .await?;
    Ok(value)
}

pub async fn upsert(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    key: &str,
    value: &str,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO setting (restaurant_id, key, value, updated_at) VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT (restaurant_id, key) DO UPDATE SET value = ?3, updated_at = ?4",
    )
    .bind(restaurant_id)
    .bind(key)
    .bind(value)
    .bind(shared::util::now_millis())
    .execute(exec)
    .await?;
    Ok(())
}
