//! Restaurant Repository

use super::RepoResult;
use shared::models::Restaurant;
use sqlx::SqliteExecutor;

const COLUMNS: &str = "id, name, slug, is_active, created_at";

pub async fn create(
    exec: impl SqliteExecutor<'_>,
    name: &str,
    slug: &str,
) -> RepoResult<Restaurant> {
    let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
        "INSERT INTO restaurant ({COLUMNS}) VALUES (?, ?, ?, 1, ?) RETURNING {COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(name)
    .bind(slug)
    .bind(shared::util::now_millis())
    .fetch_one(exec)
    .await?;
    Ok(restaurant)
}

pub async fn find_by_id(exec: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Restaurant>> {
    let restaurant =
        sqlx::query_as::<_, Restaurant>(&format!("SELECT {COLUMNS} FROM restaurant WHERE id = ?"))
            .bind(id)
            .fetch_optional(exec)
            .await?;
    Ok(restaurant)
}

pub async fn find_by_slug(
    exec: impl SqliteExecutor<'_>,
    slug: &str,
) -> RepoResult<Option<Restaurant>> {
    let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
        "SELECT {COLUMNS} FROM restaurant WHERE slug = ?"
    ))
    .bind(slug)
    .fetch_optional(exec)
    .await?;
    Ok(restaurant)
}
