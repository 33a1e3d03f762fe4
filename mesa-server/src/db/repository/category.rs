//! Menu Category Repository

use super::{RepoError, RepoResult};
use shared::models::{MenuCategory, MenuCategoryCreate, MenuCategoryUpdate};
use sqlx::{SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, restaurant_id, name, sort_order, is_active";

pub async fn list(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    active_only: bool,
) -> RepoResult<Vec<MenuCategory>> {
    let categories = sqlx::query_as::<_, MenuCategory>(&format!(
        "SELECT {COLUMNS} FROM menu_category \
         WHERE restaurant_id = ? AND (? = 0 OR is_active = 1) ORDER BY sort_order, name"
    ))
    .bind(restaurant_id)
    .bind(active_only)
    .fetch_all(exec)
    .await?;
    Ok(categories)
}

pub async fn find_by_id(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    id: i64,
) -> RepoResult<Option<MenuCategory>> {
    let category = sqlx::query_as::<_, MenuCategory>(&format!(
        "SELECT {COLUMNS} FROM menu_category WHERE restaurant_id = ? AND id = ?"
    ))
    .bind(restaurant_id)
    .bind(id)
    .fetch_optional(exec)
    .await?;
    Ok(category)
}

pub async fn create(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    data: &MenuCategoryCreate,
) -> RepoResult<MenuCategory> {
    let category = sqlx::query_as::<_, MenuCategory>(&format!(
        "INSERT INTO menu_category (id, restaurant_id, name, sort_order, is_active) \
         VALUES (?, ?, ?, ?, 1) RETURNING {COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(restaurant_id)
    .bind(data.name.trim())
    .bind(data.sort_order)
    .fetch_one(exec)
    .await?;
    Ok(category)
}

pub async fn update(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    id: i64,
    data: &MenuCategoryUpdate,
) -> RepoResult<Option<MenuCategory>> {
    let category = sqlx::query_as::<_, MenuCategory>(&format!(
        "UPDATE menu_category SET name = COALESCE(?1, name), \
         sort_order = COALESCE(?2, sort_order), is_active = COALESCE(?3, is_active) \
         WHERE restaurant_id = ?4 AND id = ?5 RETURNING {COLUMNS}"
    ))
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.sort_order)
    .bind(data.is_active)
    .bind(restaurant_id)
    .bind(id)
    .fetch_optional(exec)
    .await?;
    Ok(category)
}

/// Delete a category; refuses while items still reference it
pub async fn delete(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM menu_item WHERE restaurant_id = ? AND category_id = ?",
    )
    .bind(restaurant_id)
    .bind(id)
    .fetch_one(pool)
    .await?;
    if count > 0 {
        return Err(RepoError::Validation(format!(
            "Category still has {count} item(s)"
        )));
    }
    let result = sqlx::query("DELETE FROM menu_category WHERE restaurant_id = ? AND id = ?")
        .bind(restaurant_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;

    fn category(name: &str, sort_order: i32) -> MenuCategoryCreate {
        MenuCategoryCreate {
            name: name.into(),
            sort_order,
        }
    }

    #[tokio::test]
    async fn list_orders_by_sort_order_and_hides_inactive() {
        let (pool, rid) = testing::setup().await;
        create(&pool, rid, &category("Mains", 2)).await.unwrap();
        let starters = create(&pool, rid, &category("Starters", 1)).await.unwrap();
        let drinks = create(&pool, rid, &category("Drinks", 3)).await.unwrap();

        let update = MenuCategoryUpdate {
            is_active: Some(false),
            ..Default::default()
        };
        super::update(&pool, rid, drinks.id, &update).await.unwrap();

        let all = list(&pool, rid, false).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, starters.id);

        let active = list(&pool, rid, true).await.unwrap();
        assert_eq!(active.len(), 2);
        assert!(active.iter().all(|c| c.is_active));
    }

    #[tokio::test]
    async fn delete_missing_category_returns_false() {
        let (pool, rid) = testing::setup().await;
        assert!(!delete(&pool, rid, 12345).await.unwrap());
    }
}
