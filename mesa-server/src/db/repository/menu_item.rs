//! Menu Item Repository

use super::RepoResult;
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate};
use sqlx::SqliteExecutor;

const COLUMNS: &str =
    "id, restaurant_id, category_id, name, description, price, is_available, created_at, \
     updated_at";

/// List items, optionally restricted to a category and/or available items
pub async fn list(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    category_id: Option<i64>,
    available_only: bool,
) -> RepoResult<Vec<MenuItem>> {
    let items = sqlx::query_as::<_, MenuItem>(&format!(
        "SELECT {COLUMNS} FROM menu_item \
         WHERE restaurant_id = ?1 AND (?2 IS NULL OR category_id = ?2) \
         AND (?3 = 0 OR is_available = 1) ORDER BY name"
    ))
    .bind(restaurant_id)
    .bind(category_id)
    .bind(available_only)
    .fetch_all(exec)
    .await?;
    Ok(items)
}

pub async fn find_by_id(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    id: i64,
) -> RepoResult<Option<MenuItem>> {
    let item = sqlx::query_as::<_, MenuItem>(&format!(
        "SELECT {COLUMNS} FROM menu_item WHERE restaurant_id = ? AND id = ?"
    ))
    .bind(restaurant_id)
    .bind(id)
    .fetch_optional(exec)
    .await?;
    Ok(item)
}

pub async fn create(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    data: &MenuItemCreate,
) -> RepoResult<MenuItem> {
    let now = shared::util::now_millis();
    let item = sqlx::query_as::<_, MenuItem>(&format!(
        "INSERT INTO menu_item ({COLUMNS}) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8) RETURNING {COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(restaurant_id)
    .bind(data.category_id)
    .bind(data.name.trim())
    .bind(data.description.as_deref())
    .bind(data.price)
    .bind(data.is_available)
    .bind(now)
    .fetch_one(exec)
    .await?;
    Ok(item)
}

pub async fn update(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    id: i64,
    data: &MenuItemUpdate,
) -> RepoResult<Option<MenuItem>> {
    let item = sqlx::query_as::<_, MenuItem>(&format!(
        "UPDATE menu_item \
         SET category_id = COALESCE(?1, category_id), name = COALESCE(?2, name), \
         description = COALESCE(?3, description), price = COALESCE(?4, price), \
         is_available = COALESCE(?5, is_available), updated_at = ?6 \
         WHERE restaurant_id = ?7 AND id = ?8 RETURNING {COLUMNS}"
    ))
    .bind(data.category_id)
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.description.as_deref())
    .bind(data.price)
    .bind(data.is_available)
    .bind(shared::util::now_millis())
    .bind(restaurant_id)
    .bind(id)
    .fetch_optional(exec)
    .await?;
    Ok(item)
}

pub async fn set_availability(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    id: i64,
    is_available: bool,
) -> RepoResult<Option<MenuItem>> {
    let item = sqlx::query_as::<_, MenuItem>(&format!(
        "UPDATE menu_item SET is_available = ?, updated_at = ? \
         WHERE restaurant_id = ? AND id = ? RETURNING {COLUMNS}"
    ))
    .bind(is_available)
    .bind(shared::util::now_millis())
    .bind(restaurant_id)
    .bind(id)
    .fetch_optional(exec)
    .await?;
    Ok(item)
}

pub async fn delete(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    id: i64,
) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM menu_item WHERE restaurant_id = ? AND id = ?")
        .bind(restaurant_id)
        .bind(id)
        .execute(exec)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{RepoError, category, testing};
    use shared::models::MenuCategoryCreate;

    async fn seed_category(pool: &sqlx::SqlitePool, rid: i64) -> i64 {
        let data = MenuCategoryCreate {
            name: "Mains".into(),
            sort_order: 0,
        };
        category::create(pool, rid, &data).await.unwrap().id
    }

    fn item(category_id: i64, name: &str, price: f64) -> MenuItemCreate {
        MenuItemCreate {
            category_id,
            name: name.into(),
            description: None,
            price,
            is_available: true,
        }
    }

    #[tokio::test]
    async fn availability_filter() {
        let (pool, rid) = testing::setup().await;
        let cat = seed_category(&pool, rid).await;
        let soup = create(&pool, rid, &item(cat, "Soup", 4.5)).await.unwrap();
        create(&pool, rid, &item(cat, "Steak", 21.0)).await.unwrap();

        set_availability(&pool, rid, soup.id, false).await.unwrap();

        assert_eq!(list(&pool, rid, None, false).await.unwrap().len(), 2);
        let available = list(&pool, rid, Some(cat), true).await.unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].name, "Steak");
    }

    #[tokio::test]
    async fn category_with_items_cannot_be_deleted() {
        let (pool, rid) = testing::setup().await;
        let cat = seed_category(&pool, rid).await;
        let soup = create(&pool, rid, &item(cat, "Soup", 4.5)).await.unwrap();

        let result = category::delete(&pool, rid, cat).await;
        assert!(matches!(result, Err(RepoError::Validation(_))));

        assert!(delete(&pool, rid, soup.id).await.unwrap());
        assert!(category::delete(&pool, rid, cat).await.unwrap());
    }

    #[tokio::test]
    async fn items_are_scoped_to_restaurant() {
        let (pool, rid) = testing::setup().await;
        let cat = seed_category(&pool, rid).await;
        let soup = create(&pool, rid, &item(cat, "Soup", 4.5)).await.unwrap();
        assert!(find_by_id(&pool, rid + 1, soup.id).await.unwrap().is_none());
    }
}
