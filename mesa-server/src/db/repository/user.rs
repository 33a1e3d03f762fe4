//! User Repository

use super::RepoResult;
use shared::models::{Role, User, UserUpdate};
use sqlx::SqliteExecutor;

const COLUMNS: &str = "id, restaurant_id, email, name, password_hash, role, hourly_rate, \
    is_active, created_at, updated_at";

/// New user row; the password is already hashed
pub struct NewUser<'a> {
    pub restaurant_id: i64,
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
    pub hourly_rate: f64,
}

pub async fn create(exec: impl SqliteExecutor<'_>, data: NewUser<'_>) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO user ({COLUMNS}) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8) RETURNING {COLUMNS}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(data.restaurant_id)
    .bind(data.email)
    .bind(data.name)
    .bind(data.password_hash)
    .bind(data.role)
    .bind(data.hourly_rate)
    .bind(now)
    .fetch_one(exec)
    .await?;
    Ok(user)
}

pub async fn find_by_id(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    id: i64,
) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM user WHERE restaurant_id = ? AND id = ?"
    ))
    .bind(restaurant_id)
    .bind(id)
    .fetch_optional(exec)
    .await?;
    Ok(user)
}

pub async fn find_by_email(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    email: &str,
) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM user WHERE restaurant_id = ? AND email = ?"
    ))
    .bind(restaurant_id)
    .bind(email)
    .fetch_optional(exec)
    .await?;
    Ok(user)
}

/// List users of a restaurant, optionally filtered by role
pub async fn list(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    role: Option<Role>,
) -> RepoResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM user WHERE restaurant_id = ?1 AND (?2 IS NULL OR role = ?2) \
         ORDER BY name"
    ))
    .bind(restaurant_id)
    .bind(role)
    .fetch_all(exec)
    .await?;
    Ok(users)
}

/// Partial update; returns `None` when the user does not exist
pub async fn update(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    id: i64,
    data: &UserUpdate,
) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE user SET name = COALESCE(?1, name), role = COALESCE(?2, role), \
         hourly_rate = COALESCE(?3, hourly_rate), is_active = COALESCE(?4, is_active), \
         updated_at = ?5 \
         WHERE restaurant_id = ?6 AND id = ?7 RETURNING {COLUMNS}"
    ))
    .bind(data.name.as_deref())
    .bind(data.role)
    .bind(data.hourly_rate)
    .bind(data.is_active)
    .bind(shared::util::now_millis())
    .bind(restaurant_id)
    .bind(id)
    .fetch_optional(exec)
    .await?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{RepoError, testing};

    fn waiter(restaurant_id: i64, email: &str) -> NewUser<'_> {
        NewUser {
            restaurant_id,
            email,
            name: "Wendy",
            password_hash: "hash",
            role: Role::Waiter,
            hourly_rate: 12.5,
        }
    }

    #[tokio::test]
    async fn email_unique_per_restaurant() {
        let (pool, rid) = testing::setup().await;
        create(&pool, waiter(rid, "w@example.com")).await.unwrap();
        let dup = create(&pool, waiter(rid, "w@example.com")).await;
        assert!(matches!(dup, Err(RepoError::Duplicate(_))));

        let other = crate::db::repository::restaurant::create(&pool, "Other", "other")
            .await
            .unwrap();
        assert!(create(&pool, waiter(other.id, "w@example.com")).await.is_ok());
    }

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let (pool, rid) = testing::setup().await;
        let user = create(&pool, waiter(rid, "w@example.com")).await.unwrap();

        let update = UserUpdate {
            role: Some(Role::Cashier),
            ..Default::default()
        };
        let updated = super::update(&pool, rid, user.id, &update)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.role, Role::Cashier);
        assert_eq!(updated.name, "Wendy");
        assert_eq!(updated.hourly_rate, 12.5);

        let missing = super::update(&pool, rid, 42, &update).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn list_filters_by_role() {
        let (pool, rid) = testing::setup().await;
        create(&pool, waiter(rid, "a@example.com")).await.unwrap();
        let mut customer = waiter(rid, "c@example.com");
        customer.role = Role::Customer;
        create(&pool, customer).await.unwrap();

        assert_eq!(list(&pool, rid, None).await.unwrap().len(), 2);
        let customers = list(&pool, rid, Some(Role::Customer)).await.unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].email, "c@example.com");
    }
}
