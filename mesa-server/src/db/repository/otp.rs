//! One-time code Repository

use super::RepoResult;
use shared::models::OtpCode;
use sqlx::SqliteExecutor;

/// Store a new code hash, resetting attempts
pub async fn upsert(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    email: &str,
    code_hash: &str,
    expires_at: i64,
    now: i64,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO otp_code (restaurant_id, email, code_hash, attempts, expires_at, created_at) \
         VALUES (?1, ?2, ?3, 0, ?4, ?5) \
         ON CONFLICT (restaurant_id, email) \
         DO UPDATE SET code_hash = ?3, attempts = 0, expires_at = ?4, created_at = ?5",
    )
    .bind(restaurant_id)
    .bind(email)
    .bind(code_hash)
    .bind(expires_at)
    .bind(now)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn find(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    email: &str,
) -> RepoResult<Option<OtpCode>> {
    let code = sqlx::query_as::<_, OtpCode>(
        "SELECT restaurant_id, email, code_hash, attempts, expires_at, created_at FROM otp_code \
         WHERE restaurant_id = ? AND email = ?",
    )
    .bind(restaurant_id)
    .bind(email)
    .fetch_optional(exec)
    .await?;
    Ok(code)
}

/// Take one verification attempt from a live code
///
/// Returns the stored hash and the attempt count after this one, or `None`
/// when the code is missing, expired or already out of attempts. The limit is
/// enforced by the UPDATE itself, so concurrent guesses cannot overrun it.
pub async fn reserve_attempt(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    email: &str,
    max_attempts: i32,
    now: i64,
) -> RepoResult<Option<(String, i32)>> {
    let reserved = sqlx::query_as::<_, (String, i32)>(
        "UPDATE otp_code SET attempts = attempts + 1 \
         WHERE restaurant_id = ?1 AND email = ?2 AND attempts < ?3 AND expires_at > ?4 \
         RETURNING code_hash, attempts",
    )
    .bind(restaurant_id)
    .bind(email)
    .bind(max_attempts)
    .bind(now)
    .fetch_optional(exec)
    .await?;
    Ok(reserved)
}

/// Delete the code that was just verified; `false` if another request
/// consumed it first or a new code replaced it
pub async fn consume(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    email: &str,
    code_hash: &str,
) -> RepoResult<bool> {
    let result =
        sqlx::query("DELETE FROM otp_code WHERE restaurant_id = ? AND email = ? AND code_hash = ?")
            .bind(restaurant_id)
            .bind(email)
            .bind(code_hash)
            .execute(exec)
            .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn delete_expired(exec: impl SqliteExecutor<'_>, now: i64) -> RepoResult<u64> {
    let result = sqlx::query("DELETE FROM otp_code WHERE expires_at <= ?")
        .bind(now)
        .execute(exec)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;

    #[tokio::test]
    async fn upsert_resets_attempts() {
        let (pool, rid) = testing::setup().await;
        upsert(&pool, rid, "a@example.com", "h1", 1_000, 0).await.unwrap();
        reserve_attempt(&pool, rid, "a@example.com", 5, 0).await.unwrap();
        reserve_attempt(&pool, rid, "a@example.com", 5, 0).await.unwrap();
        assert_eq!(find(&pool, rid, "a@example.com").await.unwrap().unwrap().attempts, 2);

        upsert(&pool, rid, "a@example.com", "h2", 2_000, 10).await.unwrap();
        let code = find(&pool, rid, "a@example.com").await.unwrap().unwrap();
        assert_eq!(code.attempts, 0);
        assert_eq!(code.code_hash, "h2");
        assert_eq!(code.expires_at, 2_000);
    }

    #[tokio::test]
    async fn delete_expired_keeps_live_codes() {
        let (pool, rid) = testing::setup().await;
        upsert(&pool, rid, "old@example.com", "h", 100, 0).await.unwrap();
        upsert(&pool, rid, "new@example.com", "h", 10_000, 0).await.unwrap();
        assert_eq!(delete_expired(&pool, 500).await.unwrap(), 1);
        assert!(find(&pool, rid, "new@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn attempts_stop_at_the_limit() {
        let (pool, rid) = testing::setup().await;
        upsert(&pool, rid, "a@example.com", "h", 1_000, 0).await.unwrap();
        for expected in 1..=3 {
            let (hash, attempts) = reserve_attempt(&pool, rid, "a@example.com", 3, 10)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(hash, "h");
            assert_eq!(attempts, expected);
        }
        assert!(reserve_attempt(&pool, rid, "a@example.com", 3, 10).await.unwrap().is_none());
        assert_eq!(find(&pool, rid, "a@example.com").await.unwrap().unwrap().attempts, 3);
    }

    #[tokio::test]
    async fn expired_code_gives_no_attempt() {
        let (pool, rid) = testing::setup().await;
        upsert(&pool, rid, "a@example.com", "h", 1_000, 0).await.unwrap();
        assert!(reserve_attempt(&pool, rid, "a@example.com", 5, 1_000).await.unwrap().is_none());
        assert_eq!(find(&pool, rid, "a@example.com").await.unwrap().unwrap().attempts, 0);
    }

    #[tokio::test]
    async fn a_code_is_consumed_once() {
        let (pool, rid) = testing::setup().await;
        upsert(&pool, rid, "a@example.com", "h1", 1_000, 0).await.unwrap();
        assert!(!consume(&pool, rid, "a@example.com", "stale").await.unwrap());
        assert!(consume(&pool, rid, "a@example.com", "h1").await.unwrap());
        assert!(!consume(&pool, rid, "a@example.com", "h1").await.unwrap());
    }
}
