//! Restaurant settings: validation and effective values with defaults

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::SettingsMap;
use shared::models::setting::{
    self, CURRENCY, DEFAULT_SETTINGS, LOYALTY_POINTS_PER_UNIT, OTP_TTL_SECS, TAX_RATE_PERCENT,
};
use sqlx::{SqliteExecutor, SqlitePool};
use std::str::FromStr;

use crate::db::repository::{RepoResult, setting as setting_repo};
use crate::error::ServiceResult;

/// Stored settings merged over the defaults of every known key
pub async fn effective(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
) -> RepoResult<SettingsMap> {
    let mut map: SettingsMap = DEFAULT_SETTINGS
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    for row in setting_repo::list(exec, restaurant_id).await? {
        map.insert(row.key, row.value);
    }
    Ok(map)
}

/// Decimal-valued setting, falling back to its default when unset
///
/// A stored value that no longer parses is logged and replaced by the default.
pub async fn decimal(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    key: &str,
) -> RepoResult<Decimal> {
    let fallback = setting::default_value(key)
        .and_then(|v| Decimal::from_str(v).ok())
        .unwrap_or_default();
    let stored = setting_repo::get(exec, restaurant_id, key).await?;
    Ok(match stored {
        Some(raw) => Decimal::from_str(&raw).unwrap_or_else(|_| {
            tracing::warn!(restaurant_id, key, value = %raw, "Unparseable setting, using default");
            fallback
        }),
        None => fallback,
    })
}

/// Integer-valued setting, falling back to its default when unset
pub async fn integer(
    exec: impl SqliteExecutor<'_>,
    restaurant_id: i64,
    key: &str,
) -> RepoResult<i64> {
    let fallback = setting::default_value(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    let stored = setting_repo::get(exec, restaurant_id, key).await?;
    Ok(stored.and_then(|raw| raw.parse().ok()).unwrap_or(fallback))
}

fn invalid(key: &str, reason: &str) -> AppError {
    let message = format!("Invalid value for '{key}': {reason}");
    AppError::with_message(ErrorCode::ValueOutOfRange, message).with_detail("key", key)
}

/// Validate one key/value pair
pub fn validate(key: &str, value: &str) -> Result<(), AppError> {
    match key {
        TAX_RATE_PERCENT => match Decimal::from_str(value) {
            Ok(d) if d >= Decimal::ZERO && d <= Decimal::ONE_HUNDRED => Ok(()),
            _ => Err(invalid(key, "expected a number between 0 and 100")),
        },
        LOYALTY_POINTS_PER_UNIT => match Decimal::from_str(value) {
            Ok(d) if d >= Decimal::ZERO => Ok(()),
            _ => Err(invalid(key, "expected a non-negative number")),
        },
        CURRENCY => {
            if value.len() == 3 && value.chars().all(|c| c.is_ascii_uppercase()) {
                Ok(())
            } else {
                Err(invalid(key, "expected a 3-letter upper-case code"))
            }
        }
        OTP_TTL_SECS => match value.parse::<i64>() {
            Ok(n) if (60..=3600).contains(&n) => Ok(()),
            _ => Err(invalid(key, "expected whole seconds between 60 and 3600")),
        },
        other => {
            let err = AppError::validation(format!("Unknown setting '{other}'"));
            Err(err.with_detail("key", other))
        }
    }
}

/// Validate every entry, then write them all in one transaction
pub async fn update(
    pool: &SqlitePool,
    restaurant_id: i64,
    changes: &SettingsMap,
) -> ServiceResult<SettingsMap> {
    if changes.is_empty() {
        return Err(AppError::validation("No settings provided").into());
    }
    for (key, value) in changes {
        validate(key, value.trim())?;
    }

    let mut tx = pool.begin().await?;
    for (key, value) in changes {
        setting_repo::upsert(&mut *tx, restaurant_id, key, value.trim()).await?;
    }
    let map = effective(&mut *tx, restaurant_id).await?;
    tx.commit().await?;

    tracing::info!(restaurant_id, keys = ?changes.keys().collect::<Vec<_>>(), "Settings updated");
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;

    #[test]
    fn validates_known_keys() {
        assert!(validate(TAX_RATE_PERCENT, "10").is_ok());
        assert!(validate(TAX_RATE_PERCENT, "7.5").is_ok());
        assert!(validate(TAX_RATE_PERCENT, "101").is_err());
        assert!(validate(TAX_RATE_PERCENT, "-1").is_err());
        assert!(validate(LOYALTY_POINTS_PER_UNIT, "0.5").is_ok());
        assert!(validate(LOYALTY_POINTS_PER_UNIT, "abc").is_err());
        assert!(validate(CURRENCY, "USD").is_ok());
        assert!(validate(CURRENCY, "usd").is_err());
        assert!(validate(OTP_TTL_SECS, "600").is_ok());
        assert!(validate(OTP_TTL_SECS, "30").is_err());
    }

    #[test]
    fn unknown_key_is_a_validation_error() {
        let err = validate("theme", "dark").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn defaults_are_filled_in() {
        let (pool, rid) = testing::setup().await;
        let map = effective(&pool, rid).await.unwrap();
        assert_eq!(map.get(TAX_RATE_PERCENT).map(String::as_str), Some("0"));
        assert_eq!(map.get(CURRENCY).map(String::as_str), Some("EUR"));
        assert_eq!(integer(&pool, rid, OTP_TTL_SECS).await.unwrap(), 300);
    }

    #[tokio::test]
    async fn update_is_all_or_nothing() {
        let (pool, rid) = testing::setup().await;
        let mut changes = SettingsMap::new();
        changes.insert(TAX_RATE_PERCENT.into(), "10".into());
        changes.insert(CURRENCY.into(), "dollars".into());
        assert!(update(&pool, rid, &changes).await.is_err());
        assert_eq!(decimal(&pool, rid, TAX_RATE_PERCENT).await.unwrap(), Decimal::ZERO);

        changes.insert(CURRENCY.into(), "USD".into());
        let map = update(&pool, rid, &changes).await.unwrap();
        assert_eq!(map.get(CURRENCY).map(String::as_str), Some("USD"));
        assert_eq!(decimal(&pool, rid, TAX_RATE_PERCENT).await.unwrap(), Decimal::from(10));
    }
}
