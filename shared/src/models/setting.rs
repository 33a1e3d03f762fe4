//! Restaurant Settings Model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TAX_RATE_PERCENT: &str = "tax_rate_percent";
pub const LOYALTY_POINTS_PER_UNIT: &str = "loyalty_points_per_unit";
pub const CURRENCY: &str = "currency";
pub const OTP_TTL_SECS: &str = "otp_ttl_secs";

/// Known keys with their default values
pub const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    (TAX_RATE_PERCENT, "0"),
    (LOYALTY_POINTS_PER_UNIT, "1"),
    (CURRENCY, "EUR"),
    (OTP_TTL_SECS, "300"),
];

/// Single stored setting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Setting {
    pub restaurant_id: i64,
    pub key: String,
    pub value: String,
    pub updated_at: i64,
}

/// Settings as exchanged with clients: key → value
pub type SettingsMap = BTreeMap<String, String>;

pub fn is_known_key(key: &str) -> bool {
    DEFAULT_SETTINGS.iter().any(|(k, _)| *k == key)
}

pub fn default_value(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}
