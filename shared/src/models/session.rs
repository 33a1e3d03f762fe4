//! Session, Login Log and OTP Models

use serde::{Deserialize, Serialize};

/// Server-side session; the JWT `jti` points here
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Session {
    pub id: String,
    pub user_id: i64,
    pub restaurant_id: i64,
    pub expires_at: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum LoginMethod {
    Password,
    Otp,
}

/// Login attempt record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct LoginLog {
    pub id: i64,
    pub restaurant_id: i64,
    pub user_id: Option<i64>,
    pub email: String,
    pub method: LoginMethod,
    pub success: bool,
    pub ip: Option<String>,
    pub created_at: i64,
}

/// Pending one-time code (hash only)
#[derive(Debug, Clone)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OtpCode {
    pub restaurant_id: i64,
    pub email: String,
    pub code_hash: String,
    pub attempts: i32,
    pub expires_at: i64,
    pub created_at: i64,
}
