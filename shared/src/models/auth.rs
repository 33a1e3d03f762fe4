//! Authentication request / response types

use serde::{Deserialize, Serialize};

use super::{Restaurant, UserResponse};

/// Password login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Restaurant slug
    pub slug: String,
    pub email: String,
    pub password: String,
}

/// Ask for a one-time code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpRequest {
    pub slug: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpVerifyRequest {
    pub slug: String,
    pub email: String,
    pub code: String,
}

/// Customer self-registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRegister {
    pub slug: String,
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Issued on successful login or OTP verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    /// Session expiry, epoch milliseconds
    pub expires_at: i64,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardResponse {
    pub restaurant: Restaurant,
    pub admin: UserResponse,
}
