//! Restaurant (tenant) Model

use serde::{Deserialize, Serialize};

/// Restaurant entity; the isolation unit for every other row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    /// URL-safe unique handle used by public and login routes
    pub slug: String,
    pub is_active: bool,
    pub created_at: i64,
}

/// Onboarding payload: the restaurant plus its first admin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantCreate {
    pub name: String,
    pub slug: String,
    pub admin_email: String,
    pub admin_name: String,
    pub admin_password: String,
}
