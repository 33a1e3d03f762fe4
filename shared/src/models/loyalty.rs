//! Loyalty Points Models

use serde::{Deserialize, Serialize};

/// Ledger entry; positive points are earned, negative are redeemed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct LoyaltyTransaction {
    pub id: i64,
    pub restaurant_id: i64,
    pub customer_id: i64,
    pub order_id: Option<i64>,
    pub points: i64,
    pub reason: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyBalance {
    pub customer_id: i64,
    pub balance: i64,
    pub history: Vec<LoyaltyTransaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemRequest {
    pub customer_id: i64,
    pub points: i64,
    pub reason: Option<String>,
}
