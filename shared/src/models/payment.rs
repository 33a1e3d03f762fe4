//! Payment Model

use serde::{Deserialize, Serialize};

use super::order::PaymentStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Online,
}

/// Payment recorded against an order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i64,
    pub restaurant_id: i64,
    pub order_id: i64,
    pub method: PaymentMethod,
    pub amount: f64,
    pub received_by: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCreate {
    pub method: PaymentMethod,
    pub amount: f64,
}

/// Result of recording a payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub payment: Payment,
    pub payment_status: PaymentStatus,
    pub paid_total: f64,
    pub remaining: f64,
    /// Cash handed back when a cash payment overshoots the balance
    pub change: f64,
}
