//! Order and Kitchen Order Models
//!
//! An [`Order`] and its [`KitchenOrder`] share the same serialized item list
//! and the same [`OrderStatus`]; the server writes both in one transaction.

use serde::{Deserialize, Serialize};

/// Order channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    DineIn,
    Takeaway,
    Delivery,
}

/// Order / kitchen order lifecycle
///
/// `pending → preparing → ready → completed`, with `cancelled` reachable from
/// `pending` and `preparing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const OPEN: &'static [OrderStatus] = &[
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Still occupies the kitchen and its table
    pub fn is_open(&self) -> bool {
        Self::OPEN.contains(self)
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Preparing)
                | (Pending, Cancelled)
                | (Preparing, Ready)
                | (Preparing, Cancelled)
                | (Ready, Completed)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

/// Per-item kitchen status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Pending,
    Fulfilled,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Fulfilled => "fulfilled",
        }
    }
}

/// One line of an order, stored inside the serialized `items` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub menu_item_id: i64,
    pub name: String,
    pub quantity: i32,
    pub unit_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub status: ItemStatus,
}

/// Customer order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub restaurant_id: i64,
    pub order_type: OrderType,
    pub table_id: Option<i64>,
    pub table_number: Option<i32>,
    pub customer_id: Option<i64>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub note: Option<String>,
    pub created_by: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Kitchen-facing mirror of an [`Order`] (1:1)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct KitchenOrder {
    pub id: i64,
    pub order_id: i64,
    pub restaurant_id: i64,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    /// Staff member who accepted the order
    pub staff_id: Option<i64>,
    pub started_at: Option<i64>,
    pub ready_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Requested line when placing an order; price comes from the menu
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub menu_item_id: i64,
    pub quantity: i32,
    pub note: Option<String>,
}

/// Totals as computed by the client; verified against the server's numbers
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

/// Place order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub order_type: OrderType,
    /// Required for dine-in orders
    pub table_number: Option<i32>,
    pub customer_id: Option<i64>,
    pub items: Vec<OrderItemInput>,
    pub totals: Option<OrderTotals>,
    pub note: Option<String>,
}

/// Per-item status change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemStatusUpdate {
    pub status: ItemStatus,
}

/// Order together with its kitchen mirror
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order: Order,
    pub kitchen_order: KitchenOrder,
}
