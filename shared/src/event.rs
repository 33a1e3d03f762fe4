//! Real-time events pushed to connected clients
//!
//! Wire format is `{"event": "<name>", "data": {...}}`.

use serde::{Deserialize, Serialize};

use crate::models::{DiningTable, ItemStatus, Order, OrderItem, OrderStatus, TableStatus};

/// Event fanned out to every subscriber of a restaurant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum RealtimeEvent {
    /// Handshake complete
    Ready { restaurant_id: i64 },

    /// Events were dropped for this subscriber; clients should refetch state
    Resync,

    OrderPlaced { order: Box<Order> },

    OrderAccepted {
        order_id: i64,
        kitchen_order_id: i64,
        staff_id: i64,
        status: OrderStatus,
        started_at: i64,
    },

    ItemStatusUpdate {
        order_id: i64,
        item_index: usize,
        status: ItemStatus,
        items: Vec<OrderItem>,
    },

    OrderStatusUpdate {
        order_id: i64,
        status: OrderStatus,
        table_id: Option<i64>,
    },

    TableUpdate {
        table_id: i64,
        table_number: i32,
        status: TableStatus,
    },
}

impl RealtimeEvent {
    pub fn table_update(table: &DiningTable) -> Self {
        RealtimeEvent::TableUpdate {
            table_id: table.id,
            table_number: table.number,
            status: table.status,
        }
    }

    pub fn order_status(order: &Order) -> Self {
        RealtimeEvent::OrderStatusUpdate {
            order_id: order.id,
            status: order.status,
            table_id: order.table_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RealtimeEvent::Ready { .. } => "ready",
            RealtimeEvent::Resync => "resync",
            RealtimeEvent::OrderPlaced { .. } => "orderPlaced",
            RealtimeEvent::OrderAccepted { .. } => "orderAccepted",
            RealtimeEvent::ItemStatusUpdate { .. } => "itemStatusUpdate",
            RealtimeEvent::OrderStatusUpdate { .. } => "orderStatusUpdate",
            RealtimeEvent::TableUpdate { .. } => "tableUpdate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_event_and_data() {
        let event = RealtimeEvent::TableUpdate {
            table_id: 9,
            table_number: 4,
            status: TableStatus::Occupied,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "tableUpdate",
                "data": {"table_id": 9, "table_number": 4, "status": "occupied"}
            })
        );
        assert_eq!(event.name(), "tableUpdate");
    }

    #[test]
    fn resync_has_no_payload() {
        let value = serde_json::to_value(RealtimeEvent::Resync).unwrap();
        assert_eq!(value, json!({"event": "resync"}));
    }

    #[test]
    fn name_matches_wire_tag() {
        let event = RealtimeEvent::OrderAccepted {
            order_id: 1,
            kitchen_order_id: 2,
            staff_id: 3,
            status: OrderStatus::Preparing,
            started_at: 10,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], event.name());
        assert_eq!(value["data"]["status"], "preparing");
    }
}
