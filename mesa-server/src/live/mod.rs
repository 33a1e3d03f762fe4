//! EventHub: per-restaurant real-time fan-out
//!
//! ```text
//! service (after commit)
//!       │ RealtimeEvent
//!       ▼
//! EventHub
//!   └── restaurant_id → broadcast::Sender<RealtimeEvent>
//!           │
//!           ▼
//!   WS sessions (subscribe → forward as {"event", "data"})
//! ```
//!
//! Publishing is fire-and-forget: no subscribers is not an error, and slow
//! subscribers observe `Lagged` instead of blocking publishers.

use dashmap::DashMap;
use shared::event::RealtimeEvent;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcast channel capacity per restaurant
pub const BROADCAST_CAPACITY: usize = 256;

#[derive(Clone, Default)]
pub struct EventHub {
    /// restaurant_id → sender, created lazily
    channels: Arc<DashMap<i64, broadcast::Sender<RealtimeEvent>>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn sender(&self, restaurant_id: i64) -> broadcast::Sender<RealtimeEvent> {
        self.channels
            .entry(restaurant_id)
            .or_insert_with(|| broadcast::channel(BROADCAST_CAPACITY).0)
            .clone()
    }

    /// Publish to every subscriber of the restaurant; returns the receiver count
    pub fn publish(&self, restaurant_id: i64, event: RealtimeEvent) -> usize {
        let name = event.name();
        match self.sender(restaurant_id).send(event) {
            Ok(receivers) => {
                tracing::debug!(restaurant_id, event = name, receivers, "Realtime event published");
                receivers
            }
            Err(_) => 0,
        }
    }

    pub fn subscribe(&self, restaurant_id: i64) -> broadcast::Receiver<RealtimeEvent> {
        self.sender(restaurant_id).subscribe()
    }

    pub fn subscriber_count(&self, restaurant_id: i64) -> usize {
        self.channels
            .get(&restaurant_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}
