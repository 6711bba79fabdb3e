//! In-process feed of order changes for the admin board.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::order_status::OrderStatus;

const FEED_CAPACITY: usize = 256;

/// Admin views that must be refreshed when an order changes.
pub const INVALIDATED_VIEWS: [&str; 3] = ["realtime-orders", "admin-orders", "admin-stats"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderEventKind {
    Created,
    StatusChanged,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderEvent {
    pub kind: OrderEventKind,
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub at: DateTime<Utc>,
    pub invalidates: Vec<String>,
}

impl OrderEvent {
    pub fn new(kind: OrderEventKind, order_id: Uuid, status: OrderStatus) -> Self {
        Self {
            kind,
            order_id,
            status,
            at: Utc::now(),
            invalidates: INVALIDATED_VIEWS.iter().map(|view| view.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderFeed {
    sender: broadcast::Sender<OrderEvent>,
}

impl Default for OrderFeed {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        Self { sender }
    }
}

impl OrderFeed {
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.sender.subscribe()
    }

    /// Publishing with nobody listening is not an error.
    pub fn publish(&self, event: OrderEvent) {
        match self.sender.send(event) {
            Ok(receivers) => tracing::debug!(receivers, "order event published"),
            Err(_) => tracing::debug!("order event dropped, no subscribers"),
        }
    }
}
