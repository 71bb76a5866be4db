//! Engine events
//!
//! Broadcast to every connected reader after a state change has been
//! applied, including the originator. Payloads carry just enough to let a
//! reader decide whether to re-pull from the mirror.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::OrderStatus;

/// Event published on the engine's broadcast channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorefrontEvent {
    /// The product snapshot was replaced by a remote delivery
    ProductsRefreshed { count: usize },
    /// The user snapshot was replaced by a remote delivery
    UsersRefreshed { count: usize },
    /// The identified account changed remotely; the session copy was refreshed
    AccountRefreshed { email: String },
    /// A checkout completed and the order was persisted
    OrderFinalized {
        email: String,
        order_id: String,
        total: i64,
    },
    /// One order's status was mapped to a new value
    OrderStatusChanged {
        email: String,
        order_id: String,
        status: OrderStatus,
    },
    /// A review was folded into a product's statistics
    ReviewSubmitted {
        email: String,
        product_id: String,
        rating: Decimal,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tagging() {
        let event = StorefrontEvent::ProductsRefreshed { count: 12 };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"products_refreshed\""));
        assert!(json.contains("\"count\":12"));
    }

    #[test]
    fn test_event_roundtrip() {
        let event = StorefrontEvent::OrderFinalized {
            email: "buyer@example.com".to_string(),
            order_id: "CP-9X41ZK".to_string(),
            total: 6878,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: StorefrontEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
