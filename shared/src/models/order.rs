//! Order Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::address::Address;
use super::cart::CartItem;

/// Order status, forward-only by caller convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Confirmed,
    Shipped,
    Delivered,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
        };
        f.write_str(label)
    }
}

/// Finalized order (element of a user document's `orders` list)
///
/// `items` and `total` are frozen copies taken at finalize; only `status`
/// changes afterwards. Never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Client-generated opaque token allocated when checkout entered Payment
    pub id: String,
    pub placed_at: DateTime<Utc>,
    pub items: Vec<CartItem>,
    /// Order total in whole BDT, Σ line totals at finalize
    pub total: i64,
    pub status: OrderStatus,
    /// Out-of-band payment reference quoted by the buyer; unverified
    pub payment_reference: String,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
    /// Denormalized owner identity for the admin overview
    pub customer_email: String,
    pub customer_name: String,
    pub customer_phone: String,
}
