//! Address Model

use serde::{Deserialize, Serialize};

/// Address label (display grouping, not an access-control category)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AddressKind {
    #[default]
    Home,
    Billing,
    Shipping,
}

/// Postal address owned by exactly one account.
///
/// Copied by value into orders at finalize; later edits or deletions never
/// alter historical orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: String,
    pub kind: AddressKind,
    pub street: String,
    pub city: String,
    pub zip: String,
    pub country: String,
}

/// Save-address payload (create when `id` is `None`, edit otherwise)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressDraft {
    pub id: Option<String>,
    pub kind: AddressKind,
    pub street: String,
    pub city: String,
    pub zip: String,
    pub country: String,
}
