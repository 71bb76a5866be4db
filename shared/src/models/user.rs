//! User Account Model

use serde::{Deserialize, Serialize};

use super::address::Address;
use super::order::Order;
use super::review::Review;

/// Account role. Client-asserted display gating only; there is no true
/// authorization model behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// User account (`users/{normalized_email}` document)
///
/// The remote store is the single source of truth; each client holds a
/// possibly-stale read-through copy. `orders` and `reviews` are
/// append-oriented, most-recent-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Normalized lowercase trimmed email, the document key
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    /// SHA-256 hex digest of `email:secret`; the plaintext secret is never stored
    pub credential_digest: String,
    pub role: Role,
    pub addresses: Vec<Address>,
    pub orders: Vec<Order>,
    pub reviews: Vec<Review>,
}

impl UserAccount {
    /// Canonical form of an email used as the document key.
    pub fn normalize_email(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    /// Display name shown in reviews and the admin order overview.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
