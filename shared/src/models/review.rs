//! Review Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A submitted product review (element of a user document's `reviews` list)
///
/// The author's display name is not stored here; readers join it live from
/// the current user record, so renames retroactively change attribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub product_id: String,
    /// Denormalized product name at submission time
    pub product_name: String,
    /// 1–5, fractional allowed
    pub rating: Decimal,
    pub comment: String,
    pub submitted_at: DateTime<Utc>,
}
