//! Price Adjustment Engine
//!
//! Turns an operator-entered base price plus an adjustment directive into
//! the selling price, the reconstructed pre-adjustment price, and the badge
//! label shown next to it. The entered base price is always the price the
//! customer pays; the adjustment only reconstructs what the price used to
//! be. For a reduction the reconstructed original sits above the selling
//! price; for an increase it sits below it, which renders as a strikethrough
//! over a price lower than the current one.

use shared::models::AdjustmentType;

/// Outcome of applying an adjustment directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedPrice {
    /// Selling price in whole BDT; always the entered base price
    pub selling_price: i64,
    /// Reconstructed pre-adjustment price; present only when the directive
    /// carries a positive amount
    pub original_price: Option<i64>,
    /// Badge label, e.g. `- BDT 1,500`
    pub discount_label: Option<String>,
}

/// Apply an adjustment directive to a base price.
///
/// A non-positive amount degrades to no adjustment regardless of the
/// directive.
pub fn apply_adjustment(base_price: i64, adjustment: AdjustmentType, amount: i64) -> AppliedPrice {
    match adjustment {
        AdjustmentType::Reduced if amount > 0 => AppliedPrice {
            selling_price: base_price,
            original_price: Some(base_price + amount),
            discount_label: Some(format!("- BDT {}", format_bdt(amount))),
        },
        AdjustmentType::Increased if amount > 0 => AppliedPrice {
            selling_price: base_price,
            original_price: Some(base_price - amount),
            discount_label: Some(format!("+ BDT {}", format_bdt(amount))),
        },
        _ => AppliedPrice {
            selling_price: base_price,
            original_price: None,
            discount_label: None,
        },
    }
}

/// Group digits with thousands separators: `4280` becomes `4,280`.
#[inline]
pub fn format_bdt(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 { format!("-{grouped}") } else { grouped }
}
