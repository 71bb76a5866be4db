//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price adjustment directive attached to a product by catalog operators.
///
/// `reduced` treats the entered price as the already-discounted sale price
/// and reconstructs the pre-discount price above it; `increased` reconstructs
/// it below. See the pricing module for the exact arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentType {
    #[default]
    None,
    Reduced,
    Increased,
}

/// Product entity (`products/{id}` document)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Category display name, one of [`crate::models::CATEGORIES`]
    pub category: String,
    /// Selling price in whole BDT
    pub price: i64,
    /// Pre-adjustment price in whole BDT; presence drives strikethrough rendering
    pub original_price: Option<i64>,
    /// Human-readable adjustment label, e.g. `- BDT 1,500`
    pub discount: Option<String>,
    pub adjustment_type: AdjustmentType,
    /// Adjustment amount in whole BDT
    pub adjustment_amount: i64,
    /// Catalog SKU, `PREFIX-NNNN`
    pub reference: String,
    /// Count-weighted mean of folded review scores, one decimal
    pub rating: Decimal,
    pub review_count: u32,
    pub in_stock: bool,
    pub specs: Vec<String>,
    pub image: Option<String>,
    pub video: Option<String>,
}

/// Save-product payload (create when `id` is `None`, update otherwise)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDraft {
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    /// Entered price in whole BDT; this is already the sale price
    pub price: i64,
    pub adjustment_type: AdjustmentType,
    pub adjustment_amount: i64,
    /// Kept verbatim when supplied; generated from the category otherwise
    pub reference: Option<String>,
    pub rating: Option<Decimal>,
    pub review_count: Option<u32>,
    pub in_stock: Option<bool>,
    pub specs: Vec<String>,
    pub image: Option<String>,
    pub video: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::*;

    #[test]
    fn test_adjustment_type_serde_strings() {
        assert_eq!(
            serde_json::to_string(&AdjustmentType::Reduced).unwrap(),
            "\"reduced\""
        );
        assert_eq!(
            serde_json::from_str::<AdjustmentType>("\"none\"").unwrap(),
            AdjustmentType::None
        );
    }

    #[test]
    fn test_product_roundtrip() {
        let product = Product {
            id: "proj-1".to_string(),
            name: "Line Follower Bot".to_string(),
            description: "Project blueprint description not available.".to_string(),
            category: "BOT PROJECTS".to_string(),
            price: 4280,
            original_price: Some(4780),
            discount: Some("- BDT 500".to_string()),
            adjustment_type: AdjustmentType::Reduced,
            adjustment_amount: 500,
            reference: "BOT-1000".to_string(),
            rating: Decimal::from_f64(4.5).unwrap(),
            review_count: 2,
            in_stock: true,
            specs: vec!["ATmega328P".to_string()],
            image: None,
            video: None,
        };

        let json = serde_json::to_string(&product).unwrap();
        let back: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(back, product);
        assert_eq!(back.rating.to_string(), "4.5");
    }
}
