//! Cart Model

use serde::{Deserialize, Serialize};

use super::product::Product;

/// Supplementary document bundle selection for a cart line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CartOptions {
    pub ieee: bool,
    pub pptx: bool,
}

/// One cart line: a product snapshot plus the requested quantity.
///
/// Session-only; folded into an order at checkout or discarded. The product
/// fields are flattened so a persisted order line keeps the product's
/// document shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
    pub options: Option<CartOptions>,
}

impl CartItem {
    /// Line total in whole BDT.
    pub fn line_total(&self) -> i64 {
        self.product.price * i64::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AdjustmentType;
    use rust_decimal::Decimal;

    fn sample_product(price: i64) -> Product {
        Product {
            id: "proj-x".to_string(),
            name: "Weather Station".to_string(),
            description: String::new(),
            category: "ESP32 PROJECTS".to_string(),
            price,
            original_price: None,
            discount: None,
            adjustment_type: AdjustmentType::None,
            adjustment_amount: 0,
            reference: "ESP-1000".to_string(),
            rating: Decimal::from(5),
            review_count: 0,
            in_stock: true,
            specs: vec![],
            image: None,
            video: None,
        }
    }

    #[test]
    fn test_line_total() {
        let item = CartItem {
            product: sample_product(1299),
            quantity: 2,
            options: None,
        };
        assert_eq!(item.line_total(), 2598);
    }

    #[test]
    fn test_flattened_document_shape() {
        let item = CartItem {
            product: sample_product(500),
            quantity: 1,
            options: Some(CartOptions {
                ieee: true,
                pptx: false,
            }),
        };
        let value = serde_json::to_value(&item).unwrap();
        // Product fields sit at the top level of the line, not nested.
        assert_eq!(value["price"], 500);
        assert_eq!(value["quantity"], 1);
        assert_eq!(value["options"]["ieee"], true);
    }
}
