//! Session Cart
//!
//! Lines merge on product id; totals are recomputed from the lines on every
//! read, never cached.

use shared::models::{CartItem, CartOptions, Product};

/// The active session's cart
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one unit of a product. An existing line for the same product id
    /// keeps its options and gains quantity; otherwise a new line is pushed.
    pub fn add(&mut self, product: Product, options: Option<CartOptions>) {
        if let Some(line) = self.items.iter_mut().find(|item| item.product.id == product.id) {
            line.quantity += 1;
        } else {
            self.items.push(CartItem {
                product,
                quantity: 1,
                options,
            });
        }
    }

    /// Set a line's quantity directly; zero removes the line.
    pub fn set_quantity(&mut self, product_id: &str, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }
        if let Some(line) = self.items.iter_mut().find(|item| item.product.id == product_id) {
            line.quantity = quantity;
        }
    }

    pub fn remove(&mut self, product_id: &str) {
        self.items.retain(|item| item.product.id != product_id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// `Σ price × quantity`, recomputed from current lines.
    pub fn total(&self) -> i64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total unit count across all lines.
    pub fn count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Owned copy of the lines, detached from the live cart.
    pub fn snapshot(&self) -> Vec<CartItem> {
        self.items.clone()
    }
}
