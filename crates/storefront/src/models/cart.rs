//! Session-resident shopping cart.
//!
//! The cart holds product references and quantities only. Prices are never
//! stored in the session: they are re-read from the catalog every time the
//! cart is rendered and again at checkout, so a price change between adding
//! and paying is always reflected.

use serde::{Deserialize, Serialize};

use coralcart_core::ProductId;

/// Maximum quantity per line. Anything above is clamped.
const MAX_LINE_QUANTITY: u32 = 99;

/// One cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// The shopping cart, stored in the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Add a quantity of a product, merging with an existing line.
    pub fn add(&mut self, product_id: ProductId, quantity: u32) {
        let quantity = quantity.clamp(1, MAX_LINE_QUANTITY);
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = (line.quantity + quantity).min(MAX_LINE_QUANTITY);
        } else {
            self.lines.push(CartLine {
                product_id,
                quantity,
            });
        }
    }

    /// Set the quantity of a line. Zero removes the line.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }
        let quantity = quantity.min(MAX_LINE_QUANTITY);
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity;
        }
    }

    /// Remove a line.
    pub fn remove(&mut self, product_id: ProductId) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Drop lines whose product no longer exists in the catalog.
    pub fn retain_products(&mut self, available: &[ProductId]) {
        self.lines.retain(|l| available.contains(&l.product_id));
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Empty the cart (after a successful checkout).
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_merges_lines() {
        let mut cart = Cart::default();
        cart.add(ProductId::new(1), 2);
        cart.add(ProductId::new(1), 3);
        cart.add(ProductId::new(2), 1);

        assert_eq!(cart.lines.len(), 2);
        assert_eq!(cart.item_count(), 6);
    }

    #[test]
    fn test_add_clamps_quantity() {
        let mut cart = Cart::default();
        cart.add(ProductId::new(1), 500);
        assert_eq!(cart.item_count(), MAX_LINE_QUANTITY);

        cart.add(ProductId::new(1), 1);
        assert_eq!(cart.item_count(), MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = Cart::default();
        cart.add(ProductId::new(1), 2);
        cart.set_quantity(ProductId::new(1), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_ignores_unknown_product() {
        let mut cart = Cart::default();
        cart.set_quantity(ProductId::new(9), 5);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::default();
        cart.add(ProductId::new(1), 1);
        cart.add(ProductId::new(2), 1);
        cart.remove(ProductId::new(1));
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines.first().map(|l| l.product_id), Some(ProductId::new(2)));
    }

    #[test]
    fn test_retain_products_drops_missing() {
        let mut cart = Cart::default();
        cart.add(ProductId::new(1), 1);
        cart.add(ProductId::new(2), 1);
        cart.retain_products(&[ProductId::new(2)]);
        assert_eq!(cart.lines.len(), 1);
    }
}
