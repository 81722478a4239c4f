//! Cart aggregate: line identity and totals recomputation.
//!
//! A cart line is identified by the (product, size, color) tuple. Every
//! mutation recomputes the denormalized `total_items` and `total_price`
//! before the cart is persisted, so the invariants
//! `total_items == Σ quantity` and `total_price == Σ price × quantity`
//! hold after any sequence of operations.

use serde::{Deserialize, Serialize};

use crate::types::{Money, ProductId};

/// One line in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    /// Product name, denormalized at add time.
    pub name: String,
    /// Unit price, denormalized at add time.
    pub price: Money,
    pub quantity: u32,
    pub size: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CartLine {
    /// Price × quantity for this line.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }

    fn matches(&self, key: &LineKey<'_>) -> bool {
        self.product_id == key.product_id && self.size == key.size && self.color == key.color
    }
}

/// Identity of a cart line: the (product, size, color) tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineKey<'a> {
    pub product_id: ProductId,
    pub size: &'a str,
    pub color: &'a str,
}

/// A user's cart with denormalized totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartLine>,
    pub total_items: u32,
    pub total_price: Money,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rebuild a cart from stored lines, recomputing totals.
    #[must_use]
    pub fn from_items(items: Vec<CartLine>) -> Self {
        let mut cart = Self {
            items,
            total_items: 0,
            total_price: Money::ZERO,
        };
        cart.recompute();
        cart
    }

    /// Add a line. If a line with the same (product, size, color) identity
    /// already exists, its quantity is incremented instead of creating a
    /// duplicate row.
    pub fn add(&mut self, line: CartLine) {
        let key = LineKey {
            product_id: line.product_id,
            size: &line.size,
            color: &line.color,
        };
        if let Some(existing) = self.items.iter_mut().find(|l| l.matches(&key)) {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
        } else {
            self.items.push(line);
        }
        self.recompute();
    }

    /// Set the quantity of a line. A quantity of zero (the API layer also
    /// maps negative inputs to zero) removes the line rather than persisting
    /// an empty row.
    ///
    /// Returns `false` if no line matched the key.
    pub fn update_quantity(&mut self, key: &LineKey<'_>, quantity: u32) -> bool {
        let Some(pos) = self.items.iter().position(|l| l.matches(key)) else {
            return false;
        };
        if quantity == 0 {
            self.items.remove(pos);
        } else if let Some(line) = self.items.get_mut(pos) {
            line.quantity = quantity;
        }
        self.recompute();
        true
    }

    /// Remove a line. Returns `false` if no line matched the key.
    pub fn remove(&mut self, key: &LineKey<'_>) -> bool {
        let before = self.items.len();
        self.items.retain(|l| !l.matches(key));
        let removed = self.items.len() != before;
        if removed {
            self.recompute();
        }
        removed
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.recompute();
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Recompute the denormalized totals from the line items.
    fn recompute(&mut self) {
        self.total_items = self.items.iter().map(|l| l.quantity).sum();
        self.total_price = self.items.iter().map(CartLine::line_total).sum();
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn line(product: i32, size: &str, color: &str, quantity: u32, price: i64) -> CartLine {
        CartLine {
            product_id: ProductId::new(product),
            name: format!("product-{product}"),
            price: Money::new(Decimal::from(price)),
            quantity,
            size: size.to_owned(),
            color: color.to_owned(),
            image_url: None,
        }
    }

    fn assert_totals_consistent(cart: &Cart) {
        let items: u32 = cart.items.iter().map(|l| l.quantity).sum();
        let price: Money = cart.items.iter().map(CartLine::line_total).sum();
        assert_eq!(cart.total_items, items);
        assert_eq!(cart.total_price, price);
    }

    #[test]
    fn test_add_same_tuple_increments_quantity() {
        // P1/M/Black qty:1 @1000, then P1/M/Black qty:2 -> one line, qty 3,
        // total 3000
        let mut cart = Cart::empty();
        cart.add(line(1, "M", "Black", 1, 1000));
        cart.add(line(1, "M", "Black", 2, 1000));

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items.first().map(|l| l.quantity), Some(3));
        assert_eq!(cart.total_items, 3);
        assert_eq!(cart.total_price, Money::new(Decimal::from(3000)));
        assert_totals_consistent(&cart);
    }

    #[test]
    fn test_different_size_or_color_is_a_new_line() {
        let mut cart = Cart::empty();
        cart.add(line(1, "M", "Black", 1, 1000));
        cart.add(line(1, "L", "Black", 1, 1000));
        cart.add(line(1, "M", "White", 1, 1000));

        assert_eq!(cart.items.len(), 3);
        assert_eq!(cart.total_items, 3);
        assert_totals_consistent(&cart);
    }

    #[test]
    fn test_update_quantity_zero_removes_line() {
        let mut cart = Cart::empty();
        cart.add(line(1, "M", "Black", 2, 500));

        let key = LineKey {
            product_id: ProductId::new(1),
            size: "M",
            color: "Black",
        };
        assert!(cart.update_quantity(&key, 0));
        assert!(cart.is_empty());
        assert_eq!(cart.total_items, 0);
        assert_eq!(cart.total_price, Money::ZERO);
    }

    #[test]
    fn test_update_quantity_sets_and_recomputes() {
        let mut cart = Cart::empty();
        cart.add(line(1, "M", "Black", 2, 500));
        cart.add(line(2, "S", "White", 1, 300));

        let key = LineKey {
            product_id: ProductId::new(1),
            size: "M",
            color: "Black",
        };
        assert!(cart.update_quantity(&key, 5));
        assert_eq!(cart.total_items, 6);
        assert_eq!(cart.total_price, Money::new(Decimal::from(2800)));
        assert_totals_consistent(&cart);
    }

    #[test]
    fn test_update_unknown_line_returns_false() {
        let mut cart = Cart::empty();
        cart.add(line(1, "M", "Black", 1, 100));

        let key = LineKey {
            product_id: ProductId::new(9),
            size: "M",
            color: "Black",
        };
        assert!(!cart.update_quantity(&key, 2));
        assert_eq!(cart.total_items, 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::empty();
        cart.add(line(1, "M", "Black", 2, 500));
        cart.add(line(2, "S", "White", 1, 300));

        let key = LineKey {
            product_id: ProductId::new(1),
            size: "M",
            color: "Black",
        };
        assert!(cart.remove(&key));
        assert!(!cart.remove(&key));
        assert_eq!(cart.items.len(), 1);
        assert_totals_consistent(&cart);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_price, Money::ZERO);
    }

    #[test]
    fn test_from_items_recomputes_totals() {
        let cart = Cart::from_items(vec![
            line(1, "M", "Black", 2, 500),
            line(2, "S", "White", 3, 100),
        ]);
        assert_eq!(cart.total_items, 5);
        assert_eq!(cart.total_price, Money::new(Decimal::from(1300)));
    }
}
