//! Cart Aggregate
//!
//! One cart per session, one writer. Mutations are synchronous and the
//! engine trusts its caller on stock checks: a product with zero available
//! quantity must be rejected at the presentation boundary before it gets
//! here.

use crate::domain::aggregates::product::Product;
use crate::domain::value_objects::{Money, CURRENCY};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product snapshot frozen at add-time plus a mutable quantity.
/// Later edits to the source product do not reach lines already in a cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub price: Money,
    pub image: String,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> Money { self.price.multiply(self.quantity) }
}

/// Mapping from product identity to cart line. Insertion order is kept for
/// display; correctness does not depend on it.
#[derive(Clone, Debug, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self { Self { lines: vec![] } }

    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn line_count(&self) -> usize { self.lines.len() }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }

    pub fn line(&self, product_id: Uuid) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Increments the line for this product by one, or inserts a fresh
    /// quantity-1 line snapshotting the product's displayable fields.
    pub fn add_to_cart(&mut self, product: &Product) {
        if let Some(existing) = self.lines.iter_mut().find(|l| l.product_id == product.id()) {
            existing.quantity += 1;
        } else {
            self.lines.push(CartLine {
                product_id: product.id(),
                name: product.name().to_string(),
                price: product.price().clone(),
                image: product.image().to_string(),
                quantity: 1,
            });
        }
    }

    /// Deletes the line if present; a missing line is a no-op, not an error.
    pub fn remove_from_cart(&mut self, product_id: Uuid) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Sets (not increments) the line's quantity. Zero removes the line; a
    /// zero-quantity line is never kept.
    pub fn update_quantity(&mut self, product_id: Uuid, quantity: u32) {
        if quantity == 0 {
            self.remove_from_cart(product_id);
        } else if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity;
        }
    }

    /// Sum of `price * quantity` over all lines. Recomputed on every read;
    /// prices are add-time snapshots so there is no live re-pricing to cache.
    pub fn total(&self) -> Money {
        self.lines.iter().fold(Money::zero(CURRENCY), |acc, l| {
            acc.add(&l.line_total()).unwrap_or(acc)
        })
    }

    pub fn clear(&mut self) { self.lines.clear(); }

    /// Rebuilds a cart from lines the client held, e.g. at checkout.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            if line.quantity == 0 { continue; }
            match cart.lines.iter_mut().find(|l| l.product_id == line.product_id) {
                Some(existing) => existing.quantity += line.quantity,
                None => cart.lines.push(line),
            }
        }
        cart
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::{Category, Condition, Seller, SellerKind};
    use rust_decimal::Decimal;

    fn product(name: &str, cents: i64) -> Product {
        Product::create(name, "desc", Money::usd(Decimal::new(cents, 2)),
                        Category::Books, Some(Condition::Good), "/img.jpg", 10,
                        Seller { id: Uuid::new_v4(), name: "sam".into(), kind: SellerKind::Student })
    }

    #[test]
    fn test_repeated_add_merges_quantity() {
        let p = product("Calculus", 1000);
        let mut cart = Cart::new();
        for _ in 0..4 { cart.add_to_cart(&p); }
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.line(p.id()).unwrap().quantity, 4);
    }

    #[test]
    fn test_update_quantity_sets_not_increments() {
        let p = product("Calculus", 1000);
        let mut cart = Cart::new();
        cart.add_to_cart(&p);
        cart.update_quantity(p.id(), 7);
        assert_eq!(cart.line(p.id()).unwrap().quantity, 7);
    }

    #[test]
    fn test_update_quantity_zero_removes_line() {
        let p = product("Calculus", 1000);
        let mut cart = Cart::new();
        cart.add_to_cart(&p);
        cart.update_quantity(p.id(), 0);
        assert!(cart.line(p.id()).is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new();
        cart.remove_from_cart(Uuid::new_v4());
        cart.update_quantity(Uuid::new_v4(), 3);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_sums_all_lines() {
        let a = product("Notebook", 250);
        let b = product("Lamp", 1599);
        let mut cart = Cart::new();
        cart.add_to_cart(&a);
        cart.add_to_cart(&a);
        cart.add_to_cart(&b);
        // 2 * 2.50 + 15.99
        assert_eq!(cart.total().amount(), Decimal::new(2099, 2));
    }

    #[test]
    fn test_line_is_snapshot_of_product() {
        let mut p = product("Jacket", 4500);
        let mut cart = Cart::new();
        cart.add_to_cart(&p);
        p.update_details("Jacket", "desc", Money::usd(Decimal::new(9900, 2)),
                         Category::Clothing, None, "/img.jpg", 10);
        assert_eq!(cart.total().amount(), Decimal::new(4500, 2));
    }

    #[test]
    fn test_from_lines_merges_and_drops_zero() {
        let id = Uuid::new_v4();
        let line = |qty| CartLine { product_id: id, name: "x".into(), price: Money::usd(Decimal::ONE), image: String::new(), quantity: qty };
        let cart = Cart::from_lines(vec![line(2), line(0), line(3)]);
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.line(id).unwrap().quantity, 5);
    }
}
