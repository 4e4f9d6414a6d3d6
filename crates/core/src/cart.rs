//! The shopping cart.
//!
//! The cart is the one piece of state this system owns. It lives in the
//! member's session and holds a snapshot of each product taken when it was
//! added, so the cart page can render without another catalog fetch. The
//! snapshot's stock goes stale; [`Cart::refresh_stock`] brings it up to date
//! before an order is planned.

use serde::{Deserialize, Serialize};

use crate::records::Product;
use crate::types::{Price, ProductId};

/// Why an item could not be added.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    #[error("{name} is out of stock")]
    OutOfStock { name: String },
}

/// What the cart remembers about a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity_in_stock: u32,
    pub image_url: Option<String>,
}

impl From<&Product> for CartProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity_in_stock: product.quantity_in_stock,
            image_url: product.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: CartProduct,
    pub quantity: u32,
}

impl CartLine {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// Ordered list of cart lines, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units of `product`.
    ///
    /// Adding a product already in the cart increases that line. The line
    /// never exceeds the stock known at the time of adding. Returns the
    /// quantity now in the cart for this product.
    ///
    /// # Errors
    ///
    /// [`CartError::ZeroQuantity`] for a zero quantity,
    /// [`CartError::OutOfStock`] when the product has no stock.
    pub fn add(&mut self, product: CartProduct, quantity: u32) -> Result<u32, CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }
        if product.quantity_in_stock == 0 {
            return Err(CartError::OutOfStock { name: product.name });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product.id) {
            let stock = product.quantity_in_stock;
            line.product = product;
            line.quantity = line.quantity.saturating_add(quantity).min(stock);
            return Ok(line.quantity);
        }

        let quantity = quantity.min(product.quantity_in_stock);
        self.lines.push(CartLine { product, quantity });
        Ok(quantity)
    }

    /// Bring every line up to date with the `current` catalog.
    ///
    /// Lines whose product is gone or sold out are dropped and the rest are
    /// cut down to the stock left. Returns whether any quantity changed.
    pub fn refresh_stock(&mut self, current: &[Product]) -> bool {
        let mut changed = false;
        self.lines.retain_mut(|line| {
            let Some(product) = current.iter().find(|p| p.id == line.product.id) else {
                changed = true;
                return false;
            };
            line.product.quantity_in_stock = product.quantity_in_stock;
            if line.quantity > product.quantity_in_stock {
                line.quantity = product.quantity_in_stock;
                changed = true;
            }
            line.quantity > 0
        });
        changed
    }

    /// Drop the line for `product_id`. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product.id != product_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

/// Quantity picker on the product page.
pub struct QuantitySelector;

impl QuantitySelector {
    /// Clamp a requested quantity into `1..=stock`. With no stock the result
    /// is 1 and the purchase itself is refused elsewhere.
    #[must_use]
    pub fn clamp(requested: u32, stock: u32) -> u32 {
        requested.clamp(1, stock.max(1))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn product(id: i32, price_satang: i64, stock: u32) -> CartProduct {
        CartProduct {
            id: ProductId::new(id),
            name: format!("drink {id}"),
            price: Price::from_satang(price_satang),
            quantity_in_stock: stock,
            image_url: None,
        }
    }

    #[test]
    fn test_add_merges_lines() {
        let mut cart = Cart::new();
        cart.add(product(1, 5_000, 10), 2).unwrap();
        cart.add(product(2, 3_000, 10), 1).unwrap();
        assert_eq!(cart.add(product(1, 5_000, 10), 3).unwrap(), 5);

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.item_count(), 6);
        assert_eq!(cart.total(), Price::from_satang(28_000));
    }

    #[test]
    fn test_add_clamps_to_stock() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(product(1, 100, 3), 5).unwrap(), 3);
        assert_eq!(cart.add(product(1, 100, 3), 1).unwrap(), 3);
    }

    #[test]
    fn test_add_rejects_zero_and_out_of_stock() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(product(1, 100, 3), 0), Err(CartError::ZeroQuantity));
        assert!(matches!(
            cart.add(product(2, 100, 0), 1),
            Err(CartError::OutOfStock { .. })
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add(product(1, 100, 3), 1).unwrap();
        cart.add(product(2, 100, 3), 1).unwrap();

        assert!(cart.remove(ProductId::new(1)));
        assert!(!cart.remove(ProductId::new(1)));
        assert_eq!(cart.lines()[0].product.id, ProductId::new(2));

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_session_round_trip_keeps_order() {
        let mut cart = Cart::new();
        cart.add(product(9, 100, 3), 1).unwrap();
        cart.add(product(4, 100, 3), 2).unwrap();
        let json = serde_json::to_value(&cart).unwrap();
        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }

    fn catalog_entry(id: i32, stock: u32) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": format!("drink {id}"),
            "price": 1,
            "quantityInStock": stock
        }))
        .unwrap()
    }

    #[test]
    fn test_refresh_stock_cuts_and_drops_lines() {
        let mut cart = Cart::new();
        cart.add(product(1, 100, 5), 3).unwrap();
        cart.add(product(2, 100, 5), 2).unwrap();
        cart.add(product(3, 100, 5), 1).unwrap();
        cart.add(product(4, 100, 5), 1).unwrap();

        let current = [catalog_entry(1, 1), catalog_entry(2, 0), catalog_entry(4, 9)];
        assert!(cart.refresh_stock(&current));

        let lines: Vec<_> = cart
            .lines()
            .iter()
            .map(|l| (l.product.id.as_i32(), l.quantity, l.product.quantity_in_stock))
            .collect();
        assert_eq!(lines, vec![(1, 1, 1), (4, 1, 9)]);
    }

    #[test]
    fn test_refresh_stock_with_enough_left_changes_nothing() {
        let mut cart = Cart::new();
        cart.add(product(1, 100, 5), 3).unwrap();
        assert!(!cart.refresh_stock(&[catalog_entry(1, 3)]));
        assert_eq!(cart.lines()[0].product.quantity_in_stock, 3);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_quantity_selector() {
        assert_eq!(QuantitySelector::clamp(0, 5), 1);
        assert_eq!(QuantitySelector::clamp(9, 5), 5);
        assert_eq!(QuantitySelector::clamp(3, 5), 3);
        assert_eq!(QuantitySelector::clamp(3, 0), 1);
    }
}
