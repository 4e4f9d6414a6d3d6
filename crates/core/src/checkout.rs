//! Turning a cart into the backend calls that place an order.
//!
//! The backend has no "place order" endpoint. An order is a set of
//! `/orders/create` rows sharing an order number, each followed by a stock
//! update for that product. [`CheckoutPlan`] computes those payloads up front
//! so the HTTP layer only has to send them.

use core::fmt;

use chrono::Utc;
use rand::Rng;
use serde::Serialize;

use crate::cart::{Cart, CartLine};
use crate::records::Member;
use crate::types::{MemberId, OrderStatus, Price, ProductId};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("the cart is empty")]
    EmptyCart,
    #[error("add a delivery address to your profile before ordering")]
    MissingAddress,
    #[error("{name} is out of stock")]
    OutOfStock { name: String },
}

/// Order number shared by every row of one order: `{unix_millis}-{0..999}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// A fresh order number for the current instant.
    #[must_use]
    pub fn generate() -> Self {
        let suffix = rand::rng().random_range(0..1000);
        Self::from_parts(Utc::now().timestamp_millis(), suffix)
    }

    #[must_use]
    pub fn from_parts(unix_millis: i64, suffix: u32) -> Self {
        Self(format!("{unix_millis}-{suffix}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of `POST /orders/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderLine {
    pub order_number: OrderNumber,
    pub user_id: MemberId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub total_price: Price,
    pub status: OrderStatus,
}

/// Body of `PUT /products/update-stock/{id}`: the stock left after the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockUpdate {
    #[serde(skip)]
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Everything to send for one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPlan {
    pub order_number: OrderNumber,
    /// Order rows paired with the stock update that follows each.
    pub steps: Vec<(NewOrderLine, StockUpdate)>,
}

impl CheckoutPlan {
    /// Plan an order for every line in `cart`.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::MissingAddress`] when `member` has no address and
    /// [`CheckoutError::EmptyCart`] for an empty cart.
    pub fn from_cart(
        cart: &Cart,
        member: &Member,
        order_number: OrderNumber,
    ) -> Result<Self, CheckoutError> {
        Self::build(cart.lines(), member, order_number)
    }

    /// Plan a buy-now order for a single line.
    ///
    /// # Errors
    ///
    /// As [`CheckoutPlan::from_cart`], plus [`CheckoutError::OutOfStock`]
    /// when the product has no stock.
    pub fn single(
        line: &CartLine,
        member: &Member,
        order_number: OrderNumber,
    ) -> Result<Self, CheckoutError> {
        if line.product.quantity_in_stock == 0 {
            return Err(CheckoutError::OutOfStock {
                name: line.product.name.clone(),
            });
        }
        Self::build(core::slice::from_ref(line), member, order_number)
    }

    fn build(
        lines: &[CartLine],
        member: &Member,
        order_number: OrderNumber,
    ) -> Result<Self, CheckoutError> {
        if !member.has_address() {
            return Err(CheckoutError::MissingAddress);
        }
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let steps = lines
            .iter()
            .map(|line| {
                let order = NewOrderLine {
                    order_number: order_number.clone(),
                    user_id: member.id,
                    product_id: line.product.id,
                    quantity: line.quantity,
                    total_price: line.line_total(),
                    status: OrderStatus::Pending,
                };
                let stock = StockUpdate {
                    product_id: line.product.id,
                    quantity: line.product.quantity_in_stock.saturating_sub(line.quantity),
                };
                (order, stock)
            })
            .collect();

        Ok(Self {
            order_number,
            steps,
        })
    }

    /// Sum of all order rows.
    #[must_use]
    pub fn total(&self) -> Price {
        self.steps.iter().map(|(order, _)| order.total_price).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::cart::CartProduct;
    use serde_json::json;

    fn member(address: Option<&str>) -> Member {
        serde_json::from_value(json!({ "id": 7, "address": address })).unwrap()
    }

    fn cart_product(id: i32, stock: u32) -> CartProduct {
        CartProduct {
            id: ProductId::new(id),
            name: format!("drink {id}"),
            price: Price::from_satang(4_500),
            quantity_in_stock: stock,
            image_url: None,
        }
    }

    #[test]
    fn test_order_number_shape() {
        let n = OrderNumber::generate();
        let (millis, suffix) = n.as_str().split_once('-').unwrap();
        assert!(millis.parse::<i64>().unwrap() > 0);
        assert!(suffix.parse::<u32>().unwrap() < 1000);
        assert_eq!(OrderNumber::from_parts(1_700_000_000_000, 42).to_string(), "1700000000000-42");
    }

    #[test]
    fn test_plan_shares_one_order_number() {
        let mut cart = Cart::new();
        cart.add(cart_product(1, 10), 2).unwrap();
        cart.add(cart_product(2, 5), 5).unwrap();

        let plan = CheckoutPlan::from_cart(&cart, &member(Some("Bangkok")), OrderNumber::from_parts(1, 1)).unwrap();

        assert_eq!(plan.steps.len(), 2);
        assert!(plan.steps.iter().all(|(o, _)| o.order_number.as_str() == "1-1"));
        assert_eq!(plan.steps[0].0.total_price, Price::from_satang(9_000));
        assert_eq!(plan.steps[0].1.quantity, 8);
        assert_eq!(plan.steps[1].1.quantity, 0);
        assert_eq!(plan.total(), Price::from_satang(31_500));
    }

    #[test]
    fn test_plan_requires_address_then_items() {
        let cart = Cart::new();
        assert_eq!(
            CheckoutPlan::from_cart(&cart, &member(None), OrderNumber::from_parts(1, 1)),
            Err(CheckoutError::MissingAddress)
        );
        assert_eq!(
            CheckoutPlan::from_cart(&cart, &member(Some("x")), OrderNumber::from_parts(1, 1)),
            Err(CheckoutError::EmptyCart)
        );
    }

    #[test]
    fn test_single_rejects_out_of_stock() {
        let line = CartLine { product: cart_product(3, 0), quantity: 1 };
        assert!(matches!(
            CheckoutPlan::single(&line, &member(Some("x")), OrderNumber::from_parts(1, 1)),
            Err(CheckoutError::OutOfStock { .. })
        ));
    }

    #[test]
    fn test_payload_shapes() {
        let line = CartLine { product: cart_product(3, 4), quantity: 1 };
        let plan = CheckoutPlan::single(&line, &member(Some("x")), OrderNumber::from_parts(5, 6)).unwrap();
        let (order, stock) = &plan.steps[0];

        assert_eq!(
            serde_json::to_value(order).unwrap(),
            json!({
                "orderNumber": "5-6",
                "userId": 7,
                "productId": 3,
                "quantity": 1,
                "totalPrice": "45.00",
                "status": "pending"
            })
        );
        assert_eq!(serde_json::to_value(stock).unwrap(), json!({ "quantity": 3 }));
    }
}
