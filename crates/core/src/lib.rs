//! Maoyang Core - shared domain library.
//!
//! Used by every Maoyang component:
//! - `storefront` - member-facing shop
//! - `admin` - back-office console
//! - `cli` - operator tooling
//!
//! # Architecture
//!
//! All records are owned by the remote backend. This crate holds the little
//! logic the clients run on their own: the session cart, grouping order rows
//! into orders, sales ranking, association-rule parsing, checkout planning and
//! form validation. It performs no I/O.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, emails and order statuses
//! - [`records`] - Backend records (products, members, orders, ...)
//! - [`orders`] - Order-row grouping and filtering
//! - [`sales`] - Sales counts and top sellers
//! - [`recommend`] - Association rules
//! - [`cart`] - Session cart
//! - [`checkout`] - Order numbers and order payloads
//! - [`forms`] - Form validation and request bodies

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod forms;
pub mod orders;
pub mod recommend;
pub mod records;
pub mod sales;
pub mod types;

pub use cart::{Cart, CartError, CartLine, CartProduct, QuantitySelector};
pub use checkout::{CheckoutError, CheckoutPlan, NewOrderLine, OrderNumber, StockUpdate};
pub use orders::{OrderFilter, OrderItemSummary, OrderSummary, group_order_lines, lines_for_member};
pub use recommend::{AssociationRule, recommend_for, related_product_ids};
pub use records::{Ingredient, Member, Notification, OrderLine, Product, unread_count};
pub use sales::{RankedProduct, sales_counts, top_sellers, with_sales};
pub use types::*;
