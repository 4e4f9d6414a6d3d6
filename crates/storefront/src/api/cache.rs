//! Cache types for backend responses.

use std::sync::Arc;

use maoyang_core::{Ingredient, Product};

/// Cache key for slow-changing lists.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    /// `/products/order/list`, used for names and images.
    OrderCatalog,
    /// `/ingredients`
    Ingredients,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Arc<Vec<Product>>),
    Ingredients(Arc<Vec<Ingredient>>),
}
