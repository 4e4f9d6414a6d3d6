//! Cache keys and values for the admin client.

use std::sync::Arc;

use maoyang_core::Ingredient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) enum CacheKey {
    /// `GET /ingredients`
    Ingredients,
}

#[derive(Clone)]
pub(super) enum CacheValue {
    Ingredients(Arc<Vec<Ingredient>>),
}
