//! Product and ingredient endpoints.

use std::sync::Arc;

use maoyang_core::forms::ProductDraft;
use maoyang_core::{Ingredient, Product, ProductId};
use reqwest::Method;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::{AdminClient, ApiError, Results};

#[derive(Deserialize)]
struct ProductNameResponse {
    product: String,
}

impl AdminClient {
    /// Every product, hidden ones included.
    ///
    /// Not cached: stock changes with every storefront order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip_all)]
    pub async fn products(&self, token: &SecretString) -> Result<Vec<Product>, ApiError> {
        let response: Results<Product> = self
            .execute(self.authed(Method::GET, "/admin/products/list", token))
            .await?;
        Ok(response.results)
    }

    /// One product from the admin list.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] if there is no such product.
    pub async fn product(&self, token: &SecretString, id: ProductId) -> Result<Product, ApiError> {
        self.products(token)
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("product {id}")))
    }

    /// Ingredient list of one product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn product_ingredients(
        &self,
        token: &SecretString,
        id: ProductId,
    ) -> Result<Vec<Ingredient>, ApiError> {
        let path = format!("/products/{id}/ingredients");
        self.execute(self.authed(Method::GET, &path, token)).await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, draft), fields(name = %draft.name))]
    pub async fn add_product(&self, token: &SecretString, draft: &ProductDraft) -> Result<(), ApiError> {
        let request = self.authed(Method::POST, "/products/add", token).json(draft);
        self.execute_empty(request).await?;
        tracing::info!("Product added");
        Ok(())
    }

    /// Replace a product's fields, visibility and ingredients.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, draft))]
    pub async fn update_product(
        &self,
        token: &SecretString,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<(), ApiError> {
        let path = format!("/products/update/{id}");
        let request = self.authed(Method::PUT, &path, token).json(draft);
        self.execute_empty(request).await?;
        tracing::info!("Product updated");
        Ok(())
    }

    /// Display name of a product, hidden or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn product_name(&self, token: &SecretString, id: ProductId) -> Result<String, ApiError> {
        let path = format!("/products/name/{id}");
        let response: ProductNameResponse = self.execute(self.authed(Method::GET, &path, token)).await?;
        Ok(response.product)
    }

    /// All ingredients.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip_all)]
    pub async fn ingredients(&self, token: &SecretString) -> Result<Arc<Vec<Ingredient>>, ApiError> {
        if let Some(CacheValue::Ingredients(ingredients)) =
            self.inner.cache.get(&CacheKey::Ingredients).await
        {
            debug!("Cache hit for ingredients");
            return Ok(ingredients);
        }

        let ingredients: Arc<Vec<Ingredient>> =
            Arc::new(self.execute(self.authed(Method::GET, "/ingredients", token)).await?);
        self.inner
            .cache
            .insert(CacheKey::Ingredients, CacheValue::Ingredients(Arc::clone(&ingredients)))
            .await;
        Ok(ingredients)
    }

    /// Add an ingredient. The name must already be trimmed and non-empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn add_ingredient(&self, token: &SecretString, name: &str) -> Result<(), ApiError> {
        let request = self
            .authed(Method::POST, "/ingredients/add", token)
            .json(&json!({ "name": name }));
        self.execute_empty(request).await?;
        self.inner.cache.invalidate(&CacheKey::Ingredients).await;
        Ok(())
    }
}
