//! Product, ingredient and recommendation endpoints.

use std::sync::Arc;

use maoyang_core::recommend::ids_param;
use maoyang_core::{AssociationRule, Ingredient, MemberId, Product, ProductId};
use reqwest::Method;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::{ApiError, BackendClient, Results};

/// Which association rules to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    /// Rules mined from this member's own orders.
    Member,
    /// Rules mined from every order.
    All,
}

impl RuleScope {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Member => "/api/association",
            Self::All => "/api/association-all",
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RulesResponse {
    #[serde(default)]
    association_rules: Vec<AssociationRule>,
}

impl BackendClient {
    /// Visible catalog as seen by `member`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn products(
        &self,
        token: &SecretString,
        member: MemberId,
    ) -> Result<Vec<Product>, ApiError> {
        let request = self
            .authed(Method::GET, "/products/list", token)
            .query(&[("memberId", member.as_i32())]);
        let response: Results<Product> = self.execute(request).await?;
        Ok(response.results)
    }

    /// One product from the member's catalog.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] if the catalog has no such product.
    #[instrument(skip(self, token))]
    pub async fn product(
        &self,
        token: &SecretString,
        member: MemberId,
        id: ProductId,
    ) -> Result<Product, ApiError> {
        self.products(token, member)
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("product {id}")))
    }

    /// Full-text product search.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn search_products(
        &self,
        token: &SecretString,
        query: &str,
    ) -> Result<Vec<Product>, ApiError> {
        let request = self
            .authed(Method::GET, "/products/query", token)
            .query(&[("query", query)]);
        let response: Results<Product> = self.execute(request).await?;
        Ok(response.results)
    }

    /// Every product including hidden ones, for naming order lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip_all)]
    pub async fn order_catalog(&self, token: &SecretString) -> Result<Arc<Vec<Product>>, ApiError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::OrderCatalog).await
        {
            debug!("Cache hit for order catalog");
            return Ok(products);
        }

        let response: Results<Product> = self
            .execute(self.authed(Method::GET, "/products/order/list", token))
            .await?;
        let products = Arc::new(response.results);

        self.inner
            .cache
            .insert(CacheKey::OrderCatalog, CacheValue::Products(Arc::clone(&products)))
            .await;
        Ok(products)
    }

    /// Ingredients of one product.
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

    /// All ingredients known to the shop.
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

        let ingredients: Arc<Vec<Ingredient>> = Arc::new(
            self.execute(self.authed(Method::GET, "/ingredients", token))
                .await?,
        );

        self.inner
            .cache
            .insert(CacheKey::Ingredients, CacheValue::Ingredients(Arc::clone(&ingredients)))
            .await;
        Ok(ingredients)
    }

    /// Products by id, in one request. An empty id list makes no request.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn recommended_products(
        &self,
        token: &SecretString,
        ids: &[ProductId],
    ) -> Result<Vec<Product>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let request = self
            .authed(Method::GET, "/products/recommendation", token)
            .query(&[("ids", ids_param(ids))]);
        let response: Results<Product> = self.execute(request).await?;
        Ok(response.results)
    }

    /// Products sharing ingredients with the member's favourites.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn similar_products(
        &self,
        token: &SecretString,
        member: MemberId,
    ) -> Result<Vec<Product>, ApiError> {
        let request = self
            .authed(Method::GET, "/products/similar", token)
            .query(&[("memberId", member.as_i32())]);
        let response: Results<Product> = self.execute(request).await?;
        Ok(response.results)
    }

    /// Association rules for `member`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn association_rules(
        &self,
        token: &SecretString,
        member: MemberId,
        scope: RuleScope,
    ) -> Result<Vec<AssociationRule>, ApiError> {
        let path = format!("{}/{member}", scope.prefix());
        let response: RulesResponse = self.execute(self.authed(Method::GET, &path, token)).await?;
        Ok(response.association_rules)
    }
}
