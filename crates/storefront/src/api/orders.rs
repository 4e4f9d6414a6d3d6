//! Order endpoints.

use maoyang_core::{CheckoutPlan, MemberId, OrderLine};
use reqwest::Method;
use secrecy::SecretString;
use tracing::instrument;

use super::{ApiError, BackendClient, Results};

impl BackendClient {
    /// Order rows, for one member or for the whole shop.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn orders(
        &self,
        token: &SecretString,
        member: Option<MemberId>,
    ) -> Result<Vec<OrderLine>, ApiError> {
        let mut request = self.authed(Method::GET, "/orders/list", token);
        if let Some(member) = member {
            request = request.query(&[("userId", member.as_i32())]);
        }
        let response: Results<OrderLine> = self.execute(request).await?;
        Ok(response.results)
    }

    /// Send every row of a checkout plan, each followed by its stock update.
    ///
    /// Stops at the first failure. Rows already sent stay placed; there is no
    /// rollback endpoint.
    ///
    /// # Errors
    ///
    /// Returns the first API error encountered.
    #[instrument(skip(self, token, plan), fields(order_number = %plan.order_number, lines = plan.steps.len()))]
    pub async fn place_order(&self, token: &SecretString, plan: &CheckoutPlan) -> Result<(), ApiError> {
        for (line, stock) in &plan.steps {
            let create = self.authed(Method::POST, "/orders/create", token).json(line);
            self.execute_empty(create).await?;

            let path = format!("/products/update-stock/{}", stock.product_id);
            let update = self.authed(Method::PUT, &path, token).json(stock);
            self.execute_empty(update).await?;
        }
        tracing::info!(total = %plan.total(), "Order placed");
        Ok(())
    }
}
