//! Order endpoints and the admin order table.

use std::collections::{BTreeSet, HashMap};

use futures::future::join_all;
use maoyang_core::{
    MemberId, OrderFilter, OrderLine, OrderStatus, OrderSummary, ProductId, group_order_lines,
};
use reqwest::Method;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use super::{AdminClient, ApiError, Results};

#[derive(Deserialize)]
struct MemberNameResponse {
    name: String,
}

/// Grouped orders with the names needed to display them.
#[derive(Debug, Clone, Default)]
pub struct OrderTable {
    /// Orders with item names filled in (`"Unknown"` when lookup failed).
    pub orders: Vec<OrderSummary>,
    pub member_names: HashMap<MemberId, String>,
}

impl OrderTable {
    /// Display name for a member, `"Unknown"` when the lookup failed.
    #[must_use]
    pub fn member_name(&self, id: MemberId) -> &str {
        self.member_names.get(&id).map_or("Unknown", String::as_str)
    }
}

impl AdminClient {
    /// Order rows across all members.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip_all)]
    pub async fn orders(&self, token: &SecretString) -> Result<Vec<OrderLine>, ApiError> {
        let response: Results<OrderLine> = self
            .execute(self.authed(Method::GET, "/orders/list/admin", token))
            .await?;
        Ok(response.results)
    }

    /// Set the status of every row of an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn update_order_status(
        &self,
        token: &SecretString,
        order_number: &str,
        status: &OrderStatus,
    ) -> Result<(), ApiError> {
        let path = format!("/orders/{order_number}");
        let request = self
            .authed(Method::PUT, &path, token)
            .json(&json!({ "status": status.as_str() }));
        self.execute_empty(request).await
    }

    /// Display name of a member.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn member_name(&self, token: &SecretString, id: MemberId) -> Result<String, ApiError> {
        let path = format!("/member/name/{id}");
        let response: MemberNameResponse = self.execute(self.authed(Method::GET, &path, token)).await?;
        Ok(response.name)
    }

    /// Grouped, filtered orders with member and product names resolved.
    ///
    /// Names are fetched one request per distinct id, all at once. A failed
    /// lookup is logged and shows as "Unknown".
    ///
    /// # Errors
    ///
    /// Returns an error if the order list itself cannot be fetched.
    #[instrument(skip(self, token))]
    pub async fn order_table(
        &self,
        token: &SecretString,
        filter: &OrderFilter,
    ) -> Result<OrderTable, ApiError> {
        let lines = self.orders(token).await?;
        let mut orders = filter.apply(group_order_lines(&lines, &[]));

        let member_ids: BTreeSet<MemberId> = orders.iter().map(|o| o.user_id).collect();
        let product_ids: BTreeSet<ProductId> = orders
            .iter()
            .flat_map(|o| o.items.iter().map(|i| i.product_id))
            .collect();

        let (member_names, product_names) = futures::join!(
            self.member_names(token, &member_ids),
            self.product_names(token, &product_ids),
        );

        for order in &mut orders {
            order.apply_product_names(&product_names);
        }

        Ok(OrderTable {
            orders,
            member_names,
        })
    }

    async fn member_names(
        &self,
        token: &SecretString,
        ids: &BTreeSet<MemberId>,
    ) -> HashMap<MemberId, String> {
        let lookups = ids
            .iter()
            .map(|&id| async move { (id, self.member_name(token, id).await) });

        join_all(lookups)
            .await
            .into_iter()
            .filter_map(|(id, result)| match result {
                Ok(name) => Some((id, name)),
                Err(e) => {
                    tracing::warn!(member_id = %id, error = %e, "Member name lookup failed");
                    None
                }
            })
            .collect()
    }

    async fn product_names(
        &self,
        token: &SecretString,
        ids: &BTreeSet<ProductId>,
    ) -> HashMap<ProductId, String> {
        let lookups = ids
            .iter()
            .map(|&id| async move { (id, self.product_name(token, id).await) });

        join_all(lookups)
            .await
            .into_iter()
            .filter_map(|(id, result)| match result {
                Ok(name) => Some((id, name)),
                Err(e) => {
                    tracing::warn!(product_id = %id, error = %e, "Product name lookup failed");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_member_name() {
        let mut table = OrderTable::default();
        table.member_names.insert(MemberId::new(1), "Somchai".to_string());
        assert_eq!(table.member_name(MemberId::new(1)), "Somchai");
        assert_eq!(table.member_name(MemberId::new(2)), "Unknown");
    }
}
