//! Sales counts per product, derived from order rows.

use std::collections::HashMap;

use crate::records::{OrderLine, Product};
use crate::types::ProductId;

/// Units sold per product across `lines`.
#[must_use]
pub fn sales_counts(lines: &[OrderLine]) -> HashMap<ProductId, u32> {
    let mut counts: HashMap<ProductId, u32> = HashMap::new();
    for line in lines {
        let entry = counts.entry(line.product_id).or_default();
        *entry = entry.saturating_add(line.quantity);
    }
    counts
}

/// A catalog product annotated with how many units have sold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedProduct {
    pub product: Product,
    pub sales_count: u32,
}

/// Attach sales counts to `products`, sorted by product id.
#[must_use]
pub fn with_sales(products: Vec<Product>, counts: &HashMap<ProductId, u32>) -> Vec<RankedProduct> {
    let mut ranked: Vec<RankedProduct> = products
        .into_iter()
        .map(|product| {
            let sales_count = counts.get(&product.id).copied().unwrap_or(0);
            RankedProduct {
                product,
                sales_count,
            }
        })
        .collect();
    ranked.sort_by_key(|r| r.product.id);
    ranked
}

/// Every product tied for the highest sales count.
///
/// Returns nothing when no product has sold a single unit, so a fresh shop
/// does not advertise its whole catalog as best sellers.
#[must_use]
pub fn top_sellers(ranked: &[RankedProduct]) -> Vec<RankedProduct> {
    let Some(max) = ranked.iter().map(|r| r.sales_count).max() else {
        return Vec::new();
    };
    if max == 0 {
        return Vec::new();
    }
    ranked
        .iter()
        .filter(|r| r.sales_count == max)
        .cloned()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lines() -> Vec<OrderLine> {
        serde_json::from_value(json!([
            { "orderNumber": "a", "userId": 1, "packageId": 2, "quantity": 3 },
            { "orderNumber": "a", "userId": 1, "packageId": 1, "quantity": 1 },
            { "orderNumber": "b", "userId": 2, "productId": 1, "quantity": 2 },
        ]))
        .unwrap()
    }

    fn products() -> Vec<Product> {
        serde_json::from_value(json!([
            { "id": 3, "name": "Butterfly pea" },
            { "id": 1, "name": "Lemongrass" },
            { "id": 2, "name": "Tamarind" },
        ]))
        .unwrap()
    }

    #[test]
    fn test_sales_counts_sum_quantities() {
        let counts = sales_counts(&lines());
        assert_eq!(counts[&ProductId::new(1)], 3);
        assert_eq!(counts[&ProductId::new(2)], 3);
        assert!(!counts.contains_key(&ProductId::new(3)));
    }

    #[test]
    fn test_with_sales_sorts_by_id_and_defaults_to_zero() {
        let ranked = with_sales(products(), &sales_counts(&lines()));
        let ids: Vec<i32> = ranked.iter().map(|r| r.product.id.as_i32()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(ranked[2].sales_count, 0);
    }

    #[test]
    fn test_top_sellers_keeps_ties() {
        let ranked = with_sales(products(), &sales_counts(&lines()));
        let top = top_sellers(&ranked);
        assert_eq!(top.len(), 2);
        assert!(top.iter().all(|r| r.sales_count == 3));
    }

    #[test]
    fn test_top_sellers_empty_without_sales() {
        let ranked = with_sales(products(), &HashMap::new());
        assert!(top_sellers(&ranked).is_empty());
        assert!(top_sellers(&[]).is_empty());
    }
}
