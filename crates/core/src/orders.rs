//! Grouping of flat order rows into per-order summaries.
//!
//! The backend returns one row per (order number, product). Every view that
//! lists orders (member history, the admin table, the CLI report) wants one
//! entry per order number with per-product rollups, so the reduction lives
//! here.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, FixedOffset, Offset, Utc};

use crate::records::{OrderLine, Product};
use crate::types::{MemberId, OrderStatus, Price, ProductId};

/// Shop time zone (Asia/Bangkok, UTC+7, no daylight saving).
#[must_use]
pub fn shop_offset() -> FixedOffset {
    FixedOffset::east_opt(SHOP_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

const SHOP_UTC_OFFSET_SECS: i32 = 7 * 3600;

/// One product within an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemSummary {
    pub product_id: ProductId,
    /// Product name, when the product was found in the catalog.
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub total_price: Price,
}

/// All rows sharing one order number, rolled up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub order_number: String,
    pub user_id: MemberId,
    pub created_at: Option<DateTime<Utc>>,
    pub status: OrderStatus,
    pub total_price: Price,
    /// Items in ascending product-id order.
    pub items: Vec<OrderItemSummary>,
}

impl OrderSummary {
    /// Total number of units across all items.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Order date rendered in shop time, e.g. `5 March 2024`.
    #[must_use]
    pub fn date_label(&self) -> String {
        self.created_at.map_or_else(
            || "-".to_string(),
            |dt| dt.with_timezone(&shop_offset()).format("%-d %B %Y").to_string(),
        )
    }

    /// Order date and time in shop time, e.g. `5 March 2024 18:30`.
    #[must_use]
    pub fn datetime_label(&self) -> String {
        self.created_at.map_or_else(
            || "-".to_string(),
            |dt| {
                dt.with_timezone(&shop_offset())
                    .format("%-d %B %Y %H:%M")
                    .to_string()
            },
        )
    }

    /// Comma-separated item names, `"Unknown"` for unresolved products.
    #[must_use]
    pub fn item_names(&self) -> String {
        self.items
            .iter()
            .map(|i| i.name.as_deref().unwrap_or("Unknown"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Fill in item names looked up one product at a time. Products missing
    /// from `names` are labelled "Unknown".
    pub fn apply_product_names(&mut self, names: &HashMap<ProductId, String>) {
        for item in &mut self.items {
            item.name = Some(
                names
                    .get(&item.product_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string()),
            );
        }
    }
}

struct Builder {
    order_number: String,
    user_id: MemberId,
    created_at: Option<DateTime<Utc>>,
    status: OrderStatus,
    total_price: Price,
    items: BTreeMap<ProductId, OrderItemSummary>,
}

impl Builder {
    fn start(line: &OrderLine) -> Self {
        Self {
            order_number: line.order_number.clone(),
            user_id: line.user_id,
            created_at: line.created_at,
            status: line.status.clone(),
            total_price: Price::ZERO,
            items: BTreeMap::new(),
        }
    }

    fn push(&mut self, line: &OrderLine, catalog: &HashMap<ProductId, &Product>) {
        self.total_price += line.total_price;
        self.items
            .entry(line.product_id)
            .and_modify(|item| {
                item.quantity = item.quantity.saturating_add(line.quantity);
                item.total_price += line.total_price;
            })
            .or_insert_with(|| {
                let product = catalog.get(&line.product_id);
                OrderItemSummary {
                    product_id: line.product_id,
                    name: product.map(|p| p.name.clone()),
                    image_url: product.and_then(|p| p.image_url.clone()),
                    quantity: line.quantity,
                    total_price: line.total_price,
                }
            });
    }

    fn finish(self) -> OrderSummary {
        OrderSummary {
            order_number: self.order_number,
            user_id: self.user_id,
            created_at: self.created_at,
            status: self.status,
            total_price: self.total_price,
            items: self.items.into_values().collect(),
        }
    }
}

/// Group order rows by order number.
///
/// Summaries come out in the order their first row appears. The member,
/// timestamp and status of a summary are taken from that first row. `catalog`
/// supplies item names and images; pass an empty slice when they are resolved
/// later with [`OrderSummary::apply_product_names`].
pub fn group_order_lines<'a, I>(lines: I, catalog: &[Product]) -> Vec<OrderSummary>
where
    I: IntoIterator<Item = &'a OrderLine>,
{
    let catalog: HashMap<ProductId, &Product> = catalog.iter().map(|p| (p.id, p)).collect();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut builders: Vec<Builder> = Vec::new();

    for line in lines {
        let slot = *index.entry(line.order_number.as_str()).or_insert_with(|| {
            builders.push(Builder::start(line));
            builders.len() - 1
        });
        if let Some(builder) = builders.get_mut(slot) {
            builder.push(line, &catalog);
        }
    }

    builders.into_iter().map(Builder::finish).collect()
}

/// Rows belonging to one member.
pub fn lines_for_member(
    lines: &[OrderLine],
    member: MemberId,
) -> impl Iterator<Item = &OrderLine> {
    lines.iter().filter(move |line| line.user_id == member)
}

/// Admin order table filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Substring of the order number. Empty matches everything.
    pub search: String,
    /// Calendar month 1..=12 in shop time.
    pub month: Option<u32>,
}

impl OrderFilter {
    #[must_use]
    pub fn matches(&self, order: &OrderSummary) -> bool {
        if !order.order_number.contains(self.search.trim()) {
            return false;
        }
        match self.month {
            None => true,
            Some(month) => order
                .created_at
                .is_some_and(|dt| dt.with_timezone(&shop_offset()).month() == month),
        }
    }

    pub fn apply(&self, orders: Vec<OrderSummary>) -> Vec<OrderSummary> {
        orders.into_iter().filter(|o| self.matches(o)).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn line(order: &str, user: i32, product: i32, qty: u32, total: i64) -> OrderLine {
        OrderLine {
            id: None,
            order_number: order.to_string(),
            user_id: MemberId::new(user),
            product_id: ProductId::new(product),
            quantity: qty,
            total_price: Price::from_satang(total),
            created_at: Some(Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap()),
            status: OrderStatus::Pending,
        }
    }

    fn product(id: i32, name: &str) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id, "name": name, "price": 10, "imageUrl": format!("/{name}.png")
        }))
        .unwrap()
    }

    #[test]
    fn test_groups_by_order_number_in_first_seen_order() {
        let lines = vec![
            line("B", 1, 2, 1, 5_000),
            line("A", 1, 1, 2, 8_000),
            line("B", 1, 1, 1, 4_000),
        ];
        let orders = group_order_lines(&lines, &[]);

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].order_number, "B");
        assert_eq!(orders[1].order_number, "A");
        assert_eq!(orders[0].total_price, Price::from_satang(9_000));
        // items sorted by product id
        assert_eq!(orders[0].items[0].product_id, ProductId::new(1));
        assert_eq!(orders[0].items[1].product_id, ProductId::new(2));
    }

    #[test]
    fn test_repeated_product_rows_are_summed() {
        let lines = vec![line("A", 1, 3, 1, 2_000), line("A", 1, 3, 4, 8_000)];
        let orders = group_order_lines(&lines, &[]);

        assert_eq!(orders[0].items.len(), 1);
        assert_eq!(orders[0].items[0].quantity, 5);
        assert_eq!(orders[0].items[0].total_price, Price::from_satang(10_000));
        assert_eq!(orders[0].unit_count(), 5);
    }

    #[test]
    fn test_first_row_decides_status() {
        let mut second = line("A", 1, 2, 1, 100);
        second.status = OrderStatus::Sending;
        let lines = vec![line("A", 1, 1, 1, 100), second];
        assert_eq!(group_order_lines(&lines, &[])[0].status, OrderStatus::Pending);
    }

    #[test]
    fn test_catalog_supplies_names_and_images() {
        let lines = vec![line("A", 1, 1, 1, 100), line("A", 1, 9, 1, 100)];
        let catalog = vec![product(1, "lychee")];
        let orders = group_order_lines(&lines, &catalog);

        assert_eq!(orders[0].items[0].name.as_deref(), Some("lychee"));
        assert_eq!(orders[0].items[0].image_url.as_deref(), Some("/lychee.png"));
        assert_eq!(orders[0].items[1].name, None);
    }

    #[test]
    fn test_apply_product_names_falls_back_to_unknown() {
        let lines = vec![line("A", 1, 1, 1, 100), line("A", 1, 2, 1, 100)];
        let mut order = group_order_lines(&lines, &[]).remove(0);
        let names = HashMap::from([(ProductId::new(1), "Guava".to_string())]);
        order.apply_product_names(&names);

        assert_eq!(order.items[0].name.as_deref(), Some("Guava"));
        assert_eq!(order.items[1].name.as_deref(), Some("Unknown"));
        assert_eq!(order.item_names(), "Guava, Unknown");
    }

    #[test]
    fn test_lines_for_member() {
        let lines = vec![line("A", 1, 1, 1, 100), line("B", 2, 1, 1, 100)];
        let mine: Vec<_> = lines_for_member(&lines, MemberId::new(2)).collect();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].order_number, "B");
    }

    #[test]
    fn test_filter_by_search_and_month() {
        let mut late = line("1709999999999-7", 1, 1, 1, 100);
        // 31 March 20:00 UTC is already 1 April in Bangkok.
        late.created_at = Some(Utc.with_ymd_and_hms(2024, 3, 31, 20, 0, 0).unwrap());
        let lines = vec![line("1709600000000-1", 1, 1, 1, 100), late];
        let orders = group_order_lines(&lines, &[]);

        let march = OrderFilter { search: String::new(), month: Some(3) };
        assert_eq!(march.apply(orders.clone()).len(), 1);

        let april = OrderFilter { search: "-7".into(), month: Some(4) };
        let found = april.apply(orders.clone());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].order_number, "1709999999999-7");

        let none = OrderFilter { search: "nope".into(), month: None };
        assert!(none.apply(orders).is_empty());
    }

    #[test]
    fn test_date_labels_use_shop_time() {
        let mut l = line("A", 1, 1, 1, 100);
        l.created_at = Some(Utc.with_ymd_and_hms(2024, 3, 31, 20, 15, 0).unwrap());
        let order = group_order_lines(&[l], &[]).remove(0);
        assert_eq!(order.date_label(), "1 April 2024");
        assert_eq!(order.datetime_label(), "1 April 2024 03:15");
    }
}
