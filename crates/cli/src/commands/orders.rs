//! Order reports.

use maoyang_core::{OrderFilter, top_sellers as rank_top_sellers, sales_counts, with_sales};

use super::{AdminSession, CliError};

/// One line per matching order, in the order the backend returns them,
/// followed by a count.
///
/// # Errors
///
/// Returns an error if the orders cannot be fetched.
pub async fn summaries(
    session: &AdminSession,
    search: String,
    month: Option<u32>,
) -> Result<Vec<String>, CliError> {
    let filter = OrderFilter { search, month };
    let table = session.client.order_table(&session.token, &filter).await?;

    let mut lines: Vec<String> = table
        .orders
        .iter()
        .map(|order| {
            format!(
                "{} | {} | {} | {} | {} units | {} | {}",
                order.order_number,
                order.datetime_label(),
                table.member_name(order.user_id),
                order.item_names(),
                order.unit_count(),
                order.total_price.display(),
                order.status.label(),
            )
        })
        .collect();
    lines.push(format!("{} orders", table.orders.len()));
    Ok(lines)
}

/// The products tied for the most units sold.
///
/// # Errors
///
/// Returns an error if products or orders cannot be fetched.
pub async fn top_sellers(session: &AdminSession) -> Result<Vec<String>, CliError> {
    let (products, lines) = tokio::join!(
        session.client.products(&session.token),
        session.client.orders(&session.token),
    );
    let ranked = with_sales(products?, &sales_counts(&lines?));
    let top = rank_top_sellers(&ranked);

    if top.is_empty() {
        return Ok(vec!["Nothing has sold yet".to_string()]);
    }
    Ok(top
        .iter()
        .map(|entry| {
            format!(
                "{} ({}) - {} sold",
                entry.product.name, entry.product.id, entry.sales_count
            )
        })
        .collect())
}
