//! Order management route handlers.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use maoyang_core::{OrderFilter, OrderStatus, group_order_lines};

use crate::api::{ApiError, OrderTable};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::routes::{Flash, MessageQuery, render};
use crate::state::AppState;

/// Order table query parameters.
///
/// `month` stays a string: flattened query structs only see string values.
#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub q: Option<String>,
    pub month: Option<String>,
    #[serde(flatten)]
    pub message: MessageQuery,
}

impl OrdersQuery {
    /// An unparseable or out-of-range month means "any month".
    fn filter(&self) -> OrderFilter {
        OrderFilter {
            search: self.q.as_deref().unwrap_or_default().trim().to_string(),
            month: self
                .month
                .as_deref()
                .and_then(|m| m.trim().parse::<u32>().ok())
                .filter(|m| (1..=12).contains(m)),
        }
    }
}

/// Status change form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: OrderStatus,
}

/// Order row in the table.
#[derive(Debug, Clone)]
pub struct OrderRow {
    pub order_number: String,
    pub member: String,
    pub date: String,
    pub items: String,
    pub unit_count: u32,
    pub total_price: String,
    pub status: String,
    pub status_label: &'static str,
    pub status_class: &'static str,
    pub editable: bool,
}

fn order_rows(table: &OrderTable) -> Vec<OrderRow> {
    table
        .orders
        .iter()
        .map(|order| OrderRow {
            order_number: order.order_number.clone(),
            member: table.member_name(order.user_id).to_string(),
            date: order.datetime_label(),
            items: order.item_names(),
            unit_count: order.unit_count(),
            total_price: order.total_price.display(),
            status: order.status.as_str().to_string(),
            status_label: order.status.label(),
            status_class: order.status.css_class(),
            editable: !order.status.is_final(),
        })
        .collect()
}

/// Month picker entry.
#[derive(Debug, Clone)]
pub struct MonthOption {
    pub value: u32,
    pub name: &'static str,
    pub selected: bool,
}

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

fn month_options(selected: Option<u32>) -> Vec<MonthOption> {
    (1..=12)
        .zip(MONTHS)
        .map(|(value, name)| MonthOption {
            value,
            name,
            selected: selected == Some(value),
        })
        .collect()
}

#[derive(Template)]
#[template(path = "orders/index.html")]
struct OrdersIndexTemplate {
    admin: Option<String>,
    flash: Flash,
    query: String,
    months: Vec<MonthOption>,
    orders: Vec<OrderRow>,
}

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(index))
        .route("/orders/{number}/status", post(update_status))
}

/// Grouped orders with member and product names.
///
/// GET /orders
#[instrument(skip(state, admin))]
async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<OrdersQuery>,
) -> Result<Response> {
    let filter = query.filter();
    let table = state.client().order_table(&admin.token, &filter).await?;

    Ok(render(&OrdersIndexTemplate {
        admin: Some(admin.phone),
        flash: query.message.flash(),
        query: filter.search.clone(),
        months: month_options(filter.month),
        orders: order_rows(&table),
    })
    .into_response())
}

/// Move an order to a new status. Orders already shipping stay as they are.
///
/// POST /orders/{number}/status
#[instrument(skip(state, admin, form), fields(status = %form.status))]
async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(number): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    if !OrderStatus::SELECTABLE.contains(&form.status) {
        return Ok(Redirect::to("/orders?error=status_invalid").into_response());
    }

    let client = state.client();
    let lines = client.orders(&admin.token).await?;
    let current = group_order_lines(lines.iter().filter(|l| l.order_number == number), &[])
        .into_iter()
        .next();

    let Some(order) = current else {
        return Err(AppError::NotFound(format!("order {number}")));
    };
    if order.status.is_final() {
        return Ok(Redirect::to("/orders?error=status_final").into_response());
    }
    if order.status == form.status {
        return Ok(Redirect::to("/orders").into_response());
    }

    match client.update_order_status(&admin.token, &number, &form.status).await {
        Ok(()) => {
            tracing::info!(order_number = %number, "Order status updated");
            Ok(Redirect::to("/orders?success=status_saved").into_response())
        }
        Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized.into()),
        Err(e) => {
            tracing::error!(error = %e, order_number = %number, "Order status update failed");
            Ok(Redirect::to("/orders?error=status_failed").into_response())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::HashMap;

    use chrono::{TimeZone, Utc};
    use maoyang_core::{MemberId, OrderSummary, Price};

    use super::*;

    fn query(q: Option<&str>, month: Option<&str>) -> OrdersQuery {
        OrdersQuery {
            q: q.map(String::from),
            month: month.map(String::from),
            message: MessageQuery::default(),
        }
    }

    #[test]
    fn test_filter_parses_month() {
        assert_eq!(query(None, Some("3")).filter().month, Some(3));
        assert_eq!(query(None, Some("13")).filter().month, None);
        assert_eq!(query(None, Some("march")).filter().month, None);
        assert_eq!(query(Some(" ORD1 "), None).filter().search, "ORD1");
    }

    #[test]
    fn test_month_options_mark_selection() {
        let months = month_options(Some(12));
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].name, "January");
        assert!(months[11].selected);
        assert!(!months[0].selected);
    }

    #[test]
    fn test_rows_lock_shipping_orders() {
        let order = |number: &str, status| OrderSummary {
            order_number: number.to_string(),
            user_id: MemberId::new(1),
            created_at: Some(Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap()),
            status,
            total_price: Price::from_satang(9000),
            items: Vec::new(),
        };
        let table = OrderTable {
            orders: vec![order("A1", OrderStatus::Pending), order("A2", OrderStatus::Sending)],
            member_names: HashMap::from([(MemberId::new(1), "Nok".to_string())]),
        };

        let rows = order_rows(&table);
        assert!(rows[0].editable);
        assert!(!rows[1].editable);
        assert_eq!(rows[0].member, "Nok");
        assert_eq!(rows[1].status_label, "Shipping");
    }
}
