//! Member order history.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;

use maoyang_core::{OrderSummary, group_order_lines, lines_for_member};

use crate::middleware::RequireMember;
use crate::routes::{Flash, MessageQuery, Nav};
use crate::state::AppState;

/// One item row inside an order.
#[derive(Clone, Debug)]
pub struct OrderItemView {
    pub name: String,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub total_price: String,
}

/// One order card.
#[derive(Clone, Debug)]
pub struct OrderView {
    pub order_number: String,
    pub date: String,
    pub status: String,
    pub status_class: String,
    pub total_price: String,
    pub unit_count: u32,
    pub items: Vec<OrderItemView>,
}

impl From<&OrderSummary> for OrderView {
    fn from(order: &OrderSummary) -> Self {
        Self {
            order_number: order.order_number.clone(),
            date: order.date_label(),
            status: order.status.label().to_string(),
            status_class: order.status.css_class().to_string(),
            total_price: order.total_price.display(),
            unit_count: order.unit_count(),
            items: order
                .items
                .iter()
                .map(|item| OrderItemView {
                    name: item.name.clone().unwrap_or_else(|| "Unknown".to_string()),
                    image_url: item.image_url.clone(),
                    quantity: item.quantity,
                    total_price: item.total_price.display(),
                })
                .collect(),
        }
    }
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub nav: Nav,
    pub flash: Flash,
    pub orders: Vec<OrderView>,
}

/// The member's orders, grouped by order number.
///
/// Names and images come from the full order catalog so hidden products still
/// show up. A failed catalog fetch only loses the names.
#[instrument(skip(state, session, member))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireMember(member): RequireMember,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    let backend = state.backend();
    let mut flash = query.flash();

    let (lines, catalog, nav) = tokio::join!(
        backend.orders(&member.token, Some(member.id)),
        backend.order_catalog(&member.token),
        Nav::load(&state, &session, Some(&member)),
    );

    let lines = lines.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to load orders");
        flash.error = Some("Your orders could not be loaded. Please try again.".to_string());
        Vec::new()
    });
    let catalog = catalog.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load order catalog");
        Default::default()
    });

    let orders = group_order_lines(lines_for_member(&lines, member.id), &catalog);

    OrdersTemplate {
        nav,
        flash,
        orders: orders.iter().map(OrderView::from).collect(),
    }
}
