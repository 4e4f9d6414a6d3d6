//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                    - Health check
//! GET  /health/ready              - Backend reachability
//! GET  /                          - Redirect to /products
//!
//! # Auth
//! GET  /auth/login                - Login page
//! POST /auth/login                - Login action
//! POST /auth/logout               - Logout
//!
//! # Products
//! GET  /products                  - Product list (?q= name filter)
//! GET  /products/new              - New product form
//! POST /products                  - Create product, optionally announce it
//! GET  /products/{id}/edit        - Edit form
//! POST /products/{id}             - Save edits
//!
//! # Ingredients
//! GET  /ingredients               - Ingredient list and add form
//! POST /ingredients               - Add ingredient
//!
//! # Orders
//! GET  /orders                    - Grouped orders (?q= number, ?month=1..12)
//! POST /orders/{number}/status    - Change status
//!
//! # Notifications
//! GET  /notifications/new         - Compose form
//! POST /notifications             - Send
//! ```

pub mod auth;
pub mod ingredients;
pub mod notifications;
pub mod orders;
pub mod products;

use askama::Template;
use axum::{
    Router,
    response::{Html, Redirect},
    routing::get,
};
use serde::Deserialize;

use crate::state::AppState;

/// Render a template, logging failures instead of panicking.
pub(crate) fn render(template: &impl Template) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

/// Query parameters for error/success display.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

impl MessageQuery {
    #[must_use]
    pub fn flash(&self) -> Flash {
        Flash {
            error: self.error.as_deref().map(|c| message_for(c).to_string()),
            success: self.success.as_deref().map(|c| message_for(c).to_string()),
        }
    }
}

/// Messages shown above the page content.
#[derive(Clone, Debug, Default)]
pub struct Flash {
    pub error: Option<String>,
    pub success: Option<String>,
}

impl Flash {
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            success: None,
        }
    }
}

fn message_for(code: &str) -> &'static str {
    match code {
        "credentials" => "Phone number or password is incorrect.",
        "expired" => "Your session has expired. Please sign in again.",
        "session" => "Could not start your session. Please try again.",
        "unavailable" => "The backend is unavailable right now. Please try again.",
        "product_added" => "Product added.",
        "product_saved" => "Product saved.",
        "announce_failed" => "Product saved, but the announcement could not be sent.",
        "ingredient_added" => "Ingredient added.",
        "ingredient_name" => "Enter an ingredient name.",
        "status_saved" => "Order status updated.",
        "status_final" => "This order is already shipping and can no longer change.",
        "status_invalid" => "Choose a valid status.",
        "status_failed" => "The order status could not be updated.",
        "notification_sent" => "Notification sent.",
        _ => "Something went wrong.",
    }
}

/// Create all routes for admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/products") }))
        .merge(auth::router())
        .merge(products::router())
        .merge(ingredients::router())
        .merge(orders::router())
        .merge(notifications::router())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_resolves_codes() {
        let query = MessageQuery {
            error: Some("status_final".to_string()),
            success: Some("product_added".to_string()),
        };
        let flash = query.flash();
        assert_eq!(
            flash.error.as_deref(),
            Some("This order is already shipping and can no longer change.")
        );
        assert_eq!(flash.success.as_deref(), Some("Product added."));
    }

    #[test]
    fn test_unknown_code_is_generic() {
        assert_eq!(message_for("<b>"), "Something went wrong.");
    }
}
