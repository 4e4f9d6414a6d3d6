//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page
//! GET  /health                 - Health check
//! GET  /health/ready           - Backend reachability
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//!
//! # Catalog (requires member)
//! GET  /recommend              - Top sellers and favourite-based picks
//! GET  /products               - Catalog with sales counts (?q= search)
//! GET  /products/{id}          - Product detail with related products
//! POST /products/{id}/buy      - Buy now (single-line order)
//!
//! # Cart (requires member)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add product
//! POST /cart/remove            - Remove product
//! POST /cart/clear             - Empty the cart
//! POST /checkout               - Order everything in the cart
//!
//! # Account (requires member)
//! GET  /orders                 - Order history
//! GET  /profile                - Member data and preferences
//! POST /profile/field          - Edit name, phone or address
//! POST /profile/favorites      - Replace favourite ingredients
//! POST /profile/allergies      - Replace allergen ingredients
//! GET  /notifications          - Notification list (?open= detail)
//! POST /notifications/{id}/read - Mark read and open
//! ```
//!
//! Actions answer with a redirect carrying `?error=code` or `?success=code`;
//! [`MessageQuery`] turns the code back into text on the next page.

pub mod auth;
pub mod cart;
pub mod home;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod profile;
pub mod recommend;

use axum::{
    Router,
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;

use maoyang_core::{Product, unread_count};

use crate::models::CurrentMember;
use crate::state::AppState;

// =============================================================================
// Shared View Data
// =============================================================================

/// Navigation bar data rendered on every page.
#[derive(Clone, Debug, Default)]
pub struct Nav {
    pub signed_in: bool,
    pub unread: usize,
    pub cart_count: u32,
}

impl Nav {
    /// Load the badge counts for the current visitor.
    ///
    /// A failed notification fetch shows zero rather than failing the page.
    pub async fn load(state: &AppState, session: &Session, member: Option<&CurrentMember>) -> Self {
        let Some(member) = member else {
            return Self::default();
        };

        let unread = match state
            .backend()
            .notifications(&member.token, member.id)
            .await
        {
            Ok(notifications) => unread_count(&notifications),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load notifications for nav");
                0
            }
        };

        Self {
            signed_in: true,
            unread,
            cart_count: cart::load_cart(session).await.item_count(),
        }
    }
}

/// Query parameters for error/success display.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

impl MessageQuery {
    /// Resolve the codes into display text.
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
        "unavailable" => "The shop is unavailable right now. Please try again.",
        "registered" => "Registration complete. Please sign in.",
        "added" => "Added to your cart.",
        "removed" => "Removed from your cart.",
        "cleared" => "Your cart is now empty.",
        "ordered" => "Order placed. Thank you!",
        "address" => "Add a delivery address to your profile before ordering.",
        "empty_cart" => "Your cart is empty.",
        "out_of_stock" => "Sorry, that product is out of stock.",
        "stock_changed" => "Some items sold out while in your cart. Please check the quantities and order again.",
        "quantity" => "Choose a quantity of at least 1.",
        "order_failed" => "Your order could not be placed. Please try again.",
        "saved" => "Saved.",
        "invalid" => "Please fill in a value.",
        "conflict" => "An ingredient cannot be both a favourite and an allergy.",
        _ => "Something went wrong.",
    }
}

/// Product card shown in grids.
#[derive(Clone, Debug)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub price: String,
    pub image_url: Option<String>,
    pub in_stock: bool,
    pub sales_count: Option<u32>,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price.display(),
            image_url: product.image_url.clone(),
            in_stock: product.in_stock(),
            sales_count: None,
        }
    }
}

// =============================================================================
// Routers
// =============================================================================

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
        .route("/{id}/buy", post(products::buy))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::show))
        .route("/field", post(profile::update_field))
        .route("/favorites", post(profile::save_favorites))
        .route("/allergies", post(profile::save_allergies))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/recommend", get(recommend::show))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", post(cart::checkout))
        .route("/orders", get(orders::index))
        .nest("/profile", profile_routes())
        .route("/notifications", get(notifications::index))
        .route("/notifications/{id}/read", post(notifications::mark_read))
        .nest("/auth", auth_routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_resolves_codes() {
        let query = MessageQuery {
            error: Some("address".to_string()),
            success: None,
        };
        let flash = query.flash();
        assert_eq!(
            flash.error.as_deref(),
            Some("Add a delivery address to your profile before ordering.")
        );
        assert!(flash.success.is_none());
    }

    #[test]
    fn test_stock_changed_has_its_own_message() {
        assert_ne!(message_for("stock_changed"), message_for("unknown"));
    }

    #[test]
    fn test_unknown_code_is_generic() {
        assert_eq!(message_for("<script>"), "Something went wrong.");
    }
}
