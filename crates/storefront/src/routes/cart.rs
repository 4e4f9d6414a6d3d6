//! Cart route handlers.
//!
//! The cart lives in the session as a [`Cart`]; nothing is sent to the backend
//! until checkout, which writes one order row plus one stock update per line.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use maoyang_core::{Cart, CartError, CartProduct, CheckoutError, CheckoutPlan, OrderNumber, ProductId};

use crate::api::ApiError;
use crate::error::Result;
use crate::middleware::RequireMember;
use crate::models::session_keys;
use crate::routes::{Flash, MessageQuery, Nav};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone, Debug)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Clone, Debug)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u32,
}

impl CartView {
    /// Build the view, preferring current catalog images over the snapshot
    /// taken when the line was added.
    fn new(cart: &Cart, images: &HashMap<ProductId, String>) -> Self {
        Self {
            items: cart
                .lines()
                .iter()
                .map(|line| CartItemView {
                    product_id: line.product.id.to_string(),
                    name: line.product.name.clone(),
                    image_url: images
                        .get(&line.product.id)
                        .cloned()
                        .or_else(|| line.product.image_url.clone()),
                    quantity: line.quantity,
                    price: line.product.price.display(),
                    line_price: line.line_total().display(),
                })
                .collect(),
            total: cart.total().display(),
            item_count: cart.item_count(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart from the session. An unreadable cart counts as empty.
pub(crate) async fn load_cart(session: &Session) -> Cart {
    match session.get::<Cart>(session_keys::CART).await {
        Ok(cart) => cart.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read cart from session");
            Cart::default()
        }
    }
}

/// Store the cart in the session.
async fn save_cart(session: &Session, cart: &Cart) -> std::result::Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

// =============================================================================
// Forms and Templates
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub nav: Nav,
    pub flash: Flash,
    pub cart: CartView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, session, member))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireMember(member): RequireMember,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    let cart = load_cart(&session).await;

    let images = if cart.is_empty() {
        HashMap::new()
    } else {
        match state.backend().order_catalog(&member.token).await {
            Ok(catalog) => catalog
                .iter()
                .filter_map(|p| p.image_url.clone().map(|url| (p.id, url)))
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load catalog images for cart");
                HashMap::new()
            }
        }
    };

    CartShowTemplate {
        nav: Nav::load(&state, &session, Some(&member)).await,
        flash: query.flash(),
        cart: CartView::new(&cart, &images),
    }
}

/// Add a product to the cart.
///
/// Stock is read fresh from the backend so the clamp uses current numbers.
/// Checkout checks it again.
#[instrument(skip(state, session, member))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireMember(member): RequireMember,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let id = form.product_id;
    let product = state.backend().product(&member.token, member.id, id).await?;

    let mut cart = load_cart(&session).await;
    match cart.add(CartProduct::from(&product), form.quantity.unwrap_or(1)) {
        Ok(quantity) => {
            save_cart(&session, &cart).await?;
            tracing::info!(product_id = %id, quantity, "Added to cart");
            Ok(Redirect::to("/cart?success=added").into_response())
        }
        Err(CartError::ZeroQuantity) => {
            Ok(Redirect::to(&format!("/products/{id}?error=quantity")).into_response())
        }
        Err(CartError::OutOfStock { .. }) => {
            Ok(Redirect::to(&format!("/products/{id}?error=out_of_stock")).into_response())
        }
    }
}

/// Remove a product from the cart.
#[instrument(skip(session, _member))]
pub async fn remove(
    session: Session,
    RequireMember(_member): RequireMember,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    if cart.remove(form.product_id) {
        save_cart(&session, &cart).await?;
    }
    Ok(Redirect::to("/cart?success=removed").into_response())
}

/// Empty the cart.
#[instrument(skip(session, _member))]
pub async fn clear(session: Session, RequireMember(_member): RequireMember) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    cart.clear();
    save_cart(&session, &cart).await?;
    Ok(Redirect::to("/cart?success=cleared").into_response())
}

/// Order everything in the cart under one order number.
///
/// Stock is re-read first. If another order got there since the items were
/// added, the cart is cut down to what is left and the member is sent back
/// to review it. The cart is only cleared once every line has been sent.
#[instrument(skip(state, session, member))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    RequireMember(member): RequireMember,
) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    let backend = state.backend();
    let (profile, current) = tokio::join!(
        backend.member_info(&member.token),
        backend.products(&member.token, member.id),
    );
    let profile = profile?;

    if cart.refresh_stock(&current?) {
        save_cart(&session, &cart).await?;
        tracing::info!(items = cart.item_count(), "Cart cut down to current stock");
        return Ok(Redirect::to("/cart?error=stock_changed").into_response());
    }

    let plan = match CheckoutPlan::from_cart(&cart, &profile, OrderNumber::generate()) {
        Ok(plan) => plan,
        Err(CheckoutError::MissingAddress) => {
            return Ok(Redirect::to("/cart?error=address").into_response());
        }
        Err(CheckoutError::EmptyCart) => {
            return Ok(Redirect::to("/cart?error=empty_cart").into_response());
        }
        Err(CheckoutError::OutOfStock { .. }) => {
            return Ok(Redirect::to("/cart?error=out_of_stock").into_response());
        }
    };

    match backend.place_order(&member.token, &plan).await {
        Ok(()) => {
            cart.clear();
            save_cart(&session, &cart).await?;
            Ok(Redirect::to("/orders?success=ordered").into_response())
        }
        Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized.into()),
        Err(e) => {
            tracing::error!(error = %e, order_number = %plan.order_number, "Checkout failed");
            Ok(Redirect::to("/cart?error=order_failed").into_response())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use maoyang_core::Price;

    use super::*;

    fn product(id: i32, image: Option<&str>) -> CartProduct {
        CartProduct {
            id: ProductId::new(id),
            name: format!("Juice {id}"),
            price: Price::from_satang(4500),
            quantity_in_stock: 10,
            image_url: image.map(String::from),
        }
    }

    #[test]
    fn test_cart_view_totals_and_images() {
        let mut cart = Cart::new();
        cart.add(product(1, Some("https://img/old.png")), 2).unwrap();
        cart.add(product(2, Some("https://img/two.png")), 1).unwrap();

        let images = HashMap::from([(ProductId::new(1), "https://img/new.png".to_string())]);
        let view = CartView::new(&cart, &images);

        assert_eq!(view.item_count, 3);
        assert_eq!(view.total, "฿135.00");
        assert_eq!(view.items[0].line_price, "฿90.00");
        assert_eq!(view.items[0].image_url.as_deref(), Some("https://img/new.png"));
        assert_eq!(view.items[1].image_url.as_deref(), Some("https://img/two.png"));
    }
}
