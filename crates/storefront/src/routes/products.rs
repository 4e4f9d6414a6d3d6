//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use maoyang_core::{
    CartLine, CartProduct, CheckoutError, CheckoutPlan, OrderNumber, Product, ProductId,
    QuantitySelector, recommend_for, sales_counts, with_sales,
};

use crate::api::{ApiError, RuleScope};
use crate::error::Result;
use crate::middleware::RequireMember;
use crate::models::CurrentMember;
use crate::routes::{Flash, MessageQuery, Nav, ProductCard};
use crate::state::AppState;

// =============================================================================
// Query / Form Types
// =============================================================================

/// Catalog query parameters.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub q: Option<String>,
    #[serde(flatten)]
    pub message: MessageQuery,
}

/// Buy-now form data.
#[derive(Debug, Deserialize)]
pub struct BuyForm {
    pub quantity: u32,
}

// =============================================================================
// Templates
// =============================================================================

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub nav: Nav,
    pub flash: Flash,
    pub query: String,
    pub heading: String,
    pub products: Vec<ProductCard>,
}

/// Product detail display data.
#[derive(Clone, Debug)]
pub struct ProductDetailView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: String,
    pub location: String,
    pub size: String,
    pub price: String,
    pub image_url: Option<String>,
    pub stock: u32,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            kind: product.kind.clone(),
            location: product.location.clone(),
            size: product.size.clone(),
            price: product.price.display(),
            image_url: product.image_url.clone(),
            stock: product.quantity_in_stock,
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub nav: Nav,
    pub flash: Flash,
    pub product: ProductDetailView,
    pub ingredients: Vec<String>,
    pub related: Vec<ProductCard>,
}

// =============================================================================
// Catalog
// =============================================================================

/// Catalog with sales counts, or search results for `?q=`.
///
/// A blank query or a search with no hits falls back to the full catalog with
/// a message.
#[instrument(skip(state, session, member))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireMember(member): RequireMember,
    Query(query): Query<CatalogQuery>,
) -> Result<Response> {
    let mut flash = query.message.flash();
    let search = query.q.as_deref().map(str::trim);

    if let Some(term) = search {
        if term.is_empty() {
            flash.error = Some("Please enter a search term.".to_string());
        } else {
            match state.backend().search_products(&member.token, term).await {
                Ok(results) if !results.is_empty() => {
                    return Ok(ProductsIndexTemplate {
                        nav: Nav::load(&state, &session, Some(&member)).await,
                        flash,
                        query: term.to_string(),
                        heading: format!("Results for \"{term}\""),
                        products: results.iter().map(ProductCard::from).collect(),
                    }
                    .into_response());
                }
                Ok(_) => flash.error = Some("No products found.".to_string()),
                Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized.into()),
                Err(e) => {
                    tracing::error!(error = %e, "Product search failed");
                    flash.error = Some("Search is unavailable right now.".to_string());
                }
            }
        }
    }

    let products = catalog_with_sales(&state, &member).await?;

    Ok(ProductsIndexTemplate {
        nav: Nav::load(&state, &session, Some(&member)).await,
        flash,
        query: search.unwrap_or_default().to_string(),
        heading: "All products".to_string(),
        products,
    }
    .into_response())
}

/// The member's catalog annotated with how many units of each have sold.
///
/// Sales counts are decoration: if the order list fails the catalog is shown
/// without them.
async fn catalog_with_sales(state: &AppState, member: &CurrentMember) -> Result<Vec<ProductCard>> {
    let (products, orders) = tokio::join!(
        state.backend().products(&member.token, member.id),
        state.backend().orders(&member.token, None),
    );

    let counts = match orders {
        Ok(lines) => sales_counts(&lines),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load orders for sales counts");
            Default::default()
        }
    };

    Ok(with_sales(products?, &counts)
        .iter()
        .map(|ranked| ProductCard {
            sales_count: Some(ranked.sales_count),
            ..ProductCard::from(&ranked.product)
        })
        .collect())
}

// =============================================================================
// Detail
// =============================================================================

/// Product detail: ingredients, quantity picker and related products.
#[instrument(skip(state, session, member, query))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireMember(member): RequireMember,
    Path(id): Path<ProductId>,
    Query(query): Query<MessageQuery>,
) -> Result<Response> {
    let backend = state.backend();
    let product = backend.product(&member.token, member.id, id).await?;

    let (ingredients, related, nav) = tokio::join!(
        backend.product_ingredients(&member.token, id),
        related_products(&state, &member, id),
        Nav::load(&state, &session, Some(&member)),
    );

    let ingredients = ingredients.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load product ingredients");
        Vec::new()
    });

    Ok(ProductShowTemplate {
        nav,
        flash: query.flash(),
        product: ProductDetailView::from(&product),
        ingredients: ingredients.into_iter().map(|i| i.name).collect(),
        related: related.iter().map(ProductCard::from).collect(),
    }
    .into_response())
}

/// Products bought together with `id`: the member's own rules first, then
/// rules mined across the shop. Any failure just means no related products.
async fn related_products(state: &AppState, member: &CurrentMember, id: ProductId) -> Vec<Product> {
    let backend = state.backend();

    let own = backend
        .association_rules(&member.token, member.id, RuleScope::Member)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load member association rules");
            Vec::new()
        });

    let mut ids = recommend_for(id, &own, &[]);
    if ids.is_empty() {
        let global = backend
            .association_rules(&member.token, member.id, RuleScope::All)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to load shop association rules");
                Vec::new()
            });
        ids = recommend_for(id, &own, &global);
    }

    backend
        .recommended_products(&member.token, &ids)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load related products");
            Vec::new()
        })
}

// =============================================================================
// Buy Now
// =============================================================================

/// Order a single product straight from the detail page.
#[instrument(skip(state, member))]
pub async fn buy(
    State(state): State<AppState>,
    RequireMember(member): RequireMember,
    Path(id): Path<ProductId>,
    Form(form): Form<BuyForm>,
) -> Result<Response> {
    let backend = state.backend();
    let back = |code: &str| Redirect::to(&format!("/products/{id}?error={code}")).into_response();

    let (product, profile) = tokio::join!(
        backend.product(&member.token, member.id, id),
        backend.member_info(&member.token),
    );
    let product = product?;
    let profile = profile?;

    let line = CartLine {
        quantity: QuantitySelector::clamp(form.quantity, product.quantity_in_stock),
        product: CartProduct::from(&product),
    };

    let plan = match CheckoutPlan::single(&line, &profile, OrderNumber::generate()) {
        Ok(plan) => plan,
        Err(CheckoutError::MissingAddress) => return Ok(back("address")),
        Err(CheckoutError::OutOfStock { .. }) => return Ok(back("out_of_stock")),
        Err(CheckoutError::EmptyCart) => return Ok(back("quantity")),
    };

    match backend.place_order(&member.token, &plan).await {
        Ok(()) => Ok(Redirect::to("/orders?success=ordered").into_response()),
        Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized.into()),
        Err(e) => {
            tracing::error!(error = %e, order_number = %plan.order_number, "Buy-now order failed");
            Ok(back("order_failed"))
        }
    }
}
