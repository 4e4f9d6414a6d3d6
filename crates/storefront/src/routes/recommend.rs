//! Recommendation page: best sellers and picks based on favourite
//! ingredients. Each section loads on its own and shows an empty state when
//! its request fails.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use maoyang_core::forms::PreferenceKind;
use maoyang_core::{sales_counts, top_sellers, with_sales};

use crate::api::ApiError;
use crate::middleware::RequireMember;
use crate::models::CurrentMember;
use crate::routes::{Flash, Nav, ProductCard};
use crate::state::AppState;

/// Recommendation page template.
#[derive(Template, WebTemplate)]
#[template(path = "recommend.html")]
pub struct RecommendTemplate {
    pub nav: Nav,
    pub flash: Flash,
    pub top_sellers: Vec<ProductCard>,
    pub favorite_ingredients: Vec<String>,
    pub similar: Vec<ProductCard>,
}

/// Display the recommendation page.
#[instrument(skip(state, session, member))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireMember(member): RequireMember,
) -> impl IntoResponse {
    let backend = state.backend();

    let (top, favorites, similar, nav) = tokio::join!(
        best_sellers(&state, &member),
        backend.preferences(&member.token, PreferenceKind::Favorites, member.id),
        backend.similar_products(&member.token, member.id),
        Nav::load(&state, &session, Some(&member)),
    );

    let top = top.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to load top sellers");
        Vec::new()
    });
    let favorites = favorites.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to load favourite ingredients");
        Vec::new()
    });
    let similar = similar.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to load similar products");
        Vec::new()
    });

    RecommendTemplate {
        nav,
        flash: Flash::default(),
        top_sellers: top,
        favorite_ingredients: favorites.into_iter().map(|i| i.name).collect(),
        similar: similar.iter().map(ProductCard::from).collect(),
    }
}

/// Products tied for the highest number of units sold across all orders.
async fn best_sellers(state: &AppState, member: &CurrentMember) -> Result<Vec<ProductCard>, ApiError> {
    let (products, orders) = tokio::join!(
        state.backend().products(&member.token, member.id),
        state.backend().orders(&member.token, None),
    );
    let ranked = with_sales(products?, &sales_counts(&orders?));

    Ok(top_sellers(&ranked)
        .iter()
        .map(|r| ProductCard {
            sales_count: Some(r.sales_count),
            ..ProductCard::from(&r.product)
        })
        .collect())
}
