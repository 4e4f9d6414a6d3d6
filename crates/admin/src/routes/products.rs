//! Product management route handlers.

use std::collections::HashSet;

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use maoyang_core::forms::{NotificationDraft, ProductDraft, ProductInput, ids_from_pairs, pair_value};
use maoyang_core::{Ingredient, IngredientId, Product, ProductId};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::routes::{Flash, MessageQuery, render};
use crate::state::AppState;

// =============================================================================
// Views
// =============================================================================

/// Product row in the list.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub price: String,
    pub stock: u32,
    pub is_visible: bool,
    pub image_url: Option<String>,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            kind: product.kind.clone(),
            price: product.price.display(),
            stock: product.quantity_in_stock,
            is_visible: product.is_visible,
            image_url: product.image_url.clone(),
        }
    }
}

/// Ingredient checkbox on the product form.
#[derive(Debug, Clone)]
pub struct IngredientOption {
    pub id: String,
    pub name: String,
    pub checked: bool,
}

fn ingredient_options(all: &[Ingredient], selected: &[IngredientId]) -> Vec<IngredientOption> {
    let selected: HashSet<IngredientId> = selected.iter().copied().collect();
    all.iter()
        .map(|i| IngredientOption {
            id: i.id.to_string(),
            name: i.name.clone(),
            checked: selected.contains(&i.id),
        })
        .collect()
}

/// Values shown in the product form, either loaded or as submitted.
#[derive(Debug, Clone, Default)]
pub struct ProductFormView {
    pub name: String,
    pub description: String,
    pub kind: String,
    pub location: String,
    pub size: String,
    pub quantity_in_stock: String,
    pub price: String,
    pub image_url: String,
    pub is_visible: bool,
}

impl From<&Product> for ProductFormView {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            kind: product.kind.clone(),
            location: product.location.clone(),
            size: product.size.clone(),
            quantity_in_stock: product.quantity_in_stock.to_string(),
            price: product.price.to_string(),
            image_url: product.image_url.clone().unwrap_or_default(),
            is_visible: product.is_visible,
        }
    }
}

impl From<&ProductInput> for ProductFormView {
    fn from(input: &ProductInput) -> Self {
        Self {
            name: input.name.clone(),
            description: input.description.clone(),
            kind: input.kind.clone(),
            location: input.location.clone(),
            size: input.size.clone(),
            quantity_in_stock: input.quantity_in_stock.clone(),
            price: input.price.clone(),
            image_url: input.image_url.clone(),
            is_visible: input.is_visible,
        }
    }
}

/// Read the product form. Checkboxes are only submitted when ticked, and the
/// ingredient list arrives as repeated `ingredient` fields.
fn product_input(pairs: &[(String, String)]) -> ProductInput {
    let text = |key: &str| pair_value(pairs, key).unwrap_or_default().to_string();
    ProductInput {
        name: text("name"),
        description: text("description"),
        kind: text("kind"),
        location: text("location"),
        size: text("size"),
        quantity_in_stock: text("quantity_in_stock"),
        price: text("price"),
        image_url: text("image_url"),
        is_visible: pair_value(pairs, "is_visible").is_some(),
        ingredients: ids_from_pairs(pairs, "ingredient"),
    }
}

/// Upper-case the first letter of a validation message.
fn sentence(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect::<String>() + "."
    })
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template)]
#[template(path = "products/index.html")]
struct ProductsIndexTemplate {
    admin: Option<String>,
    flash: Flash,
    query: String,
    products: Vec<ProductRow>,
}

/// Shared by the new and edit pages.
#[derive(Template)]
#[template(path = "products/form.html")]
struct ProductFormTemplate {
    admin: Option<String>,
    flash: Flash,
    heading: String,
    action: String,
    is_new: bool,
    product: ProductFormView,
    ingredients: Vec<IngredientOption>,
}

/// Product list query parameters.
#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub q: Option<String>,
    #[serde(flatten)]
    pub message: MessageQuery,
}

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index).post(create))
        .route("/products/new", get(new_page))
        .route("/products/{id}/edit", get(edit_page))
        .route("/products/{id}", post(update))
}

// =============================================================================
// Handlers
// =============================================================================

/// Every product, hidden ones included, filtered by name.
///
/// GET /products
#[instrument(skip(state, admin))]
async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<ProductsQuery>,
) -> Result<Response> {
    let products = state.client().products(&admin.token).await?;
    let search = query.q.as_deref().unwrap_or_default().trim();
    let needle = search.to_lowercase();

    let products = products
        .iter()
        .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
        .map(ProductRow::from)
        .collect();

    Ok(render(&ProductsIndexTemplate {
        admin: Some(admin.phone),
        flash: query.message.flash(),
        query: search.to_string(),
        products,
    })
    .into_response())
}

/// New product form.
///
/// GET /products/new
#[instrument(skip(state, admin))]
async fn new_page(State(state): State<AppState>, RequireAdmin(admin): RequireAdmin) -> Result<Response> {
    let ingredients = state.client().ingredients(&admin.token).await?;

    Ok(render(&ProductFormTemplate {
        admin: Some(admin.phone),
        flash: Flash::default(),
        heading: "New product".to_string(),
        action: "/products".to_string(),
        is_new: true,
        product: ProductFormView {
            is_visible: true,
            ..ProductFormView::default()
        },
        ingredients: ingredient_options(&ingredients, &[]),
    })
    .into_response())
}

/// Create a product. With "announce" ticked every member is notified.
///
/// POST /products
#[instrument(skip_all)]
async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let client = state.client();
    let input = product_input(&pairs);
    let announce = pair_value(&pairs, "announce").is_some();

    let draft = match ProductDraft::validate(input.clone()) {
        Ok(draft) => draft,
        Err(e) => {
            let ingredients = client.ingredients(&admin.token).await?;
            return Ok(render(&ProductFormTemplate {
                admin: Some(admin.phone),
                flash: Flash::error(sentence(&e.to_string())),
                heading: "New product".to_string(),
                action: "/products".to_string(),
                is_new: true,
                product: ProductFormView::from(&input),
                ingredients: ingredient_options(&ingredients, &input.ingredients),
            })
            .into_response());
        }
    };

    client.add_product(&admin.token, &draft).await?;

    if announce {
        let notification = NotificationDraft::new_product(&draft.name, &draft.description);
        if let Err(e) = client.send_notification(&admin.token, &notification).await {
            tracing::error!(error = %e, "Failed to announce new product");
            return Ok(Redirect::to("/products?success=product_added&error=announce_failed").into_response());
        }
    }

    Ok(Redirect::to("/products?success=product_added").into_response())
}

/// Edit form with the product's current ingredients ticked.
///
/// GET /products/{id}/edit
#[instrument(skip(state, admin))]
async fn edit_page(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let client = state.client();
    let (product, current, ingredients) = tokio::join!(
        client.product(&admin.token, id),
        client.product_ingredients(&admin.token, id),
        client.ingredients(&admin.token),
    );
    let product = product?;
    let selected: Vec<IngredientId> = current?.iter().map(|i| i.id).collect();

    Ok(render(&ProductFormTemplate {
        admin: Some(admin.phone),
        flash: Flash::default(),
        heading: format!("Edit {}", product.name),
        action: format!("/products/{id}"),
        is_new: false,
        product: ProductFormView::from(&product),
        ingredients: ingredient_options(&ingredients?, &selected),
    })
    .into_response())
}

/// Save fields, visibility and ingredients.
///
/// POST /products/{id}
#[instrument(skip(state, admin, pairs))]
async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let client = state.client();
    let input = product_input(&pairs);

    match ProductDraft::validate(input.clone()) {
        Ok(draft) => {
            client.update_product(&admin.token, id, &draft).await?;
            Ok(Redirect::to("/products?success=product_saved").into_response())
        }
        Err(e) => {
            let ingredients = client.ingredients(&admin.token).await?;
            Ok(render(&ProductFormTemplate {
                admin: Some(admin.phone),
                flash: Flash::error(sentence(&e.to_string())),
                heading: "Edit product".to_string(),
                action: format!("/products/{id}"),
                is_new: false,
                product: ProductFormView::from(&input),
                ingredients: ingredient_options(&ingredients, &input.ingredients),
            })
            .into_response())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_product_input_reads_checkboxes() {
        let input = product_input(&pairs(&[
            ("name", "Mango Smoothie"),
            ("price", "65"),
            ("quantity_in_stock", "12"),
            ("ingredient", "3"),
            ("ingredient", "5"),
        ]));
        assert_eq!(input.name, "Mango Smoothie");
        assert!(!input.is_visible);
        assert_eq!(input.ingredients, vec![IngredientId::new(3), IngredientId::new(5)]);

        let visible = product_input(&pairs(&[("name", "x"), ("is_visible", "on")]));
        assert!(visible.is_visible);
    }

    #[test]
    fn test_ingredient_options_mark_selected() {
        let all = vec![
            Ingredient { id: IngredientId::new(1), name: "Mango".into() },
            Ingredient { id: IngredientId::new(2), name: "Milk".into() },
        ];
        let options = ingredient_options(&all, &[IngredientId::new(2)]);
        assert!(!options[0].checked);
        assert!(options[1].checked);
    }

    #[test]
    fn test_sentence() {
        assert_eq!(sentence("name is required"), "Name is required.");
        assert_eq!(sentence(""), "");
    }
}
