//! Ingredient route handlers.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use maoyang_core::Ingredient;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::routes::{Flash, MessageQuery, render};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "ingredients/index.html")]
struct IngredientsTemplate {
    admin: Option<String>,
    flash: Flash,
    ingredients: Vec<Ingredient>,
}

/// New ingredient form data.
#[derive(Debug, Deserialize)]
pub struct IngredientForm {
    pub name: String,
}

/// Build the ingredients router.
pub fn router() -> Router<AppState> {
    Router::new().route("/ingredients", get(index).post(create))
}

/// Ingredient list, sorted by name, with the add form.
///
/// GET /ingredients
#[instrument(skip(state, admin))]
async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<MessageQuery>,
) -> Result<Response> {
    let mut ingredients = state.client().ingredients(&admin.token).await?.to_vec();
    ingredients.sort_by_key(|i| i.name.to_lowercase());

    Ok(render(&IngredientsTemplate {
        admin: Some(admin.phone),
        flash: query.flash(),
        ingredients,
    })
    .into_response())
}

/// Add an ingredient. Blank names never reach the backend.
///
/// POST /ingredients
#[instrument(skip(state, admin))]
async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<IngredientForm>,
) -> Result<Response> {
    let name = form.name.trim();
    if name.is_empty() {
        return Ok(Redirect::to("/ingredients?error=ingredient_name").into_response());
    }

    state.client().add_ingredient(&admin.token, name).await?;
    tracing::info!(name, "Ingredient added");
    Ok(Redirect::to("/ingredients?success=ingredient_added").into_response())
}
