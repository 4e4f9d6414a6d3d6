//! Member profile: personal data and ingredient preferences.

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

use maoyang_core::forms::{
    PreferenceKind, PreferenceSelection, ProfileField, allergy_options, favorite_options,
    ids_from_pairs,
};
use maoyang_core::{Ingredient, Member};

use crate::api::ApiError;
use crate::error::Result;
use crate::middleware::RequireMember;
use crate::models::CurrentMember;
use crate::routes::{Flash, MessageQuery, Nav};
use crate::state::AppState;

/// Form field name used by the preference checkboxes.
const INGREDIENT_FIELD: &str = "ingredient";

/// A checkbox on one of the preference forms.
#[derive(Clone, Debug)]
pub struct IngredientOption {
    pub id: String,
    pub name: String,
    pub checked: bool,
}

fn options(choices: &[&Ingredient], selected: &[Ingredient]) -> Vec<IngredientOption> {
    choices
        .iter()
        .map(|i| IngredientOption {
            id: i.id.to_string(),
            name: i.name.clone(),
            checked: selected.iter().any(|s| s.id == i.id),
        })
        .collect()
}

/// Member data as shown on the page.
#[derive(Clone, Debug)]
pub struct MemberView {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub sex: String,
    pub address: String,
}

impl From<&Member> for MemberView {
    fn from(member: &Member) -> Self {
        let shown = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        Self {
            name: shown(&member.name),
            phone: shown(&member.phone),
            email: shown(&member.email),
            sex: shown(&member.sex),
            address: shown(&member.address),
        }
    }
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile/show.html")]
pub struct ProfileTemplate {
    pub nav: Nav,
    pub flash: Flash,
    pub member: MemberView,
    pub favorites: Vec<String>,
    pub allergies: Vec<String>,
    pub favorite_choices: Vec<IngredientOption>,
    pub allergy_choices: Vec<IngredientOption>,
}

/// Profile field edit form data.
#[derive(Debug, Deserialize)]
pub struct FieldForm {
    pub field: String,
    pub value: String,
}

/// Display the profile page.
///
/// Favourites cannot be picked from the allergy list and the reverse, so each
/// checkbox list leaves out the other list's ingredients.
#[instrument(skip(state, session, member))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireMember(member): RequireMember,
    Query(query): Query<MessageQuery>,
) -> Result<Response> {
    let backend = state.backend();
    let mut flash = query.flash();

    let (profile, favorites, allergies, all, nav) = tokio::join!(
        backend.member_info(&member.token),
        backend.preferences(&member.token, PreferenceKind::Favorites, member.id),
        backend.preferences(&member.token, PreferenceKind::Allergies, member.id),
        backend.ingredients(&member.token),
        Nav::load(&state, &session, Some(&member)),
    );
    let profile = profile?;

    let mut degrade = |what: &str, e: ApiError| {
        tracing::error!(error = %e, "Failed to load {what}");
        flash.error = Some("Some of your preferences could not be loaded.".to_string());
    };
    let favorites = favorites.unwrap_or_else(|e| {
        degrade("favourites", e);
        Vec::new()
    });
    let allergies = allergies.unwrap_or_else(|e| {
        degrade("allergies", e);
        Vec::new()
    });
    let all = all.unwrap_or_else(|e| {
        degrade("ingredients", e);
        Default::default()
    });

    Ok(ProfileTemplate {
        nav,
        flash,
        member: MemberView::from(&profile),
        favorite_choices: options(&favorite_options(&all, &allergies), &favorites),
        allergy_choices: options(&allergy_options(&all, &favorites), &allergies),
        favorites: favorites.into_iter().map(|i| i.name).collect(),
        allergies: allergies.into_iter().map(|i| i.name).collect(),
    }
    .into_response())
}

/// Change name, phone or address.
#[instrument(skip(state, member, form), fields(field = %form.field))]
pub async fn update_field(
    State(state): State<AppState>,
    RequireMember(member): RequireMember,
    Form(form): Form<FieldForm>,
) -> Result<Response> {
    let Ok(field) = form.field.parse::<ProfileField>() else {
        return Ok(Redirect::to("/profile?error=invalid").into_response());
    };
    let Ok(payload) = field.payload(&form.value) else {
        return Ok(Redirect::to("/profile?error=invalid").into_response());
    };

    match state
        .backend()
        .update_profile_field(&member.token, field, &payload)
        .await
    {
        Ok(()) => Ok(Redirect::to("/profile?success=saved").into_response()),
        Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized.into()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update profile");
            Ok(Redirect::to("/profile?error=unavailable").into_response())
        }
    }
}

/// Replace the member's favourite ingredients.
pub async fn save_favorites(
    State(state): State<AppState>,
    RequireMember(member): RequireMember,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    save_preferences(&state, &member, PreferenceKind::Favorites, &pairs).await
}

/// Replace the member's allergen ingredients.
pub async fn save_allergies(
    State(state): State<AppState>,
    RequireMember(member): RequireMember,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    save_preferences(&state, &member, PreferenceKind::Allergies, &pairs).await
}

#[instrument(skip(state, member, pairs))]
async fn save_preferences(
    state: &AppState,
    member: &CurrentMember,
    kind: PreferenceKind,
    pairs: &[(String, String)],
) -> Result<Response> {
    let backend = state.backend();
    let other_kind = match kind {
        PreferenceKind::Favorites => PreferenceKind::Allergies,
        PreferenceKind::Allergies => PreferenceKind::Favorites,
    };

    // The other list is re-read so a stale page cannot create a conflict.
    let other: Vec<_> = backend
        .preferences(&member.token, other_kind, member.id)
        .await?
        .into_iter()
        .map(|i| i.id)
        .collect();

    let selection = PreferenceSelection {
        kind,
        member_id: member.id,
        ingredients: ids_from_pairs(pairs, INGREDIENT_FIELD),
    };
    if selection.validate(&other).is_err() {
        return Ok(Redirect::to("/profile?error=conflict").into_response());
    }

    match backend.save_preferences(&member.token, &selection).await {
        Ok(()) => Ok(Redirect::to("/profile?success=saved").into_response()),
        Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized.into()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to save preferences");
            Ok(Redirect::to("/profile?error=unavailable").into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use maoyang_core::IngredientId;

    use super::*;

    fn ingredient(id: i32, name: &str) -> Ingredient {
        Ingredient {
            id: IngredientId::new(id),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_options_mark_current_selection() {
        let all = vec![ingredient(1, "Mango"), ingredient(2, "Lime"), ingredient(3, "Milk")];
        let allergies = vec![ingredient(3, "Milk")];
        let favorites = vec![ingredient(2, "Lime")];

        let choices = options(&favorite_options(&all, &allergies), &favorites);
        let names: Vec<_> = choices.iter().map(|c| (c.name.as_str(), c.checked)).collect();
        assert_eq!(names, vec![("Mango", false), ("Lime", true)]);
    }

    #[test]
    fn test_member_view_fills_blanks() {
        let member = Member {
            id: maoyang_core::MemberId::new(4),
            name: Some("Ploy".to_string()),
            phone: None,
            email: None,
            sex: None,
            address: None,
        };
        let view = MemberView::from(&member);
        assert_eq!(view.name, "Ploy");
        assert_eq!(view.address, "-");
    }
}
