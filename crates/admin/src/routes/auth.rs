//! Authentication route handlers for admin.
//!
//! Admins sign in with phone number and password against the backend's admin
//! endpoint. The returned token goes into a short-lived, strict session.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::ApiError;
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::routes::{Flash, MessageQuery, render};
use crate::state::AppState;

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub phone: String,
    pub password: String,
}

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginPageTemplate {
    admin: Option<String>,
    flash: Flash,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_page).post(login))
        .route("/auth/logout", post(logout))
}

/// Render the login page.
///
/// GET /auth/login
async fn login_page(Query(query): Query<MessageQuery>) -> Html<String> {
    render(&LoginPageTemplate {
        admin: None,
        flash: query.flash(),
    })
}

/// Exchange credentials for a backend token and start a session.
///
/// POST /auth/login
#[instrument(skip(state, session, form), fields(phone = %form.phone))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let phone = form.phone.trim().to_string();
    let password = SecretString::from(form.password);

    let token = match state.client().sign_in(&phone, &password).await {
        Ok(token) => token,
        Err(ApiError::Rejected(message) | ApiError::NotFound(message)) => {
            tracing::info!(%message, "Admin login rejected");
            return Redirect::to("/auth/login?error=credentials").into_response();
        }
        Err(ApiError::Unauthorized) => {
            return Redirect::to("/auth/login?error=credentials").into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "Admin login failed");
            return Redirect::to("/auth/login?error=unavailable").into_response();
        }
    };

    if let Err(e) = set_current_admin(&session, &CurrentAdmin { phone, token }).await {
        tracing::error!(error = %e, "Failed to store admin session");
        return Redirect::to("/auth/login?error=session").into_response();
    }

    tracing::info!("Admin signed in");
    Redirect::to("/products").into_response()
}

/// Logout and clear session.
///
/// POST /auth/logout
async fn logout(session: Session) -> impl IntoResponse {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::warn!(error = %e, "Failed to clear admin session");
    }
    Redirect::to("/auth/login")
}
