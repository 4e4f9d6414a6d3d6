//! Authentication route handlers.
//!
//! Members sign in with phone number and password; the backend hands back a
//! bearer token which is kept in the session next to the member ID.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use maoyang_core::forms::{Registration, RegistrationInput};

use crate::api::ApiError;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalMember, clear_current_member, set_current_member};
use crate::models::CurrentMember;
use crate::routes::{Flash, MessageQuery, Nav};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub phone: String,
    pub password: String,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub sex: String,
    pub password: String,
    pub confirm_password: String,
}

impl From<RegisterForm> for RegistrationInput {
    fn from(form: RegisterForm) -> Self {
        Self {
            name: form.name,
            phone: form.phone,
            email: form.email,
            sex: form.sex,
            password: form.password,
            confirm_password: form.confirm_password,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub nav: Nav,
    pub flash: Flash,
}

/// Register page template. Refills everything except the passwords.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub nav: Nav,
    pub flash: Flash,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub sex: String,
}

impl RegisterTemplate {
    fn refill(input: &RegistrationInput, flash: Flash) -> Self {
        Self {
            nav: Nav::default(),
            flash,
            name: input.name.clone(),
            phone: input.phone.clone(),
            email: input.email.clone(),
            sex: input.sex.clone(),
        }
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalMember(member): OptionalMember,
    Query(query): Query<MessageQuery>,
) -> Response {
    if member.is_some() {
        return Redirect::to("/recommend").into_response();
    }
    LoginTemplate {
        nav: Nav::default(),
        flash: query.flash(),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(phone = %form.phone))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let password = SecretString::from(form.password);

    let token = match state.backend().sign_in(form.phone.trim(), &password).await {
        Ok(token) => token,
        Err(ApiError::Rejected(message)) => {
            tracing::info!(%message, "Login rejected");
            return Redirect::to("/auth/login?error=credentials").into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "Login failed");
            return Redirect::to("/auth/login?error=unavailable").into_response();
        }
    };

    let id = match state.backend().member_id(&token).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch member id after login");
            return Redirect::to("/auth/login?error=unavailable").into_response();
        }
    };

    if let Err(e) = set_current_member(&session, &CurrentMember::new(id, token)).await {
        tracing::error!(error = %e, "Failed to set session");
        return Redirect::to("/auth/login?error=session").into_response();
    }

    set_sentry_user(&id);
    tracing::info!(member_id = %id, "Member signed in");
    Redirect::to("/recommend").into_response()
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate::refill(&RegistrationInput::default(), query.flash())
}

/// Handle registration form submission.
///
/// Invalid input re-renders the form with the first problem found.
#[instrument(skip(state, form))]
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    let input = RegistrationInput::from(form);

    let registration = match Registration::validate(&input) {
        Ok(registration) => registration,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                RegisterTemplate::refill(&input, Flash::error(capitalize(&e.to_string()))),
            )
                .into_response();
        }
    };

    match state.backend().register(&registration).await {
        Ok(()) => {
            tracing::info!(phone = %registration.phone, "Member registered");
            Redirect::to("/auth/login?success=registered").into_response()
        }
        Err(ApiError::Rejected(message)) => {
            tracing::info!(%message, "Registration rejected");
            RegisterTemplate::refill(&input, Flash::error(format!("Registration failed: {message}")))
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Registration failed");
            RegisterTemplate::refill(
                &input,
                Flash::error("The shop is unavailable right now. Please try again."),
            )
            .into_response()
        }
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout. Drops the cart along with the member.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_member(&session).await {
        tracing::error!(error = %e, "Failed to clear session");
    }
    clear_sentry_user();
    Redirect::to("/").into_response()
}
