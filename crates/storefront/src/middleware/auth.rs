//! Member authentication extractors.
//!
//! The signed-in member is a [`CurrentMember`] stored in the session by the
//! login handler.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentMember, session_keys};

/// Extractor that requires a signed-in member.
///
/// Page requests without a member are redirected to the login page; `/api/`
/// requests get a bare 401.
///
/// ```rust,ignore
/// async fn orders(RequireMember(member): RequireMember) -> impl IntoResponse {
///     format!("orders for member {}", member.id)
/// }
/// ```
pub struct RequireMember(pub CurrentMember);

/// Why [`RequireMember`] refused a request.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireMember
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let rejection = if parts.uri.path().starts_with("/api/") {
            AuthRejection::Unauthorized
        } else {
            AuthRejection::RedirectToLogin
        };

        let Some(session) = parts.extensions.get::<Session>() else {
            return Err(AuthRejection::Unauthorized);
        };

        session
            .get::<CurrentMember>(session_keys::CURRENT_MEMBER)
            .await
            .ok()
            .flatten()
            .map(Self)
            .ok_or(rejection)
    }
}

/// Extractor that reads the member if there is one.
pub struct OptionalMember(pub Option<CurrentMember>);

impl<S> FromRequestParts<S> for OptionalMember
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let member = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentMember>(session_keys::CURRENT_MEMBER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(member))
    }
}

/// Store the signed-in member in the session.
///
/// The session ID is cycled first so a pre-login cookie cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_member(
    session: &Session,
    member: &CurrentMember,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_MEMBER, member).await
}

/// Drop everything in the session, cart included (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_member(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
