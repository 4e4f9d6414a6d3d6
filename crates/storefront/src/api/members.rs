//! Member account endpoints.

use maoyang_core::forms::{PreferenceKind, PreferenceSelection, ProfileField, Registration};
use maoyang_core::{Ingredient, Member, MemberId};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{ApiError, BackendClient, SUCCESS, Single};

#[derive(Serialize)]
struct SignInRequest<'a> {
    phone: &'a str,
    pass: &'a str,
}

#[derive(Deserialize)]
struct SignInResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberIdResponse {
    user_id: MemberId,
}

impl BackendClient {
    /// Exchange a phone number and password for a bearer token.
    ///
    /// # Errors
    ///
    /// [`ApiError::Rejected`] when the credentials are wrong.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, phone: &str, password: &SecretString) -> Result<SecretString, ApiError> {
        let request = self.request(Method::POST, "/member/signin").json(&SignInRequest {
            phone,
            pass: password.expose_secret(),
        });

        let response: SignInResponse = self.execute(request).await?;
        match (response.message.as_deref(), response.token) {
            (Some(SUCCESS), Some(token)) if !token.is_empty() => Ok(SecretString::from(token)),
            (message, _) => Err(ApiError::Rejected(
                message.unwrap_or("sign-in failed").to_string(),
            )),
        }
    }

    /// Create a member account.
    ///
    /// # Errors
    ///
    /// [`ApiError::Rejected`] when the backend does not report success.
    #[instrument(skip(self, registration), fields(phone = %registration.phone))]
    pub async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "/member/memberRegister")
            .json(registration);
        self.execute_ack(request).await
    }

    /// ID of the member the token belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip_all)]
    pub async fn member_id(&self, token: &SecretString) -> Result<MemberId, ApiError> {
        let response: MemberIdResponse = self
            .execute(self.authed(Method::GET, "/member/info/id", token))
            .await?;
        Ok(response.user_id)
    }

    /// Full record of the signed-in member.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip_all)]
    pub async fn member_info(&self, token: &SecretString) -> Result<Member, ApiError> {
        let response: Single<Member> = self
            .execute(self.authed(Method::GET, "/member/info", token))
            .await?;
        Ok(response.result)
    }

    /// Change the member's name, phone or address.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, payload))]
    pub async fn update_profile_field(
        &self,
        token: &SecretString,
        field: ProfileField,
        payload: &serde_json::Value,
    ) -> Result<(), ApiError> {
        let request = self.authed(Method::PUT, field.path(), token).json(payload);
        self.execute_empty(request).await
    }

    /// Favourite or allergen ingredients of a member.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn preferences(
        &self,
        token: &SecretString,
        kind: PreferenceKind,
        member: MemberId,
    ) -> Result<Vec<Ingredient>, ApiError> {
        let path = format!("{}/{member}", kind.path());
        self.execute(self.authed(Method::GET, &path, token)).await
    }

    /// Replace a member's favourites or allergies.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(kind = ?selection.kind, count = selection.ingredients.len()))]
    pub async fn save_preferences(
        &self,
        token: &SecretString,
        selection: &PreferenceSelection,
    ) -> Result<(), ApiError> {
        let request = self
            .authed(Method::PUT, selection.kind.path(), token)
            .json(&selection.payload());
        self.execute_empty(request).await
    }
}
