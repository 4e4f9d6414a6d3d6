//! Notification endpoint.

use maoyang_core::forms::NotificationDraft;
use reqwest::Method;
use secrecy::SecretString;
use tracing::instrument;

use super::{AdminClient, ApiError};

impl AdminClient {
    /// Send a notification to one member or to everyone.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, draft), fields(title = %draft.title, send_to_all = draft.send_to_all))]
    pub async fn send_notification(
        &self,
        token: &SecretString,
        draft: &NotificationDraft,
    ) -> Result<(), ApiError> {
        let request = self.authed(Method::POST, "/notifications", token).json(draft);
        self.execute_empty(request).await
    }
}
