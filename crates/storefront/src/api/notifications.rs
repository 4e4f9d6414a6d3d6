//! Notification endpoints.

use maoyang_core::{MemberId, Notification, NotificationId};
use reqwest::Method;
use secrecy::SecretString;
use serde_json::json;
use tracing::instrument;

use super::{ApiError, BackendClient};

impl BackendClient {
    /// Notifications addressed to `member`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn notifications(
        &self,
        token: &SecretString,
        member: MemberId,
    ) -> Result<Vec<Notification>, ApiError> {
        let path = format!("/notifications/{member}");
        self.execute(self.authed(Method::GET, &path, token)).await
    }

    /// Mark a notification as read.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn mark_notification_read(
        &self,
        token: &SecretString,
        id: NotificationId,
    ) -> Result<(), ApiError> {
        let path = format!("/notifications/{id}");
        let request = self
            .authed(Method::PATCH, &path, token)
            .json(&json!({ "isRead": true }));
        self.execute_empty(request).await
    }
}
