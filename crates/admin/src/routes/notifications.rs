//! Notification route handlers.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use maoyang_core::forms::NotificationInput;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::routes::{Flash, MessageQuery, render};
use crate::state::AppState;

/// Notification form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationForm {
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub expiry_date: String,
    #[serde(default)]
    pub user_id: String,
    /// Checkbox, only present when ticked.
    pub send_to_all: Option<String>,
}

impl From<NotificationForm> for NotificationInput {
    fn from(form: NotificationForm) -> Self {
        Self {
            title: form.title,
            message: form.message,
            kind: form.kind,
            expiry_date: form.expiry_date,
            user_id: form.user_id,
            send_to_all: form.send_to_all.is_some(),
        }
    }
}

#[derive(Template)]
#[template(path = "notifications/new.html")]
struct NewNotificationTemplate {
    admin: Option<String>,
    flash: Flash,
    form: NotificationForm,
}

/// Build the notifications router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notifications/new", get(new_page))
        .route("/notifications", post(create))
}

/// Compose form.
///
/// GET /notifications/new
async fn new_page(RequireAdmin(admin): RequireAdmin, Query(query): Query<MessageQuery>) -> Response {
    render(&NewNotificationTemplate {
        admin: Some(admin.phone),
        flash: query.flash(),
        form: NotificationForm::default(),
    })
    .into_response()
}

/// Send to one member or to everyone.
///
/// POST /notifications
#[instrument(skip_all)]
async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<NotificationForm>,
) -> Result<Response> {
    let refill = form.clone();

    let draft = match NotificationInput::from(form).into_draft() {
        Ok(draft) => draft,
        Err(e) => {
            let message = e.to_string();
            return Ok(render(&NewNotificationTemplate {
                admin: Some(admin.phone),
                flash: Flash::error(format!("Could not send: {message}.")),
                form: refill,
            })
            .into_response());
        }
    };

    state.client().send_notification(&admin.token, &draft).await?;
    tracing::info!(send_to_all = draft.send_to_all, "Notification sent");
    Ok(Redirect::to("/notifications/new?success=notification_sent").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use maoyang_core::MemberId;

    use super::*;

    #[test]
    fn test_form_to_draft() {
        let form = NotificationForm {
            title: " Promo ".into(),
            message: "Half price mango".into(),
            user_id: "7".into(),
            ..NotificationForm::default()
        };
        let draft = NotificationInput::from(form).into_draft().unwrap();
        assert_eq!(draft.title, "Promo");
        assert_eq!(draft.user_id, Some(MemberId::new(7)));
        assert!(!draft.send_to_all);
    }

    #[test]
    fn test_checkbox_sends_to_all() {
        let form = NotificationForm {
            title: "Closed".into(),
            message: "Shop closed on Monday".into(),
            user_id: "7".into(),
            send_to_all: Some("on".into()),
            ..NotificationForm::default()
        };
        let draft = NotificationInput::from(form).into_draft().unwrap();
        assert!(draft.send_to_all);
        assert_eq!(draft.user_id, None);
    }
}
