//! Member notifications.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use maoyang_core::orders::shop_offset;
use maoyang_core::{Notification, NotificationId, unread_count};

use crate::api::ApiError;
use crate::error::Result;
use crate::middleware::RequireMember;
use crate::routes::{Flash, MessageQuery, Nav};
use crate::state::AppState;

/// Notification list query parameters.
#[derive(Debug, Deserialize)]
pub struct NotificationsQuery {
    /// Notification to show in full. Kept as text because flattened query
    /// structs only see strings.
    pub open: Option<String>,
    #[serde(flatten)]
    pub message: MessageQuery,
}

/// One notification row.
#[derive(Clone, Debug)]
pub struct NotificationView {
    pub id: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: String,
    pub expires: Option<String>,
}

impl From<&Notification> for NotificationView {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id.to_string(),
            title: n.title.clone(),
            message: n.message.clone(),
            is_read: n.is_read,
            created_at: n
                .created_at
                .map(|t| t.with_timezone(&shop_offset()).format("%-d %b %Y %H:%M").to_string())
                .unwrap_or_default(),
            expires: n.expiry_date.map(|d| d.format("%-d %b %Y").to_string()),
        }
    }
}

/// Notifications page template.
#[derive(Template, WebTemplate)]
#[template(path = "notifications/index.html")]
pub struct NotificationsTemplate {
    pub nav: Nav,
    pub flash: Flash,
    pub unread: usize,
    pub notifications: Vec<NotificationView>,
    pub opened: Option<NotificationView>,
}

/// List notifications; `?open=id` also shows one in full.
#[instrument(skip(state, session, member))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireMember(member): RequireMember,
    Query(query): Query<NotificationsQuery>,
) -> Result<Response> {
    let mut flash = query.message.flash();

    let notifications = match state
        .backend()
        .notifications(&member.token, member.id)
        .await
    {
        Ok(notifications) => notifications,
        Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized.into()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load notifications");
            flash.error = Some("Notifications could not be loaded.".to_string());
            Vec::new()
        }
    };

    let opened = query
        .open
        .as_deref()
        .and_then(|id| id.parse::<NotificationId>().ok())
        .and_then(|id| notifications.iter().find(|n| n.id == id))
        .map(NotificationView::from);

    Ok(NotificationsTemplate {
        nav: Nav::load(&state, &session, Some(&member)).await,
        flash,
        unread: unread_count(&notifications),
        notifications: notifications.iter().map(NotificationView::from).collect(),
        opened,
    }
    .into_response())
}

/// Mark a notification read, then open it.
#[instrument(skip(state, member))]
pub async fn mark_read(
    State(state): State<AppState>,
    RequireMember(member): RequireMember,
    Path(id): Path<NotificationId>,
) -> Result<Response> {
    match state.backend().mark_notification_read(&member.token, id).await {
        Ok(()) => Ok(Redirect::to(&format!("/notifications?open={id}")).into_response()),
        Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized.into()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to mark notification read");
            Ok(Redirect::to("/notifications?error=unavailable").into_response())
        }
    }
}
