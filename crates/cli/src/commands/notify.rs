//! Notification command.

use maoyang_core::MemberId;
use maoyang_core::forms::NotificationDraft;

use super::{AdminSession, CliError};

fn draft(
    title: &str,
    message: &str,
    member: Option<i32>,
    all: bool,
) -> Result<NotificationDraft, CliError> {
    let draft = NotificationDraft {
        title: title.trim().to_string(),
        message: message.trim().to_string(),
        kind: None,
        expiry_date: None,
        user_id: if all { None } else { member.map(MemberId::new) },
        send_to_all: all,
    };
    draft
        .validate()
        .map_err(|e| CliError::Invalid(e.to_string()))?;
    Ok(draft)
}

/// Send a notification to one member or to everyone.
///
/// # Errors
///
/// Missing title, message or recipient; backend failures are passed on.
pub async fn send(
    session: &AdminSession,
    title: &str,
    message: &str,
    member: Option<i32>,
    all: bool,
) -> Result<Vec<String>, CliError> {
    let draft = draft(title, message, member, all)?;
    session.client.send_notification(&session.token, &draft).await?;
    let recipient = draft
        .user_id
        .map_or_else(|| "every member".to_string(), |id| format!("member {id}"));
    Ok(vec![format!("Notification sent to {recipient}")])
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use maoyang_integration_tests::FakeBackend;

    use super::*;
    use crate::commands::testing;

    #[tokio::test]
    async fn test_send_reaches_backend() {
        let backend = FakeBackend::spawn().await;
        let session = testing::session(&backend).await;

        let lines = send(&session, "Your order", "On its way", Some(2), false).await.unwrap();
        assert_eq!(lines, vec!["Notification sent to member 2".to_string()]);
        let lines = send(&session, "Closed", "Closed on Monday", None, true).await.unwrap();
        assert_eq!(lines, vec!["Notification sent to every member".to_string()]);

        let sent = backend.data().sent_notifications.clone();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0]["userId"], 2);
        assert_eq!(sent[0]["sendToAll"], false);
        assert_eq!(sent[1]["sendToAll"], true);
        assert!(sent[1].get("userId").is_none());
    }

    #[test]
    fn test_draft_for_member() {
        let d = draft("Hi", " Your order shipped ", Some(4), false).unwrap();
        assert_eq!(d.user_id, Some(MemberId::new(4)));
        assert_eq!(d.message, "Your order shipped");
    }

    #[test]
    fn test_blank_title_rejected() {
        assert!(matches!(
            draft("  ", "x", None, true),
            Err(CliError::Invalid(_))
        ));
    }
}
