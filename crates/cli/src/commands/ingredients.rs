//! Ingredient commands.

use super::{AdminSession, CliError};

/// Every ingredient as `id  name`.
///
/// # Errors
///
/// Returns an error if the list cannot be fetched.
pub async fn list(session: &AdminSession) -> Result<Vec<String>, CliError> {
    let ingredients = session.client.ingredients(&session.token).await?;
    Ok(ingredients
        .iter()
        .map(|ingredient| format!("{:>4}  {}", ingredient.id, ingredient.name))
        .collect())
}

/// Add an ingredient by name.
///
/// # Errors
///
/// Blank names are rejected; backend failures are passed on.
pub async fn add(session: &AdminSession, name: &str) -> Result<Vec<String>, CliError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::Invalid("ingredient name is required".to_string()));
    }
    session.client.add_ingredient(&session.token, name).await?;
    Ok(vec![format!("Added ingredient {name}")])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use maoyang_integration_tests::FakeBackend;

    use super::*;
    use crate::commands::testing;

    #[tokio::test]
    async fn test_add_then_list() {
        let backend = FakeBackend::spawn().await;
        let session = testing::session(&backend).await;

        // fills the ingredient cache, which the add must invalidate
        assert_eq!(list(&session).await.unwrap().len(), 2);

        add(&session, "  Passion fruit ").await.unwrap();
        let lines = list(&session).await.unwrap();
        assert_eq!(lines.last().map(String::as_str), Some("   3  Passion fruit"));
        assert!(matches!(add(&session, "   ").await, Err(CliError::Invalid(_))));
        assert_eq!(backend.data().ingredients.len(), 3);
    }
}
