//! Session-related types.
//!
//! The member's bearer token and the cart are the only things the storefront
//! remembers between requests. Both live in the server-side session.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use maoyang_core::MemberId;

/// The signed-in member.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentMember {
    /// Member ID as reported by `/member/info/id`.
    pub id: MemberId,
    /// Bearer token returned by `/member/signin`.
    #[serde(serialize_with = "expose", deserialize_with = "conceal")]
    pub token: SecretString,
}

impl CurrentMember {
    #[must_use]
    pub fn new(id: MemberId, token: SecretString) -> Self {
        Self { id, token }
    }
}

impl std::fmt::Debug for CurrentMember {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentMember")
            .field("id", &self.id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

fn conceal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

/// Session keys.
pub mod keys {
    /// The signed-in member.
    pub const CURRENT_MEMBER: &str = "current_member";

    /// The shopping cart.
    pub const CART: &str = "cart";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_round_trip_keeps_token() {
        let member = CurrentMember::new(MemberId::new(5), SecretString::from("tok-123"));
        let json = serde_json::to_string(&member).unwrap();
        let back: CurrentMember = serde_json::from_str(&json).unwrap();

        assert_eq!(back.id, MemberId::new(5));
        assert_eq!(back.token.expose_secret(), "tok-123");
    }

    #[test]
    fn test_debug_redacts_token() {
        let member = CurrentMember::new(MemberId::new(5), SecretString::from("tok-123"));
        let debug = format!("{member:?}");
        assert!(!debug.contains("tok-123"));
        assert!(debug.contains("[REDACTED]"));
    }
}
