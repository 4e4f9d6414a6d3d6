//! Session-related types for admin authentication.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Session-stored admin identity.
///
/// The backend's admin sign-in only returns a token, so the phone number used
/// to sign in is kept for display.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub phone: String,
    #[serde(serialize_with = "expose", deserialize_with = "conceal")]
    pub token: SecretString,
}

impl std::fmt::Debug for CurrentAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentAdmin")
            .field("phone", &self.phone)
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

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
