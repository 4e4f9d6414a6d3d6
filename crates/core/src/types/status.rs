//! Order status values.

use serde::{Deserialize, Serialize};

/// Fulfilment status of an order.
///
/// The backend stores a free-form string. `pending` and `sending` are the two
/// values the admin console sets; anything else is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    /// Order placed, waiting for the shop to check it.
    #[default]
    Pending,
    /// Order handed to the courier. No further changes are allowed.
    Sending,
    /// A status this client does not know about.
    Other(String),
}

impl OrderStatus {
    /// Statuses an admin may pick from.
    pub const SELECTABLE: [Self; 2] = [Self::Pending, Self::Sending];

    /// Wire value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Sending => "sending",
            Self::Other(s) => s,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Checking",
            Self::Sending => "Shipping",
            Self::Other(_) => "Unknown status",
        }
    }

    /// Once an order is shipping its status can no longer be edited.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        matches!(self, Self::Sending)
    }

    /// CSS class used by the order templates.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self {
            Self::Pending => "status-pending",
            Self::Sending => "status-sending",
            Self::Other(_) => "status-unknown",
        }
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => Self::Pending,
            "sending" => Self::Sending,
            _ => Self::Other(s),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_owned()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_known_statuses_round_trip() {
        let s: OrderStatus = serde_json::from_str("\"sending\"").unwrap();
        assert_eq!(s, OrderStatus::Sending);
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"sending\"");
    }

    #[test]
    fn test_unknown_status_is_preserved() {
        let s: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(s, OrderStatus::Other("cancelled".to_string()));
        assert_eq!(s.label(), "Unknown status");
        assert_eq!(s.as_str(), "cancelled");
    }

    #[test]
    fn test_only_sending_is_final() {
        assert!(OrderStatus::Sending.is_final());
        assert!(!OrderStatus::Pending.is_final());
        assert!(!OrderStatus::Other("x".into()).is_final());
    }
}
