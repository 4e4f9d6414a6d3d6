//! Records owned by the backend.
//!
//! These mirror the JSON the backend returns. The client never creates them on
//! its own; it only reads, filters and groups them. Field names follow the
//! backend's camelCase.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{
    IngredientId, MemberId, NotificationId, OrderLineId, OrderStatus, Price, ProductId,
};

/// A beverage in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub size: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub quantity_in_stock: u32,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "visible_by_default")]
    pub is_visible: bool,
}

const fn visible_by_default() -> bool {
    true
}

impl Product {
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity_in_stock > 0
    }
}

/// A registered shop member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl Member {
    /// Orders can only be shipped to members with a non-blank address.
    #[must_use]
    pub fn has_address(&self) -> bool {
        self.address.as_deref().is_some_and(|a| !a.trim().is_empty())
    }
}

/// A fruit or other ingredient a drink can contain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
}

/// A message shown in the member's notification dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub expiry_date: Option<NaiveDate>,
}

/// Number of notifications the member has not opened yet.
#[must_use]
pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.is_read).count()
}

/// One product row of an order.
///
/// The backend stores an order as several rows sharing an order number, one per
/// product purchased. Older rows name the product column `packageId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(default)]
    pub id: Option<OrderLineId>,
    pub order_number: String,
    pub user_id: MemberId,
    #[serde(alias = "packageId")]
    pub product_id: ProductId,
    #[serde(deserialize_with = "lenient_u32")]
    pub quantity: u32,
    #[serde(default)]
    pub total_price: Price,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "status_or_default")]
    pub status: OrderStatus,
}

/// Accept integers, floats and numeric strings. Negative or unparsable values
/// become zero.
fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)
            })
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// Accept RFC 3339 timestamps; anything else is treated as unknown.
fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }))
}

/// Accept `YYYY-MM-DD` or a full RFC 3339 timestamp (its date part in UTC).
/// Blank, malformed or non-string values are treated as unknown.
fn lenient_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let Some(raw) = value.as_str().map(str::trim) else {
        return Ok(None);
    };
    Ok(NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    }))
}

/// `null` counts as a missing status.
fn status_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OrderStatus, D::Error> {
    Ok(Option::<OrderStatus>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_from_backend_json() {
        let product: Product = serde_json::from_value(json!({
            "id": 4,
            "name": "Mango Smoothie",
            "description": "Fresh mango",
            "type": "smoothie",
            "location": "Chiang Mai",
            "size": "16oz",
            "quantityInStock": "12",
            "price": 65,
            "imageUrl": "https://img.example/mango.png",
            "createdAt": "2024-08-01T10:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(product.id, ProductId::new(4));
        assert_eq!(product.kind, "smoothie");
        assert_eq!(product.quantity_in_stock, 12);
        assert_eq!(product.price, Price::from_satang(6_500));
        assert!(product.is_visible);
    }

    #[test]
    fn test_order_line_accepts_package_id_alias() {
        let line: OrderLine = serde_json::from_value(json!({
            "orderNumber": "1700000000000-12",
            "userId": 7,
            "packageId": 3,
            "quantity": 2,
            "totalPrice": "130.00",
            "createdAt": "2024-03-05T18:30:00Z",
            "status": "pending"
        }))
        .unwrap();

        assert_eq!(line.product_id, ProductId::new(3));
        assert_eq!(line.total_price, Price::from_satang(13_000));
        assert!(line.created_at.is_some());
    }

    #[test]
    fn test_bad_timestamp_is_none() {
        let line: OrderLine = serde_json::from_value(json!({
            "orderNumber": "x",
            "userId": 1,
            "productId": 1,
            "quantity": 1,
            "createdAt": "yesterday"
        }))
        .unwrap();
        assert_eq!(line.created_at, None);
        assert_eq!(line.status, OrderStatus::Pending);
    }

    #[test]
    fn test_null_status_is_pending() {
        let line: OrderLine = serde_json::from_value(json!({
            "orderNumber": "x",
            "userId": 1,
            "productId": 1,
            "quantity": 1,
            "status": null
        }))
        .unwrap();
        assert_eq!(line.status, OrderStatus::Pending);
    }

    #[test]
    fn test_notification_expiry_formats() {
        let notifications: Vec<Notification> = serde_json::from_str(
            r#"[
                { "id": 1, "title": "a", "expiryDate": "2024-04-01" },
                { "id": 2, "title": "b", "expiryDate": "2024-04-01T00:00:00.000Z" },
                { "id": 3, "title": "c", "expiryDate": "" },
                { "id": 4, "title": "d", "expiryDate": null },
                { "id": 5, "title": "e", "expiryDate": 20240401 }
            ]"#,
        )
        .unwrap();

        let april_first = NaiveDate::from_ymd_opt(2024, 4, 1);
        let dates: Vec<_> = notifications.iter().map(|n| n.expiry_date).collect();
        assert_eq!(dates, vec![april_first, april_first, None, None, None]);
    }

    #[test]
    fn test_member_address_check() {
        let mut member: Member = serde_json::from_value(json!({ "id": 1, "name": "Nok" })).unwrap();
        assert!(!member.has_address());
        member.address = Some("   ".into());
        assert!(!member.has_address());
        member.address = Some("12 Sukhumvit Rd".into());
        assert!(member.has_address());
    }

    #[test]
    fn test_unread_count() {
        let notifications: Vec<Notification> = serde_json::from_value(json!([
            { "id": 1, "title": "a", "isRead": true },
            { "id": 2, "title": "b", "isRead": false },
            { "id": 3, "title": "c" }
        ]))
        .unwrap();
        assert_eq!(unread_count(&notifications), 2);
    }
}
