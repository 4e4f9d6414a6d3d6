//! Validation of the HTML forms both sites accept.
//!
//! Each form arrives as loosely typed strings. The types here check them once
//! and produce the exact JSON body the backend expects, so handlers never
//! build payloads by hand.

use core::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Value, json};

use crate::records::Ingredient;
use crate::types::{Email, EmailError, IngredientId, MemberId, Price};

/// A form field failed validation. Messages are shown to the user as-is.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error(transparent)]
    Email(#[from] EmailError),
    #[error("sex must be male or female")]
    InvalidSex,
    #[error("{field} must be a whole number")]
    NotAnInteger { field: &'static str },
    #[error("price must be a number of at least 0")]
    InvalidPrice,
    #[error("an ingredient cannot be both a favourite and an allergy")]
    PreferenceConflict,
    #[error("unknown profile field")]
    UnknownField,
    #[error("choose a member or send to everyone")]
    MissingRecipient,
}

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(value.to_string())
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

// =============================================================================
// Registration
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl FromStr for Sex {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            _ => Err(ValidationError::InvalidSex),
        }
    }
}

/// Registration form as submitted.
#[derive(Clone, Default)]
pub struct RegistrationInput {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub sex: String,
    pub password: String,
    pub confirm_password: String,
}

/// Body of `POST /member/memberRegister`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub name: String,
    pub phone: String,
    pub email: Email,
    pub sex: Sex,
    pass: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("phone", &self.phone)
            .field("email", &self.email)
            .field("sex", &self.sex)
            .field("pass", &"[REDACTED]")
            .finish()
    }
}

impl Registration {
    pub const MIN_PASSWORD_LENGTH: usize = 8;

    /// Check a submitted registration form.
    ///
    /// # Errors
    ///
    /// The first failing rule, checked in form order.
    pub fn validate(input: &RegistrationInput) -> Result<Self, ValidationError> {
        let name = required(&input.name, "name")?;
        let phone = required(&input.phone, "phone")?;
        let email = Email::parse(&input.email)?;
        let sex = input.sex.parse()?;

        if input.password.is_empty() {
            return Err(ValidationError::Required("password"));
        }
        if input.password.chars().count() < Self::MIN_PASSWORD_LENGTH {
            return Err(ValidationError::PasswordTooShort {
                min: Self::MIN_PASSWORD_LENGTH,
            });
        }
        if input.password != input.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }

        Ok(Self {
            name,
            phone,
            email,
            sex,
            pass: input.password.clone(),
        })
    }
}

// =============================================================================
// Preferences
// =============================================================================

/// Which preference list is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceKind {
    Favorites,
    Allergies,
}

impl PreferenceKind {
    /// Collection path; append `/{member_id}` to read.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Favorites => "/member-favorites",
            Self::Allergies => "/member-allergies",
        }
    }

    /// Key the id list is sent under.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::Favorites => "fruits",
            Self::Allergies => "allergies",
        }
    }
}

/// A new favourites or allergies list for one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceSelection {
    pub kind: PreferenceKind,
    pub member_id: MemberId,
    pub ingredients: Vec<IngredientId>,
}

impl PreferenceSelection {
    /// Check the selection against the member's other list.
    ///
    /// # Errors
    ///
    /// [`ValidationError::PreferenceConflict`] when an ingredient appears on
    /// both lists.
    pub fn validate(&self, other_list: &[IngredientId]) -> Result<(), ValidationError> {
        if self.ingredients.iter().any(|id| other_list.contains(id)) {
            return Err(ValidationError::PreferenceConflict);
        }
        Ok(())
    }

    /// Body of the `PUT` request.
    #[must_use]
    pub fn payload(&self) -> Value {
        let mut body = json!({ "memberId": self.member_id });
        if let Value::Object(map) = &mut body {
            map.insert(self.kind.field().to_string(), json!(self.ingredients));
        }
        body
    }
}

/// Ingredients that may be picked as favourites: everything not on the
/// allergy list.
#[must_use]
pub fn favorite_options<'a>(all: &'a [Ingredient], allergies: &[Ingredient]) -> Vec<&'a Ingredient> {
    excluding(all, allergies)
}

/// Ingredients that may be marked as allergies: everything not a favourite.
#[must_use]
pub fn allergy_options<'a>(all: &'a [Ingredient], favorites: &[Ingredient]) -> Vec<&'a Ingredient> {
    excluding(all, favorites)
}

fn excluding<'a>(all: &'a [Ingredient], exclude: &[Ingredient]) -> Vec<&'a Ingredient> {
    all.iter()
        .filter(|i| !exclude.iter().any(|e| e.id == i.id))
        .collect()
}

/// Collect ids from repeated form fields (`ingredient=1&ingredient=4`).
/// Values that are not ids are ignored; duplicates are dropped.
#[must_use]
pub fn ids_from_pairs(pairs: &[(String, String)], key: &str) -> Vec<IngredientId> {
    let mut ids = Vec::new();
    for (_, v) in pairs.iter().filter(|(k, _)| k == key) {
        match v.parse::<IngredientId>() {
            Ok(id) if !ids.contains(&id) => ids.push(id),
            _ => {}
        }
    }
    ids
}

/// First value for `key` in a list of form pairs.
#[must_use]
pub fn pair_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

// =============================================================================
// Profile
// =============================================================================

/// A single editable profile field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Name,
    Phone,
    Address,
}

impl ProfileField {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Name => "/member/editName",
            Self::Phone => "/member/editPhone",
            Self::Address => "/member/editAddress",
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Address => "address",
        }
    }

    /// Validated request body for the new value.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Required`] for a blank value.
    pub fn payload(self, value: &str) -> Result<Value, ValidationError> {
        let value = required(value, self.key())?;
        let mut body = serde_json::Map::new();
        body.insert(self.key().to_string(), Value::String(value));
        Ok(Value::Object(body))
    }
}

impl FromStr for ProfileField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "phone" => Ok(Self::Phone),
            "address" => Ok(Self::Address),
            _ => Err(ValidationError::UnknownField),
        }
    }
}

// =============================================================================
// Notifications
// =============================================================================

/// Body of `POST /notifications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDraft {
    pub title: String,
    pub message: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<MemberId>,
    pub send_to_all: bool,
}

impl NotificationDraft {
    /// Broadcast announcing a newly added product.
    #[must_use]
    pub fn new_product(name: &str, description: &str) -> Self {
        Self {
            title: format!("New product: {name}"),
            message: description.to_string(),
            kind: Some("new_product".to_string()),
            expiry_date: None,
            user_id: None,
            send_to_all: true,
        }
    }

    /// # Errors
    ///
    /// Missing title or message, or no recipient when not sending to all.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::Required("title"));
        }
        if self.message.trim().is_empty() {
            return Err(ValidationError::Required("message"));
        }
        if !self.send_to_all && self.user_id.is_none() {
            return Err(ValidationError::MissingRecipient);
        }
        Ok(())
    }
}

/// Notification form as submitted by the admin console.
#[derive(Debug, Clone, Default)]
pub struct NotificationInput {
    pub title: String,
    pub message: String,
    pub kind: String,
    pub expiry_date: String,
    pub user_id: String,
    pub send_to_all: bool,
}

impl NotificationInput {
    /// # Errors
    ///
    /// See [`NotificationDraft::validate`]; also rejects a non-numeric member id.
    pub fn into_draft(self) -> Result<NotificationDraft, ValidationError> {
        let user_id = if self.send_to_all {
            None
        } else {
            optional(&self.user_id)
                .map(|raw| {
                    raw.parse::<MemberId>()
                        .map_err(|_| ValidationError::NotAnInteger { field: "member id" })
                })
                .transpose()?
        };
        let draft = NotificationDraft {
            title: self.title.trim().to_string(),
            message: self.message.trim().to_string(),
            kind: optional(&self.kind),
            expiry_date: optional(&self.expiry_date)
                .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
            user_id,
            send_to_all: self.send_to_all,
        };
        draft.validate()?;
        Ok(draft)
    }
}

// =============================================================================
// Products
// =============================================================================

/// Product form as submitted by the admin console.
#[derive(Debug, Clone, Default)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub kind: String,
    pub location: String,
    pub size: String,
    pub quantity_in_stock: String,
    pub price: String,
    pub image_url: String,
    pub is_visible: bool,
    pub ingredients: Vec<IngredientId>,
}

/// Body of `POST /products/add` and `PUT /products/update/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    pub size: String,
    pub quantity_in_stock: u32,
    pub price: Price,
    pub image_url: String,
    pub is_visible: bool,
    pub ingredients: Vec<IngredientId>,
}

impl ProductDraft {
    /// # Errors
    ///
    /// Blank name, a stock that is not a whole number, or a negative or
    /// non-numeric price.
    pub fn validate(input: ProductInput) -> Result<Self, ValidationError> {
        let name = required(&input.name, "name")?;

        let stock = input.quantity_in_stock.trim();
        let quantity_in_stock = if stock.is_empty() {
            0
        } else {
            stock.parse::<u32>().map_err(|_| ValidationError::NotAnInteger {
                field: "quantity in stock",
            })?
        };

        let price = Price::parse_lenient(&input.price).ok_or(ValidationError::InvalidPrice)?;
        if price.is_negative() {
            return Err(ValidationError::InvalidPrice);
        }

        Ok(Self {
            name,
            description: input.description.trim().to_string(),
            kind: input.kind.trim().to_string(),
            location: input.location.trim().to_string(),
            size: input.size.trim().to_string(),
            quantity_in_stock,
            price,
            image_url: input.image_url.trim().to_string(),
            is_visible: input.is_visible,
            ingredients: input.ingredients,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn registration() -> RegistrationInput {
        RegistrationInput {
            name: "Nok".into(),
            phone: "0812345678".into(),
            email: "nok@example.com".into(),
            sex: "female".into(),
            password: "longenough".into(),
            confirm_password: "longenough".into(),
        }
    }

    #[test]
    fn test_registration_payload() {
        let reg = Registration::validate(&registration()).unwrap();
        assert_eq!(
            serde_json::to_value(&reg).unwrap(),
            json!({
                "name": "Nok",
                "phone": "0812345678",
                "email": "nok@example.com",
                "sex": "female",
                "pass": "longenough"
            })
        );
        assert!(!format!("{reg:?}").contains("longenough"));
    }

    #[test]
    fn test_registration_rules() {
        let mut input = registration();
        input.password = "short".into();
        input.confirm_password = "short".into();
        assert_eq!(
            Registration::validate(&input),
            Err(ValidationError::PasswordTooShort { min: 8 })
        );

        let mut input = registration();
        input.confirm_password = "different!".into();
        assert_eq!(Registration::validate(&input), Err(ValidationError::PasswordMismatch));

        let mut input = registration();
        input.sex = "other".into();
        assert_eq!(Registration::validate(&input), Err(ValidationError::InvalidSex));

        let mut input = registration();
        input.name = "  ".into();
        assert_eq!(Registration::validate(&input), Err(ValidationError::Required("name")));
    }

    #[test]
    fn test_preference_conflict_and_payload() {
        let selection = PreferenceSelection {
            kind: PreferenceKind::Allergies,
            member_id: MemberId::new(3),
            ingredients: vec![IngredientId::new(1), IngredientId::new(2)],
        };
        assert_eq!(
            selection.validate(&[IngredientId::new(2)]),
            Err(ValidationError::PreferenceConflict)
        );
        assert!(selection.validate(&[IngredientId::new(9)]).is_ok());
        assert_eq!(selection.payload(), json!({ "memberId": 3, "allergies": [1, 2] }));
    }

    #[test]
    fn test_options_exclude_other_list() {
        let all: Vec<Ingredient> = serde_json::from_value(json!([
            { "id": 1, "name": "Mango" },
            { "id": 2, "name": "Peanut" },
            { "id": 3, "name": "Coconut" }
        ]))
        .unwrap();
        let allergies = vec![all[1].clone()];
        let names: Vec<&str> = favorite_options(&all, &allergies)
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["Mango", "Coconut"]);
        assert_eq!(allergy_options(&all, &[]).len(), 3);
    }

    #[test]
    fn test_ids_from_pairs() {
        let pairs = vec![
            ("ingredient".to_string(), "4".to_string()),
            ("other".to_string(), "5".to_string()),
            ("ingredient".to_string(), "x".to_string()),
            ("ingredient".to_string(), "4".to_string()),
            ("ingredient".to_string(), "1".to_string()),
        ];
        assert_eq!(
            ids_from_pairs(&pairs, "ingredient"),
            vec![IngredientId::new(4), IngredientId::new(1)]
        );
        assert_eq!(pair_value(&pairs, "other"), Some("5"));
    }

    #[test]
    fn test_profile_field() {
        let field: ProfileField = "Address".parse().unwrap();
        assert_eq!(field.path(), "/member/editAddress");
        assert_eq!(field.payload(" 9 Silom ").unwrap(), json!({ "address": "9 Silom" }));
        assert!(field.payload("").is_err());
        assert!("email".parse::<ProfileField>().is_err());
    }

    #[test]
    fn test_notification_recipient_rules() {
        let input = NotificationInput {
            title: "Promo".into(),
            message: "Half price".into(),
            ..Default::default()
        };
        assert_eq!(input.clone().into_draft(), Err(ValidationError::MissingRecipient));

        let draft = NotificationInput {
            user_id: "12".into(),
            expiry_date: "2024-12-31".into(),
            ..input.clone()
        }
        .into_draft()
        .unwrap();
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            json!({
                "title": "Promo",
                "message": "Half price",
                "expiryDate": "2024-12-31",
                "userId": 12,
                "sendToAll": false
            })
        );

        let all = NotificationInput { send_to_all: true, user_id: "12".into(), ..input }
            .into_draft()
            .unwrap();
        assert_eq!(all.user_id, None);
    }

    #[test]
    fn test_new_product_announcement() {
        let draft = NotificationDraft::new_product("Thai Tea", "Strong and sweet");
        assert_eq!(draft.title, "New product: Thai Tea");
        assert!(draft.send_to_all);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_product_draft() {
        let input = ProductInput {
            name: "Thai Tea".into(),
            price: "45.5".into(),
            quantity_in_stock: "20".into(),
            is_visible: true,
            ingredients: vec![IngredientId::new(2)],
            ..Default::default()
        };
        let draft = ProductDraft::validate(input.clone()).unwrap();
        assert_eq!(draft.price, Price::from_satang(4_550));
        assert_eq!(draft.quantity_in_stock, 20);

        let body = serde_json::to_value(&draft).unwrap();
        assert_eq!(body["type"], "");
        assert_eq!(body["ingredients"], json!([2]));

        let bad_price = ProductInput { price: "-1".into(), ..input.clone() };
        assert_eq!(ProductDraft::validate(bad_price), Err(ValidationError::InvalidPrice));

        let bad_stock = ProductInput { quantity_in_stock: "2.5".into(), ..input };
        assert!(matches!(
            ProductDraft::validate(bad_stock),
            Err(ValidationError::NotAnInteger { .. })
        ));
    }
}
