#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
//! Shared HTTP DTOs for the bookstore REST API.
//!
//! These types are re-used by the client and the CLI for request/response
//! encoding so the wire contract lives in a single place. Field names follow
//! the backend's camelCase JSON.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Minimum price accepted by the backend for a book.
pub const MIN_BOOK_PRICE: f64 = 1.0;

/// Errors raised while building or validating request payloads.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    /// Role string did not match any known role.
    #[error("unknown role '{value}'")]
    UnknownRole {
        /// Raw role value supplied by the caller.
        value: String,
    },
    /// A field failed validation.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable reason.
        reason: &'static str,
    },
    /// A partial update carried no fields.
    #[error("at least one field must be supplied")]
    EmptyPatch,
    /// An order request referenced no books.
    #[error("an order must reference at least one book")]
    EmptyOrder,
}

/// Account role governing what a user may see and do.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full access, including user management.
    Admin,
    /// Catalog management and visibility into every order.
    Moderator,
    /// Regular customer.
    User,
}

impl Role {
    /// All roles, for exhaustive iteration in tables and tests.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Admin, Self::Moderator, Self::User]
    }

    /// Wire representation of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Moderator => "MODERATOR",
            Self::User => "USER",
        }
    }
}

impl Display for Role {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::all()
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ModelError::UnknownRole {
                value: value.to_string(),
            })
    }
}

/// Profile of an authenticated account as reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    /// Account identifier.
    pub id: i64,
    /// Login name.
    pub username: String,
    /// Assigned role.
    pub role: Role,
}

/// Username/password pair used by login and registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// Login name.
    pub username: String,
    /// Plain-text password, sent only over the login/register calls.
    pub password: String,
}

impl Credentials {
    /// Reject blank usernames or passwords before contacting the backend.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidField`] naming the blank field.
    pub fn validate(&self) -> Result<(), ModelError> {
        require_text("username", &self.username)?;
        require_text("password", &self.password)
    }
}

/// Opaque bearer token returned by login and registration.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    /// Token value.
    pub token: String,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TokenResponse")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    /// Book identifier.
    pub id: i64,
    /// Title.
    pub title: String,
    /// Author.
    pub author: String,
    /// Unit price.
    pub price: f64,
    /// Free-form description.
    pub description: String,
}

/// Full book payload for create (`POST`) and replace (`PUT`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookInput {
    /// Title.
    pub title: String,
    /// Author.
    pub author: String,
    /// Unit price.
    pub price: f64,
    /// Free-form description.
    pub description: String,
}

impl BookInput {
    /// Apply the same rules the backend enforces so obviously bad input never leaves the client.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidField`] for blank text fields or a price below
    /// [`MIN_BOOK_PRICE`].
    pub fn validate(&self) -> Result<(), ModelError> {
        require_text("title", &self.title)?;
        require_text("author", &self.author)?;
        if !self.price.is_finite() || self.price < MIN_BOOK_PRICE {
            return Err(ModelError::InvalidField {
                field: "price",
                reason: "must be at least 1",
            });
        }
        require_text("description", &self.description)
    }
}

/// Partial book update (`PATCH`); absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BookPatch {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New author.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// New price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl BookPatch {
    /// Whether the patch carries no changes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.price.is_none()
            && self.description.is_none()
    }

    /// Promote the patch to a full replacement when every field is present.
    ///
    /// # Errors
    ///
    /// Hands the patch back unchanged when any field is missing.
    pub fn into_full(self) -> Result<BookInput, Self> {
        match self {
            Self {
                title: Some(title),
                author: Some(author),
                price: Some(price),
                description: Some(description),
            } => Ok(BookInput {
                title,
                author,
                price,
                description,
            }),
            partial => Err(partial),
        }
    }

    /// Validate the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EmptyPatch`] when nothing is set, otherwise the first
    /// field-level failure.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.is_empty() {
            return Err(ModelError::EmptyPatch);
        }
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(author) = &self.author {
            require_text("author", author)?;
        }
        if let Some(price) = self.price {
            if !price.is_finite() || price < MIN_BOOK_PRICE {
                return Err(ModelError::InvalidField {
                    field: "price",
                    reason: "must be at least 1",
                });
            }
        }
        if let Some(description) = &self.description {
            require_text("description", description)?;
        }
        Ok(())
    }
}

/// Body for placing or editing an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Books included in the order.
    pub book_ids: Vec<i64>,
}

impl OrderRequest {
    /// Build a request, rejecting empty selections.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EmptyOrder`] when `book_ids` is empty.
    pub fn new(book_ids: Vec<i64>) -> Result<Self, ModelError> {
        if book_ids.is_empty() {
            return Err(ModelError::EmptyOrder);
        }
        Ok(Self { book_ids })
    }
}

/// Order as rendered by list, detail and create responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderInfo {
    /// Order identifier.
    pub id: i64,
    /// Creation timestamp (backend local time).
    #[serde(with = "timestamp", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    /// Username of the owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Ordered books.
    #[serde(default)]
    pub books: Vec<Book>,
    /// Sum of the book prices.
    pub total_price: f64,
}

/// Order as returned by the replace (`PUT`) endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    /// Order identifier.
    pub id: i64,
    /// Creation timestamp (backend local time).
    #[serde(with = "timestamp", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    /// Owner account identifier.
    pub user_id: i64,
    /// Books included in the order.
    #[serde(default)]
    pub book_ids: Vec<i64>,
    /// Sum of the book prices.
    pub total_price: f64,
}

/// Partial account update sent by administrators.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserUpdate {
    /// New login name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// New role.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl UserUpdate {
    /// Validate that the update changes something and that a new username is not blank.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EmptyPatch`] or [`ModelError::InvalidField`].
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.username.is_none() && self.role.is_none() {
            return Err(ModelError::EmptyPatch);
        }
        if let Some(username) = &self.username {
            require_text("username", username)?;
        }
        Ok(())
    }
}

/// Extract a human-readable message from a backend failure body.
///
/// The backend replies with `{"message": ..}`, `{"error": ..}` or, for
/// validation failures, a map of field name to message. Field messages are
/// joined in field-name order. Bodies that are not JSON (proxy error pages,
/// plain text) carry no usable message.
#[must_use]
pub fn backend_message(body: &[u8]) -> Option<String> {
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return None;
    };
    let Value::Object(map) = value else {
        return value
            .as_str()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);
    };

    for key in ["message", "error"] {
        if let Some(text) = map.get(key).and_then(Value::as_str) {
            let text = text.trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }

    let fields: BTreeMap<&str, &str> = map
        .iter()
        .filter_map(|(key, value)| value.as_str().map(|text| (key.as_str(), text.trim())))
        .filter(|(_, text)| !text.is_empty())
        .collect();
    if fields.is_empty() {
        None
    } else {
        Some(
            fields
                .into_iter()
                .map(|(field, text)| format!("{field}: {text}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        Err(ModelError::InvalidField {
            field,
            reason: "must not be blank",
        })
    } else {
        Ok(())
    }
}

/// `yyyy-MM-dd HH:mm:ss` timestamps as emitted by the backend.
mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    #[allow(clippy::ref_option)]
    pub(super) fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_str(&value.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|text| {
            NaiveDateTime::parse_from_str(&text, FORMAT).map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_uses_upper_case_wire_names() {
        let encoded = serde_json::to_value(Role::Moderator).expect("encode role");
        assert_eq!(encoded, json!("MODERATOR"));
        let decoded: Role = serde_json::from_value(json!("ADMIN")).expect("decode role");
        assert_eq!(decoded, Role::Admin);
        assert!(serde_json::from_value::<Role>(json!("admin")).is_err());
    }

    #[test]
    fn every_role_parses_from_its_wire_name() {
        for role in Role::all() {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
            assert_eq!(role.as_str().to_lowercase().parse::<Role>(), Ok(role));
        }
    }

    #[test]
    fn role_parses_cli_input_case_insensitively() {
        assert_eq!("user".parse::<Role>(), Ok(Role::User));
        assert_eq!(" Moderator ".parse::<Role>(), Ok(Role::Moderator));
        assert!(matches!(
            "root".parse::<Role>(),
            Err(ModelError::UnknownRole { value }) if value == "root"
        ));
    }

    #[test]
    fn order_info_decodes_backend_payload() {
        let payload = json!({
            "id": 7,
            "createdAt": "2025-05-21 18:30:05",
            "user": "reader",
            "books": [{
                "id": 5,
                "title": "Dune",
                "author": "Frank Herbert",
                "price": 12.5,
                "description": "Spice"
            }],
            "totalPrice": 12.5
        });
        let order: OrderInfo = serde_json::from_value(payload).expect("decode order");
        assert_eq!(order.id, 7);
        assert_eq!(order.user.as_deref(), Some("reader"));
        assert_eq!(order.books.len(), 1);
        let created = order.created_at.expect("timestamp present");
        assert_eq!(created.format("%H:%M:%S").to_string(), "18:30:05");
    }

    #[test]
    fn order_info_tolerates_missing_owner() {
        let payload = json!({"id": 1, "createdAt": null, "books": [], "totalPrice": 0.0});
        let order: OrderInfo = serde_json::from_value(payload).expect("decode order");
        assert!(order.user.is_none());
        assert!(order.created_at.is_none());
    }

    #[test]
    fn order_request_serialises_book_ids_in_camel_case() {
        let request = OrderRequest::new(vec![5]).expect("non-empty order");
        assert_eq!(
            serde_json::to_value(&request).expect("encode"),
            json!({"bookIds": [5]})
        );
        assert_eq!(OrderRequest::new(Vec::new()), Err(ModelError::EmptyOrder));
    }

    #[test]
    fn book_input_validation_mirrors_backend_rules() {
        let mut input = BookInput {
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            price: 12.0,
            description: "Spice".into(),
        };
        assert!(input.validate().is_ok());

        input.price = 0.5;
        assert_eq!(
            input.validate(),
            Err(ModelError::InvalidField {
                field: "price",
                reason: "must be at least 1"
            })
        );

        input.price = 3.0;
        input.author = "  ".into();
        assert!(matches!(
            input.validate(),
            Err(ModelError::InvalidField { field: "author", .. })
        ));
    }

    #[test]
    fn book_patch_skips_absent_fields_and_rejects_empty() {
        let patch = BookPatch {
            price: Some(20.0),
            ..BookPatch::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).expect("encode"),
            json!({"price": 20.0})
        );
        assert!(patch.validate().is_ok());
        assert_eq!(BookPatch::default().validate(), Err(ModelError::EmptyPatch));
    }

    #[test]
    fn book_patch_promotes_to_full_input_only_when_complete() {
        let partial = BookPatch {
            title: Some("Dune".into()),
            ..BookPatch::default()
        };
        assert!(partial.into_full().is_err());

        let complete = BookPatch {
            title: Some("Dune".into()),
            author: Some("Frank Herbert".into()),
            price: Some(9.0),
            description: Some("Spice".into()),
        };
        let full = complete.into_full().expect("complete patch");
        assert_eq!(full.title, "Dune");
    }

    #[test]
    fn user_update_requires_a_change() {
        assert_eq!(UserUpdate::default().validate(), Err(ModelError::EmptyPatch));
        let update = UserUpdate {
            username: None,
            role: Some(Role::Moderator),
        };
        assert_eq!(
            serde_json::to_value(&update).expect("encode"),
            json!({"role": "MODERATOR"})
        );
    }

    #[test]
    fn backend_message_prefers_message_then_error() {
        assert_eq!(
            backend_message(br#"{"message":"Books not found","error":"x"}"#).as_deref(),
            Some("Books not found")
        );
        assert_eq!(
            backend_message(br#"{"error":"Access denied"}"#).as_deref(),
            Some("Access denied")
        );
    }

    #[test]
    fn backend_message_joins_field_errors_in_order() {
        let body = br#"{"title":"Title is required","price":"Price must be at least 1"}"#;
        assert_eq!(
            backend_message(body).as_deref(),
            Some("price: Price must be at least 1; title: Title is required")
        );
    }

    #[test]
    fn backend_message_handles_empty_and_plain_bodies() {
        assert_eq!(backend_message(b""), None);
        assert_eq!(backend_message(b"{}"), None);
        assert_eq!(backend_message(br#"{"message":"  "}"#), None);
        assert_eq!(backend_message(b"  gateway timeout \n"), None);
    }

    #[test]
    fn html_error_page_is_not_a_message() {
        let page = b"<html>\r\n<head><title>502 Bad Gateway</title></head>\r\n\
<body><center><h1>502 Bad Gateway</h1></center><hr><center>nginx</center></body>\r\n</html>\r\n";
        assert_eq!(backend_message(page), None);
    }

    #[test]
    fn token_response_debug_is_redacted() {
        let token = TokenResponse {
            token: "secret-token".into(),
        };
        assert!(!format!("{token:?}").contains("secret-token"));
    }
}
