//! Response types for the attendance service endpoints.

use serde::{Deserialize, Serialize};

use super::id::UserId;
use super::model::Role;

/// Body of a successful `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token for subsequent calls.
    pub access_token: String,
    /// Role of the authenticated user.
    pub role: Role,
    /// Id of the authenticated user.
    pub user_id: UserId,
}

/// Acknowledgement returned by create/update endpoints.
///
/// Some endpoints answer with `{"message": ...}`, others with the created
/// object; both decode into this type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ack {
    /// Service message, when one was sent.
    #[serde(default)]
    pub message: Option<String>,
}

/// Error payload of a non-success response.
///
/// The service uses either `message` or FastAPI's `detail`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorPayload {
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// FastAPI error detail; a string for handled errors, a list for validation errors.
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ApiErrorPayload {
    /// The most specific message the payload carries.
    pub fn into_message(self) -> Option<String> {
        if let Some(message) = self.message.filter(|m| !m.is_empty()) {
            return Some(message);
        }
        match self.detail {
            Some(serde_json::Value::String(detail)) if !detail.is_empty() => Some(detail),
            Some(serde_json::Value::Array(items)) => items
                .first()
                .and_then(|item| item.get("msg"))
                .and_then(|msg| msg.as_str())
                .map(String::from),
            _ => None,
        }
    }
}

/// A response that is either one object or a sequence of them.
///
/// Attendance and statistics queries answer with a single block when they
/// resolve to one class and with an array otherwise. The shape is resolved
/// once at the gateway boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A sequence of objects.
    Many(Vec<T>),
    /// A single object.
    Single(T),
}

impl<T> OneOrMany<T> {
    /// Number of contained objects.
    pub fn len(&self) -> usize {
        match self {
            Self::Many(items) => items.len(),
            Self::Single(_) => 1,
        }
    }

    /// Whether this is an empty sequence.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the service returned a sequence.
    pub fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }

    /// Borrow the contained objects as a slice regardless of shape.
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::Many(items) => items,
            Self::Single(item) => std::slice::from_ref(item),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::model::AttendanceBlock;

    #[test]
    fn test_one_or_many_distinguishes_shapes() {
        let single: OneOrMany<AttendanceBlock> = serde_json::from_str(
            r#"{"classId":1,"date":"2024-03-01","isFilled":true,"records":[]}"#,
        )
        .unwrap();
        assert!(!single.is_many());

        let many: OneOrMany<AttendanceBlock> = serde_json::from_str(
            r#"[{"classId":1,"date":"2024-03-01","isFilled":true,"records":[]},
                {"classId":2,"date":"2024-03-01","isFilled":false,"records":[]}]"#,
        )
        .unwrap();
        assert!(many.is_many());
        assert_eq!(many.len(), 2);
        assert_eq!(many.as_slice()[1].class_id.get(), 2);
    }

    #[test]
    fn test_error_payload_prefers_message_then_detail() {
        let payload: ApiErrorPayload =
            serde_json::from_str(r#"{"message":"Nope","detail":"Other"}"#).unwrap();
        assert_eq!(payload.into_message().as_deref(), Some("Nope"));

        let payload: ApiErrorPayload = serde_json::from_str(r#"{"detail":"Forbidden"}"#).unwrap();
        assert_eq!(payload.into_message().as_deref(), Some("Forbidden"));

        let payload: ApiErrorPayload = serde_json::from_str(
            r#"{"detail":[{"loc":["query","date"],"msg":"field required"}]}"#,
        )
        .unwrap();
        assert_eq!(payload.into_message().as_deref(), Some("field required"));

        let payload: ApiErrorPayload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload.into_message(), None);
    }

    #[test]
    fn test_ack_accepts_created_object() {
        let ack: Ack =
            serde_json::from_str(r#"{"id":5,"login":"t","role":"teacher","classId":null}"#)
                .unwrap();
        assert!(ack.message.is_none());
    }
}
