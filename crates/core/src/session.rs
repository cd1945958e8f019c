//! Cart-link session state.
//!
//! [`Session`] is the backend's answer to "is this cart link still usable?".
//! [`SessionHolder`] is the client-side record of that answer: it starts out
//! empty and invalid and is only ever overwritten wholesale, never merged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CustomerId, SessionId, SessionToken, timestamp};

/// Fallback error text when the backend rejects a token without a message.
const INVALID_SESSION_MESSAGE: &str = "invalid cart session";

/// Response of `GET /api/cart/{token}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Session {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    /// Backend-defined cart metadata (e.g. suggested products).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart_data: Option<serde_json::Map<String, serde_json::Value>>,
    /// ISO-8601 expiry, with or without an offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    /// Machine-readable failure code such as `token_expired`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Human-readable failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Session {
    /// Parse `expires_at` as a UTC timestamp.
    ///
    /// Timestamps without an offset are taken to be UTC.
    #[must_use]
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        self.expires_at.as_deref().and_then(timestamp::parse)
    }

    /// Whether the session has expired at `now`.
    ///
    /// Sessions without a parseable expiry never expire client-side.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at_utc().is_some_and(|expires| expires <= now)
    }

    /// The error text to show for an invalid session.
    #[must_use]
    pub fn failure_message(&self) -> Option<String> {
        if self.valid {
            return None;
        }
        Some(
            self.message
                .clone()
                .or_else(|| self.error.clone())
                .unwrap_or_else(|| INVALID_SESSION_MESSAGE.to_string()),
        )
    }
}

/// Holds the validated token and its validity for one customer session.
///
/// Every setter replaces its field unconditionally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionHolder {
    token: Option<SessionToken>,
    valid: bool,
    error: Option<String>,
}

impl SessionHolder {
    /// An empty, invalid holder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            token: None,
            valid: false,
            error: None,
        }
    }

    #[must_use]
    pub const fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_token(&mut self, token: SessionToken) {
        self.token = Some(token);
    }

    pub const fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    /// Replace validity and error from a validation response.
    pub fn apply(&mut self, session: &Session) {
        self.valid = session.valid;
        self.error = session.failure_message();
    }

    /// Forget everything, returning to the startup state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Whether a checkout may be submitted.
    #[must_use]
    pub const fn can_checkout(&self) -> bool {
        self.token.is_some() && self.valid && self.error.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn token() -> SessionToken {
        SessionToken::parse("3f9a1c27e4b84d0f").unwrap()
    }

    #[test]
    fn test_holder_starts_empty_and_invalid() {
        let holder = SessionHolder::new();
        assert!(holder.token().is_none());
        assert!(!holder.is_valid());
        assert!(holder.error().is_none());
        assert!(!holder.can_checkout());
        assert_eq!(holder, SessionHolder::default());
    }

    #[test]
    fn test_setters_replace_whole_value() {
        let mut holder = SessionHolder::new();
        holder.set_error(Some("first".to_string()));
        holder.set_error(Some("second".to_string()));
        assert_eq!(holder.error(), Some("second"));

        holder.set_error(None);
        assert!(holder.error().is_none());

        holder.set_valid(true);
        holder.set_valid(false);
        assert!(!holder.is_valid());
    }

    #[test]
    fn test_apply_valid_session() {
        let mut holder = SessionHolder::new();
        holder.set_token(token());
        holder.set_error(Some("stale".to_string()));

        let session: Session = serde_json::from_str(
            r#"{"valid": true, "session_id": "s-1", "customer_id": "c-1",
                "cart_data": {"suggested_products": ["p-1"]},
                "expires_at": "2025-11-12T10:00:00"}"#,
        )
        .unwrap();
        holder.apply(&session);

        assert!(holder.is_valid());
        assert!(holder.error().is_none());
        assert!(holder.can_checkout());
    }

    #[test]
    fn test_apply_invalid_session_prefers_message() {
        let mut holder = SessionHolder::new();
        holder.set_token(token());

        let session = Session {
            valid: false,
            error: Some("token_expired".to_string()),
            message: Some("Este link expiró. Solicita uno nuevo.".to_string()),
            ..Session::default()
        };
        holder.apply(&session);

        assert!(!holder.is_valid());
        assert_eq!(holder.error(), Some("Este link expiró. Solicita uno nuevo."));
        assert!(!holder.can_checkout());
    }

    #[test]
    fn test_apply_invalid_session_without_text() {
        let mut holder = SessionHolder::new();
        holder.apply(&Session::default());
        assert_eq!(holder.error(), Some(INVALID_SESSION_MESSAGE));
    }

    #[test]
    fn test_reset() {
        let mut holder = SessionHolder::new();
        holder.set_token(token());
        holder.set_valid(true);
        holder.reset();
        assert_eq!(holder, SessionHolder::new());
    }

    #[test]
    fn test_expires_at_naive_and_offset() {
        let naive = Session {
            expires_at: Some("2025-11-12T10:00:00".to_string()),
            ..Session::default()
        };
        let offset = Session {
            expires_at: Some("2025-11-12T12:00:00+02:00".to_string()),
            ..Session::default()
        };
        let expected = Utc.with_ymd_and_hms(2025, 11, 12, 10, 0, 0).unwrap();
        assert_eq!(naive.expires_at_utc(), Some(expected));
        assert_eq!(offset.expires_at_utc(), Some(expected));
    }

    #[test]
    fn test_is_expired_at() {
        let session = Session {
            valid: true,
            expires_at: Some("2025-11-12T10:00:00.123456".to_string()),
            ..Session::default()
        };
        let before = Utc.with_ymd_and_hms(2025, 11, 12, 9, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 11, 12, 11, 0, 0).unwrap();
        assert!(!session.is_expired_at(before));
        assert!(session.is_expired_at(after));
        assert!(!Session::default().is_expired_at(after));
    }
}
