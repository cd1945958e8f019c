//! Backend error bodies.
//!
//! Failed requests answer with `{"detail": "..."}`; validation failures put
//! a list of field errors in `detail` instead.

use serde::Deserialize;

/// Maximum number of body characters kept in error messages.
pub const ERROR_MESSAGE_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Extract the human-readable message from an error body.
///
/// A string `detail` is returned whole; anything else is truncated.
#[must_use]
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorBody { detail }) => truncate(&detail.to_string(), ERROR_MESSAGE_LIMIT),
        Err(_) if body.trim().is_empty() => "Unknown error".to_string(),
        Err(_) => truncate(body, ERROR_MESSAGE_LIMIT),
    }
}

/// First `limit` characters of `s`.
#[must_use]
pub fn truncate(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_string() {
        assert_eq!(
            error_message(r#"{"detail": "Token inválido"}"#),
            "Token inválido"
        );
    }

    #[test]
    fn test_detail_structured() {
        let message =
            error_message(r#"{"detail": [{"loc": ["body", "total"], "msg": "field required"}]}"#);
        assert!(message.contains("field required"));
    }

    #[test]
    fn test_raw_body() {
        assert_eq!(error_message("Internal Server Error"), "Internal Server Error");
        assert_eq!(error_message(""), "Unknown error");
        assert_eq!(error_message(&"x".repeat(500)).len(), ERROR_MESSAGE_LIMIT);
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("ñandú", 3), "ñan");
    }
}
