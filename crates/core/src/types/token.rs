//! Cart-link session token.

use core::fmt;
use core::str::FromStr;

use secrecy::{ExposeSecret, SecretString};

/// Number of leading characters shown when a token is logged.
const VISIBLE_PREFIX: usize = 8;

/// Errors that can occur when parsing a [`SessionToken`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The input is empty or whitespace.
    #[error("session token cannot be empty")]
    Empty,
    /// The input contains characters that cannot appear in a URL path segment.
    #[error("session token contains invalid character {0:?}")]
    InvalidCharacter(char),
    /// The input is `.` or `..`, which URL paths collapse.
    #[error("session token cannot be a dot segment")]
    DotSegment,
}

/// The token embedded in a cart link.
///
/// Anyone holding the token can complete the cart, so the value is kept in a
/// [`SecretString`]. `Debug` and `Display` only show the first eight
/// characters.
#[derive(Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    /// Parse a token, rejecting empty values and path separators.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is blank, is `.` or `..`, or contains
    /// `/`, `?`, `#` or whitespace.
    pub fn parse(s: &str) -> Result<Self, TokenError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TokenError::Empty);
        }

        if let Some(c) = s
            .chars()
            .find(|c| matches!(c, '/' | '?' | '#') || c.is_whitespace())
        {
            return Err(TokenError::InvalidCharacter(c));
        }

        if matches!(s, "." | "..") {
            return Err(TokenError::DotSegment);
        }

        Ok(Self(SecretString::from(s.to_owned())))
    }

    /// The raw token, for building request paths.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// A log-safe rendering of the token.
    #[must_use]
    pub fn redacted(&self) -> String {
        let token = self.expose();
        if token.chars().count() <= VISIBLE_PREFIX {
            return token.to_owned();
        }
        let prefix: String = token.chars().take(VISIBLE_PREFIX).collect();
        format!("{prefix}…")
    }
}

impl FromStr for SessionToken {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq for SessionToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for SessionToken {}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionToken").field(&self.redacted()).finish()
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_token() {
        let token = SessionToken::parse("  3f9a1c27e4b84d0f  ").unwrap();
        assert_eq!(token.expose(), "3f9a1c27e4b84d0f");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(SessionToken::parse("   "), Err(TokenError::Empty));
    }

    #[test]
    fn test_parse_rejects_path_separator() {
        assert_eq!(
            SessionToken::parse("abc/def"),
            Err(TokenError::InvalidCharacter('/'))
        );
    }

    #[test]
    fn test_parse_rejects_dot_segments() {
        assert_eq!(SessionToken::parse(".."), Err(TokenError::DotSegment));
        assert_eq!(SessionToken::parse(" . "), Err(TokenError::DotSegment));
        assert!(SessionToken::parse("...").is_ok());
    }

    #[test]
    fn test_debug_redacts_token() {
        let token: SessionToken = "3f9a1c27e4b84d0f9e".parse().unwrap();
        let debug_output = format!("{token:?}");
        assert!(debug_output.contains("3f9a1c27…"));
        assert!(!debug_output.contains("3f9a1c27e4b84d0f9e"));
        assert_eq!(token.to_string(), "3f9a1c27…");
    }

    #[test]
    fn test_short_token_not_truncated() {
        let token = SessionToken::parse("abc").unwrap();
        assert_eq!(token.redacted(), "abc");
    }
}
