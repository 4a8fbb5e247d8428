//! Bot token value object.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Discord bot token, masked in every formatted representation.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AuthToken {
    value: String,
}

impl AuthToken {
    /// Creates a token, rejecting blank values and stripping an optional `Bot ` prefix.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let raw = value.into();
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix("Bot ").unwrap_or(trimmed).trim();

        if trimmed.is_empty() {
            return None;
        }

        Some(Self {
            value: trimmed.to_string(),
        })
    }

    /// Returns token as string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Value for the HTTP `Authorization` header.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bot {}", self.value)
    }

    /// Returns masked token for display.
    #[must_use]
    pub fn masked(&self) -> String {
        if self.value.len() <= 10 {
            return "*".repeat(self.value.len());
        }

        let visible_prefix = &self.value[..4];
        let visible_suffix = &self.value[self.value.len() - 4..];
        format!("{visible_prefix}...{visible_suffix}")
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("value", &self.masked())
            .finish()
    }
}

impl fmt::Display for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_token_rejected() {
        assert!(AuthToken::new("").is_none());
        assert!(AuthToken::new("   ").is_none());
        assert!(AuthToken::new("Bot ").is_none());
    }

    #[test]
    fn test_bot_prefix_stripped() {
        let token = AuthToken::new("Bot abc.def.ghi").unwrap();
        assert_eq!(token.as_str(), "abc.def.ghi");
        assert_eq!(token.authorization_header(), "Bot abc.def.ghi");
    }

    #[test]
    fn test_token_masking() {
        let token = AuthToken::new("MTIzNDU2Nzg5MDEyMzQ1Njc4OQ.XXXXXX.YYYY").unwrap();
        assert_eq!(token.masked(), "MTIz...YYYY");
        assert!(!format!("{token:?}").contains("XXXXXX"));
    }

    #[test]
    fn test_short_token_fully_masked() {
        let token = AuthToken::new("short").unwrap();
        assert_eq!(token.to_string(), "*****");
    }
}
