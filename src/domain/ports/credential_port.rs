//! Credential lookup port.

use crate::domain::entities::AuthToken;

/// Supplies the bot token at connect time.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialSource: Send + Sync {
    /// Returns the configured token, if any.
    fn credential(&self) -> Option<AuthToken>;
}
