//! Environment-based bot token source.

use tracing::debug;

use super::app_config::DEFAULT_TOKEN_ENV;
use crate::domain::entities::AuthToken;
use crate::domain::ports::CredentialSource;

/// Reads the bot token from an environment variable on every connect.
#[derive(Debug, Clone)]
pub struct EnvCredentialSource {
    var: String,
}

impl EnvCredentialSource {
    #[must_use]
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    #[must_use]
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvCredentialSource {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_ENV)
    }
}

impl CredentialSource for EnvCredentialSource {
    fn credential(&self) -> Option<AuthToken> {
        let token = std::env::var(&self.var).ok().and_then(AuthToken::new);
        if token.is_none() {
            debug!(var = %self.var, "No bot token in environment");
        }
        token
    }
}
