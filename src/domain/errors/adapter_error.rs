//! Adapter error taxonomy.

use std::time::Duration;

use thiserror::Error;

/// Result alias used by every public adapter operation.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Adapter error variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum AdapterError {
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("a connection attempt is already in progress")]
    ConcurrentOperation,

    #[error("timed out after {}s waiting for the gateway to become ready", .timeout.as_secs())]
    ConnectionTimeout { timeout: Duration },

    #[error("login failed: {message}")]
    LoginFailure { message: String },

    #[error("not connected to Discord")]
    NotConnected,

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    #[error("channel {id} not found or not writable")]
    ChannelNotFound { id: String },

    #[error("invalid invite: {message}")]
    InvalidInvite { message: String },

    #[error("platform error: {message}")]
    TransientPlatform { message: String },
}

impl AdapterError {
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn login(message: impl Into<String>) -> Self {
        Self::LoginFailure {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn server_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            resource: "server",
            id: id.to_string(),
        }
    }

    #[must_use]
    pub fn channel_not_found(id: impl ToString) -> Self {
        Self::ChannelNotFound { id: id.to_string() }
    }

    #[must_use]
    pub fn invalid_invite(message: impl Into<String>) -> Self {
        Self::InvalidInvite {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn platform(message: impl Into<String>) -> Self {
        Self::TransientPlatform {
            message: message.into(),
        }
    }

    /// Whether calling the same operation again may succeed without user action.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ConcurrentOperation
                | Self::ConnectionTimeout { .. }
                | Self::LoginFailure { .. }
                | Self::NotConnected
                | Self::TransientPlatform { .. }
        )
    }

    /// Short machine-readable code for host transports.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::ConcurrentOperation => "concurrent_operation",
            Self::ConnectionTimeout { .. } => "connection_timeout",
            Self::LoginFailure { .. } => "login_failure",
            Self::NotConnected => "not_connected",
            Self::NotFound { .. } => "not_found",
            Self::ChannelNotFound { .. } => "channel_not_found",
            Self::InvalidInvite { .. } => "invalid_invite",
            Self::TransientPlatform { .. } => "platform",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_recoverability() {
        assert!(AdapterError::login("bad gateway").is_recoverable());
        assert!(
            AdapterError::ConnectionTimeout {
                timeout: Duration::from_secs(15)
            }
            .is_recoverable()
        );
        assert!(!AdapterError::configuration("missing token").is_recoverable());
        assert!(!AdapterError::channel_not_found(1).is_recoverable());
    }

    #[test]
    fn test_error_messages_are_readable() {
        let timeout = AdapterError::ConnectionTimeout {
            timeout: Duration::from_secs(15),
        };
        assert_eq!(
            timeout.to_string(),
            "timed out after 15s waiting for the gateway to become ready"
        );
        assert_eq!(
            AdapterError::server_not_found(12).to_string(),
            "server not found: 12"
        );
        assert_eq!(AdapterError::NotConnected.code(), "not_connected");
    }
}
