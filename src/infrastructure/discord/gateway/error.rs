use thiserror::Error;

use crate::domain::errors::AdapterError;

pub type GatewayResult<T> = Result<T, GatewayError>;

const AUTHENTICATION_FAILED: u16 = 4004;
const DISALLOWED_INTENTS: u16 = 4014;

/// What the runner does after the gateway closes a socket with a given code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseAction {
    /// Reconnect and resume the existing session.
    Resume,
    /// Reconnect with a fresh identify.
    Reidentify,
    /// Stop; retrying cannot succeed.
    Fatal,
}

impl CloseAction {
    /// Classifies a websocket close code. Non-gateway codes (1000-range) are
    /// treated as transport drops and resumed.
    #[must_use]
    pub const fn for_code(code: u16) -> Self {
        match code {
            // Invalid sequence, session timed out.
            4007 | 4009 => Self::Reidentify,
            // Bad token, sharding, API version, intents.
            4004 | 4010..=4014 => Self::Fatal,
            _ => Self::Resume,
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("connection closed with code {code}: {reason}")]
    ConnectionClosed { code: u16, reason: String },

    #[error("websocket error: {message}")]
    WebSocket { message: String },

    #[error("session invalidated (resumable: {resumable})")]
    SessionInvalidated { resumable: bool },

    #[error("heartbeat not acknowledged")]
    HeartbeatTimeout,

    #[error("reconnection limit exceeded after {attempts} attempts")]
    ReconnectionLimitExceeded { attempts: u32 },

    #[error("malformed gateway frame: {message}")]
    SerializationError { message: String },

    #[error("expected Hello, got opcode {opcode}")]
    UnexpectedOpcode { opcode: u8 },

    #[error("protocol error: {message}")]
    ProtocolError { message: String },

    #[error("timed out waiting for {operation}")]
    Timeout { operation: String },

    #[error("socket not open")]
    NotConnected,

    #[error("gateway shutting down")]
    ShuttingDown,
}

impl GatewayError {
    #[must_use]
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn websocket(message: impl Into<String>) -> Self {
        Self::WebSocket {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolError {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// How the runner should continue after this error.
    #[must_use]
    pub const fn action(&self) -> CloseAction {
        match self {
            Self::ConnectionClosed { code, .. } => CloseAction::for_code(*code),
            // Transport trouble leaves the server-side session intact.
            Self::SessionInvalidated { resumable: true }
            | Self::ConnectionFailed { .. }
            | Self::WebSocket { .. }
            | Self::Timeout { .. }
            | Self::HeartbeatTimeout => CloseAction::Resume,
            Self::SessionInvalidated { resumable: false }
            | Self::ProtocolError { .. }
            | Self::UnexpectedOpcode { .. } => CloseAction::Reidentify,
            Self::ReconnectionLimitExceeded { .. }
            | Self::SerializationError { .. }
            | Self::NotConnected
            | Self::ShuttingDown => CloseAction::Fatal,
        }
    }

    #[must_use]
    pub const fn should_reconnect(&self) -> bool {
        !matches!(self.action(), CloseAction::Fatal)
    }

    #[must_use]
    pub const fn can_resume(&self) -> bool {
        matches!(self.action(), CloseAction::Resume)
    }
}

impl From<GatewayError> for AdapterError {
    fn from(error: GatewayError) -> Self {
        match error {
            GatewayError::ConnectionClosed {
                code: AUTHENTICATION_FAILED,
                ..
            } => Self::login("invalid bot token"),
            GatewayError::ConnectionClosed {
                code: DISALLOWED_INTENTS,
                ..
            } => Self::login("disallowed intents: enable the Message Content intent for this bot"),
            ref fatal if matches!(fatal, GatewayError::ConnectionClosed { .. })
                && !fatal.should_reconnect() =>
            {
                Self::login(error.to_string())
            }
            other => Self::platform(other.to_string()),
        }
    }
}
