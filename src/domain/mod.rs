//! Domain layer with core entities, errors, and port definitions.

/// Connection lifecycle definitions.
pub mod connection;
/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;
/// Serde utilities.
pub mod serde_utils;

pub use connection::ConnectionState;
pub use entities::{AuthToken, BotIdentity, InboxItem, InboxKind};
pub use errors::{AdapterError, AdapterResult};
pub use ports::{CredentialSource, PlatformConnector, PlatformSession};
