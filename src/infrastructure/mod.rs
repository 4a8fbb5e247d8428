//! Infrastructure layer with configuration and the Discord platform adapter.

/// Configuration, CLI arguments, and credential sources.
pub mod config;
/// Discord REST and gateway adapter.
pub mod discord;

pub use config::{AppConfig, CliArgs, Command, EnvCredentialSource, LogLevel, StorageManager};
pub use discord::{DiscordConnector, DiscordRestClient};
