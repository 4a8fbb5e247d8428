//! Application configuration.

pub mod app_config;
pub mod args;
mod credentials;
pub mod storage;

pub use app_config::{AppConfig, DEFAULT_TOKEN_ENV, InboxConfig, LogLevel};
pub use args::{CliArgs, Command, SendArgs};
pub use credentials::EnvCredentialSource;
pub use storage::{ConfigError, StorageManager};
