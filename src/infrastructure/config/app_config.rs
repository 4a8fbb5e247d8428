//! Application configuration.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::args::CliArgs;
use crate::application::AdapterSettings;
use crate::application::services::{
    DEFAULT_DEDUP_CAPACITY, DEFAULT_DEDUP_EVICT_BATCH, DEFAULT_INBOX_CAPACITY,
};

pub(super) const APP_NAME: &str = "oxinbox";
pub(super) const APP_QUALIFIER: &str = "dev";
pub(super) const APP_ORGANIZATION: &str = "oxinbox";

/// Environment variable holding the bot token unless configured otherwise.
pub const DEFAULT_TOKEN_ENV: &str = "DISCORD_BOT_TOKEN";

/// Verbosity used when `RUST_LOG` is unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`.
    #[must_use]
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_directive())
    }
}

/// Application configuration, read from `config.toml` and overridden by CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Name of the environment variable holding the bot token.
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Seconds to wait for the gateway to become ready.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Capacity of the inbound event channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// Inbox and dedup limits.
    #[serde(default)]
    pub inbox: InboxConfig,
}

/// Bounded collection sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxConfig {
    #[serde(default = "default_inbox_capacity")]
    pub capacity: usize,

    #[serde(default = "default_dedup_capacity")]
    pub dedup_capacity: usize,

    /// Ids evicted at once when the dedup history is full.
    #[serde(default = "default_dedup_evict_batch")]
    pub dedup_evict_batch: usize,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_INBOX_CAPACITY,
            dedup_capacity: DEFAULT_DEDUP_CAPACITY,
            dedup_evict_batch: DEFAULT_DEDUP_EVICT_BATCH,
        }
    }
}

fn default_token_env() -> String {
    DEFAULT_TOKEN_ENV.to_string()
}

const fn default_connect_timeout_secs() -> u64 {
    15
}

const fn default_event_buffer() -> usize {
    256
}

const fn default_inbox_capacity() -> usize {
    DEFAULT_INBOX_CAPACITY
}

const fn default_dedup_capacity() -> usize {
    DEFAULT_DEDUP_CAPACITY
}

const fn default_dedup_evict_batch() -> usize {
    DEFAULT_DEDUP_EVICT_BATCH
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(token_env) = &args.token_env {
            self.token_env.clone_from(token_env);
        }
        if let Some(timeout) = args.connect_timeout {
            self.connect_timeout_secs = timeout;
        }
    }

    /// Adapter tunables derived from this configuration.
    ///
    /// Zero values fall back to the defaults, except the eviction batch which is
    /// raised to 1.
    #[must_use]
    pub fn adapter_settings(&self) -> AdapterSettings {
        let defaults = AdapterSettings::default();
        let timeout = if self.connect_timeout_secs == 0 {
            defaults.connect_timeout
        } else {
            Duration::from_secs(self.connect_timeout_secs)
        };
        let or_default = |value: usize, fallback: usize| if value == 0 { fallback } else { value };

        AdapterSettings::default()
            .with_connect_timeout(timeout)
            .with_event_buffer(or_default(self.event_buffer, defaults.event_buffer))
            .with_inbox_capacity(or_default(self.inbox.capacity, defaults.inbox_capacity))
            .with_dedup(
                or_default(self.inbox.dedup_capacity, defaults.dedup_capacity),
                self.inbox.dedup_evict_batch.max(1),
            )
    }

    /// `oxinbox.log` under the platform data directory.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("oxinbox.log"))
    }

    /// The configured log file, else the default one.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            log_level: LogLevel::Info,
            token_env: default_token_env(),
            connect_timeout_secs: default_connect_timeout_secs(),
            event_buffer: default_event_buffer(),
            inbox: InboxConfig::default(),
        }
    }
}
