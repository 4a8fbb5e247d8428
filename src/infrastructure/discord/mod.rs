//! Discord platform adapter: REST client, gateway runner and port implementations.

mod dto;
pub mod gateway;
mod platform;
mod rest;

pub use gateway::{GatewayIntents, GuildCache, RunnerConfig};
pub use platform::{DiscordConnector, DiscordSession};
pub use rest::{DISCORD_API_BASE, DiscordRestClient};
