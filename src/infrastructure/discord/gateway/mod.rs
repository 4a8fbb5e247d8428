//! Discord gateway: socket transport, session supervision and guild cache.

mod cache;
mod connection;
mod constants;
mod error;
mod events;
mod payloads;
mod runner;
mod session;

pub use cache::GuildCache;
pub use connection::{GatewayConnection, WebSocketConnection};
pub use constants::{GATEWAY_URL, GatewayIntents, GatewayOpcode};
pub use error::{CloseAction, GatewayError, GatewayResult};
pub use events::{DispatchEvent, EventParser};
pub use runner::{GatewayRunner, ReadySender, RunnerConfig};
pub use session::SessionInfo;
