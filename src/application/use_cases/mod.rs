//! Use case implementations.

mod connection_manager;
mod outbound_commands;
mod status_reporter;

pub use connection_manager::{ConnectionContext, ConnectionManager};
pub use outbound_commands::{OutboundCommands, READ_LIMIT_MAX, SEARCH_DEPTH};
pub use status_reporter::StatusReporter;
