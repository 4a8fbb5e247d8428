//! Application layer with the ingestion pipeline, use cases, and DTOs.

mod adapter;
/// Data transfer objects.
pub mod dto;
/// Ingestion services.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use adapter::{DEFAULT_DRAIN_LIMIT, GatewayAdapter};
pub use dto::{AdapterSettings, StatusReport};
pub use use_cases::{ConnectionManager, OutboundCommands, StatusReporter};
