//! Oxinbox - a single-connection Discord bot gateway adapter.
//!
//! The adapter keeps one gateway session alive, filters inbound messages
//! that concern the bot into a bounded, deduplicated inbox, and exposes a
//! small command surface for servers, channels, history, and invites.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the ingestion pipeline, use cases, and DTOs.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing configuration and the Discord adapter.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "oxinbox";
