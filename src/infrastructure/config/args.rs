use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::app_config::LogLevel;
use crate::domain::entities::{EmbedSpec, MessageId, SendOptions};

#[derive(Debug, Parser)]
#[command(
    name = "oxinbox",
    version,
    about = "Discord bot gateway adapter with a bounded inbox",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", env = "OXINBOX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Environment variable holding the bot token.
    #[arg(long, value_name = "NAME")]
    pub token_env: Option<String>,

    /// Seconds to wait for the gateway to become ready.
    #[arg(long, value_name = "SECS")]
    pub connect_timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Connect and print the adapter status.
    Status,

    /// List the servers the bot belongs to.
    Servers,

    /// List the text channels of a server.
    Channels {
        /// Server id.
        server: u64,
    },

    /// Send a message, optionally as an embed.
    Send(SendArgs),

    /// Print recent messages, oldest first.
    Read {
        channel: u64,

        /// Number of messages (1-50).
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Search the last 100 messages of a channel.
    Search {
        channel: u64,

        query: String,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Resolve an invite and report whether the bot can join.
    Join {
        /// Invite code or URL.
        invite: String,
    },

    /// Stay connected and print inbox items as they arrive.
    Watch {
        /// Seconds between inbox drains.
        #[arg(short, long, default_value_t = 5)]
        interval: u64,

        /// Items drained per tick.
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct SendArgs {
    pub channel: u64,

    pub content: String,

    /// Send as an embed with this title.
    #[arg(long)]
    pub title: Option<String>,

    /// Embed color as hex, e.g. `ff8800`.
    #[arg(long, value_parser = parse_color)]
    pub color: Option<u32>,

    /// Message id to reply to.
    #[arg(long, value_name = "MESSAGE")]
    pub reply_to: Option<u64>,
}

impl SendArgs {
    /// A title or color turns the message into an embed.
    #[must_use]
    pub fn options(&self) -> SendOptions {
        let mut options = SendOptions::default();
        if self.title.is_some() || self.color.is_some() {
            options = options.with_embed(EmbedSpec {
                title: self.title.clone(),
                description: None,
                color: self.color,
            });
        }
        if let Some(reply_to) = self.reply_to {
            options = options.with_reply(MessageId(reply_to));
        }
        options
    }
}

fn parse_color(value: &str) -> Result<u32, String> {
    let hex = value.trim_start_matches('#').trim_start_matches("0x");
    u32::from_str_radix(hex, 16)
        .ok()
        .filter(|color| *color <= 0x00ff_ffff)
        .ok_or_else(|| format!("'{value}' is not a hex RGB color"))
}
