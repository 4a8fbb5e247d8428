//! Domain entity definitions.

mod channel;
mod guild;
mod inbox;
mod invite;
mod message;
mod snowflake;
mod token;
mod user;

pub use channel::{ChannelInfo, ChannelKind, ChannelSummary};
pub use guild::{Guild, GuildSummary};
pub use inbox::{DIRECT_CHANNEL_NAME, InboxItem, InboxKind, InboxPeek};
pub use invite::{
    DEFAULT_BOT_PERMISSIONS, InviteCode, InviteInfo, JoinReport, authorize_url,
};
pub use message::{
    EmbedSpec, HistoryMessage, OutgoingBody, OutgoingMessage, RawMessage, SendOptions,
};
pub use snowflake::{ChannelId, GuildId, MessageId, UserId};
pub use token::AuthToken;
pub use user::{BotIdentity, MessageAuthor};
