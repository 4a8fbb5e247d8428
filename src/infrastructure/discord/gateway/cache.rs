//! Guild snapshot maintained from gateway events.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use super::events::DispatchEvent;
use crate::domain::entities::{Guild, GuildId, RawMessage};

#[derive(Debug, Default)]
pub struct GuildCache {
    guilds: RwLock<HashMap<GuildId, Guild>>,
}

impl GuildCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies guild and channel lifecycle events; anything else is ignored.
    pub fn apply(&self, event: DispatchEvent) {
        let mut guilds = self.guilds.write();
        match event {
            DispatchEvent::GuildCreate(guild) => {
                debug!(guild_id = %guild.id(), name = guild.name(), "Guild available");
                guilds.insert(guild.id(), guild);
            }
            DispatchEvent::GuildUpdate { guild_id, name } => {
                if let Some(guild) = guilds.get_mut(&guild_id) {
                    guild.set_name(name);
                }
            }
            DispatchEvent::GuildDelete {
                guild_id,
                unavailable: true,
            } => {
                if let Some(guild) = guilds.get_mut(&guild_id) {
                    debug!(guild_id = %guild_id, "Guild unavailable");
                    guild.mark_unavailable();
                }
            }
            DispatchEvent::GuildDelete { guild_id, .. } => {
                debug!(guild_id = %guild_id, "Guild removed");
                guilds.remove(&guild_id);
            }
            DispatchEvent::ChannelUpsert { guild_id, channel } => {
                if let Some(guild) = guilds.get_mut(&guild_id) {
                    guild.upsert_channel(channel);
                }
            }
            DispatchEvent::ChannelDelete {
                guild_id,
                channel_id,
            } => {
                if let Some(guild) = guilds.get_mut(&guild_id) {
                    guild.remove_channel(channel_id);
                }
            }
            DispatchEvent::Ready { .. }
            | DispatchEvent::Resumed
            | DispatchEvent::MessageCreate(_)
            | DispatchEvent::Other { .. } => {}
        }
    }

    /// Fills in guild and channel names for a guild message.
    pub fn annotate(&self, message: &mut RawMessage) {
        let Some(guild_id) = message.guild_id else {
            return;
        };
        let guilds = self.guilds.read();
        if let Some(guild) = guilds.get(&guild_id) {
            message.guild_name = Some(guild.name().to_string());
            if let Some(channel) = guild.channel(message.channel_id) {
                message.channel_name = Some(channel.name.clone());
            }
        }
    }

    /// Snapshot ordered by guild id.
    #[must_use]
    pub fn guilds(&self) -> Vec<Guild> {
        let mut guilds: Vec<Guild> = self.guilds.read().values().cloned().collect();
        guilds.sort_by_key(Guild::id);
        guilds
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.guilds.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guilds.read().is_empty()
    }

    pub fn clear(&self) {
        self.guilds.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        ChannelId, ChannelKind, ChannelSummary, MessageAuthor, MessageId, UserId,
    };

    fn cache_with_guild() -> GuildCache {
        let cache = GuildCache::new();
        cache.apply(DispatchEvent::GuildCreate(
            Guild::new(GuildId(1), "Rustaceans").with_channels(vec![ChannelSummary::new(
                ChannelId(10),
                "general",
                ChannelKind::Text,
            )]),
        ));
        cache
    }

    fn message(guild: Option<GuildId>, channel: u64) -> RawMessage {
        let mut msg = RawMessage::new(
            MessageId(1),
            MessageAuthor::new(UserId(7), "alice"),
            ChannelId(channel),
            "hi",
        );
        msg.guild_id = guild;
        msg
    }

    #[test]
    fn test_annotate_guild_message() {
        let cache = cache_with_guild();
        let mut msg = message(Some(GuildId(1)), 10);

        cache.annotate(&mut msg);

        assert_eq!(msg.guild_name.as_deref(), Some("Rustaceans"));
        assert_eq!(msg.channel_name.as_deref(), Some("general"));
    }

    #[test]
    fn test_annotate_unknown_channel_keeps_guild_name() {
        let cache = cache_with_guild();
        let mut thread_msg = message(Some(GuildId(1)), 99);
        let mut dm = message(None, 20);

        cache.annotate(&mut thread_msg);
        cache.annotate(&mut dm);

        assert_eq!(thread_msg.guild_name.as_deref(), Some("Rustaceans"));
        assert!(thread_msg.channel_name.is_none());
        assert!(dm.guild_name.is_none());
    }

    #[test]
    fn test_channel_and_guild_lifecycle() {
        let cache = cache_with_guild();

        cache.apply(DispatchEvent::ChannelUpsert {
            guild_id: GuildId(1),
            channel: ChannelSummary::new(ChannelId(11), "news", ChannelKind::Announcement),
        });
        cache.apply(DispatchEvent::ChannelDelete {
            guild_id: GuildId(1),
            channel_id: ChannelId(10),
        });
        cache.apply(DispatchEvent::GuildUpdate {
            guild_id: GuildId(1),
            name: "Crabs".into(),
        });

        let guilds = cache.guilds();
        assert_eq!(guilds[0].name(), "Crabs");
        let names: Vec<&str> = guilds[0].channels().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["news"]);

        cache.apply(DispatchEvent::GuildDelete {
            guild_id: GuildId(1),
            unavailable: false,
        });
        assert!(cache.is_empty());
    }

    #[test]
    fn test_outage_keeps_guild_listed() {
        let cache = cache_with_guild();

        cache.apply(DispatchEvent::GuildDelete {
            guild_id: GuildId(1),
            unavailable: true,
        });

        let guilds = cache.guilds();
        assert_eq!(guilds.len(), 1);
        assert!(guilds[0].is_unavailable());
        assert_eq!(guilds[0].name(), "Rustaceans");

        cache.apply(DispatchEvent::GuildCreate(Guild::new(GuildId(1), "Rustaceans")));
        assert!(!cache.guilds()[0].is_unavailable());
    }

    #[test]
    fn test_guilds_sorted_by_id() {
        let cache = GuildCache::new();
        cache.apply(DispatchEvent::GuildCreate(Guild::new(GuildId(5), "b")));
        cache.apply(DispatchEvent::GuildCreate(Guild::new(GuildId(2), "a")));

        let ids: Vec<GuildId> = cache.guilds().iter().map(Guild::id).collect();
        assert_eq!(ids, vec![GuildId(2), GuildId(5)]);
        assert_eq!(cache.len(), 2);
    }
}
