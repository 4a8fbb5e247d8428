//! Discord guild entity.

use serde::{Deserialize, Serialize};

use super::{ChannelId, ChannelSummary, GuildId};

/// Guild as tracked by the live connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    id: GuildId,
    name: String,
    member_count: u64,
    channels: Vec<ChannelSummary>,
    /// Set during a platform outage; the bot is still a member.
    #[serde(default)]
    unavailable: bool,
}

impl Guild {
    #[must_use]
    pub fn new(id: impl Into<GuildId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            member_count: 0,
            channels: Vec::new(),
            unavailable: false,
        }
    }

    #[must_use]
    pub const fn with_member_count(mut self, count: u64) -> Self {
        self.member_count = count;
        self
    }

    #[must_use]
    pub fn with_channels(mut self, channels: Vec<ChannelSummary>) -> Self {
        self.channels = channels;
        self
    }

    #[must_use]
    pub const fn id(&self) -> GuildId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        self.unavailable
    }

    pub const fn mark_unavailable(&mut self) {
        self.unavailable = true;
    }

    #[must_use]
    pub const fn member_count(&self) -> u64 {
        self.member_count
    }

    #[must_use]
    pub fn channels(&self) -> &[ChannelSummary] {
        &self.channels
    }

    #[must_use]
    pub fn channel(&self, id: ChannelId) -> Option<&ChannelSummary> {
        self.channels.iter().find(|c| c.id == id)
    }

    /// Inserts or replaces a channel by id.
    pub fn upsert_channel(&mut self, channel: ChannelSummary) {
        match self.channels.iter_mut().find(|c| c.id == channel.id) {
            Some(existing) => *existing = channel,
            None => self.channels.push(channel),
        }
    }

    pub fn remove_channel(&mut self, id: ChannelId) {
        self.channels.retain(|c| c.id != id);
    }

    #[must_use]
    pub fn summary(&self) -> GuildSummary {
        GuildSummary {
            id: self.id,
            name: self.name.clone(),
            member_count: self.member_count,
            channel_count: self.channels.len(),
            unavailable: self.unavailable,
        }
    }
}

/// Row returned by `listServers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuildSummary {
    pub id: GuildId,
    pub name: String,
    pub member_count: u64,
    pub channel_count: usize,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unavailable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ChannelKind;

    #[test]
    fn test_upsert_and_remove_channel() {
        let mut guild = Guild::new(GuildId(1), "Test");
        guild.upsert_channel(ChannelSummary::new(ChannelId(10), "general", ChannelKind::Text));
        guild.upsert_channel(ChannelSummary::new(ChannelId(10), "renamed", ChannelKind::Text));
        assert_eq!(guild.channels().len(), 1);
        assert_eq!(guild.channel(ChannelId(10)).unwrap().name, "renamed");

        guild.remove_channel(ChannelId(10));
        assert!(guild.channels().is_empty());
    }

    #[test]
    fn test_summary_counts_channels() {
        let guild = Guild::new(GuildId(1), "Test")
            .with_member_count(12)
            .with_channels(vec![
                ChannelSummary::new(ChannelId(10), "general", ChannelKind::Text),
                ChannelSummary::new(ChannelId(11), "Voice", ChannelKind::Voice),
            ]);

        let summary = guild.summary();
        assert_eq!(summary.member_count, 12);
        assert_eq!(summary.channel_count, 2);
        assert!(!summary.unavailable);
    }
}
