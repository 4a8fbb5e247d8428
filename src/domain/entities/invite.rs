//! Invite codes and join outcomes.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::{GuildId, UserId};

/// Permissions requested in the bot authorization URL: view channels, send messages, read history.
pub const DEFAULT_BOT_PERMISSIONS: u64 = 68_608;

static INVITE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://)?(?:www\.)?(?:discord\.gg|(?:discord|discordapp)\.com/invite)/([A-Za-z0-9-]+)",
    )
    .expect("Invalid regex")
});

static BARE_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9-]+$").expect("Invalid regex")
});

/// Invite code with any URL prefix removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteCode(String);

impl InviteCode {
    /// Accepts a bare code or an invite URL.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();

        if let Some(captures) = INVITE_URL.captures(input) {
            return captures.get(1).map(|m| Self(m.as_str().to_string()));
        }

        BARE_CODE
            .is_match(input)
            .then(|| Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InviteCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Invite resolved against the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteInfo {
    pub code: InviteCode,
    pub guild_id: GuildId,
    pub guild_name: String,
}

/// Outcome of `joinViaInvite`.
///
/// `success` can be `true` while `error` carries an advisory: callers inspect
/// `already_member` to tell "already joined" from "cannot self-join".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinReport {
    pub success: bool,
    pub guild_id: GuildId,
    pub guild_name: String,
    pub already_member: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorize_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JoinReport {
    #[must_use]
    pub fn already_member(invite: &InviteInfo) -> Self {
        Self {
            success: true,
            guild_id: invite.guild_id,
            guild_name: invite.guild_name.clone(),
            already_member: true,
            authorize_url: None,
            error: Some("Bot is already in this server.".to_string()),
        }
    }

    /// Bot accounts cannot accept invites; point a human at the authorization URL.
    #[must_use]
    pub fn requires_authorization(invite: &InviteInfo, bot_id: UserId) -> Self {
        let url = authorize_url(bot_id, DEFAULT_BOT_PERMISSIONS);
        Self {
            success: true,
            guild_id: invite.guild_id,
            guild_name: invite.guild_name.clone(),
            already_member: false,
            error: Some(format!(
                "Bot accounts cannot join servers through invites. A server administrator must add the bot with: {url}"
            )),
            authorize_url: Some(url),
        }
    }
}

#[must_use]
pub fn authorize_url(client_id: UserId, permissions: u64) -> String {
    format!(
        "https://discord.com/oauth2/authorize?client_id={client_id}&scope=bot&permissions={permissions}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("abcDEF12", "abcDEF12" ; "bare code")]
    #[test_case("https://discord.gg/abc123", "abc123" ; "short url")]
    #[test_case("discord.gg/abc123", "abc123" ; "short url without scheme")]
    #[test_case("https://discord.com/invite/rust-lang", "rust-lang" ; "long url")]
    #[test_case("https://discordapp.com/invite/xyz?event=1", "xyz" ; "legacy domain with query")]
    #[test_case("  https://www.discord.gg/Zz9  ", "Zz9" ; "padded www url")]
    fn test_invite_code_parse(input: &str, expected: &str) {
        assert_eq!(InviteCode::parse(input).unwrap().as_str(), expected);
    }

    #[test_case("" ; "empty")]
    #[test_case("https://example.com/invite/abc" ; "foreign host")]
    #[test_case("has spaces" ; "spaces")]
    fn test_invite_code_rejects(input: &str) {
        assert!(InviteCode::parse(input).is_none());
    }

    fn invite() -> InviteInfo {
        InviteInfo {
            code: InviteCode::parse("abc").unwrap(),
            guild_id: GuildId(55),
            guild_name: "Rustaceans".into(),
        }
    }

    #[test]
    fn test_already_member_report() {
        let report = JoinReport::already_member(&invite());
        assert!(report.success);
        assert!(report.already_member);
        assert_eq!(report.guild_id, GuildId(55));
        assert!(report.error.unwrap().contains("already in this server"));
    }

    #[test]
    fn test_requires_authorization_report() {
        let report = JoinReport::requires_authorization(&invite(), UserId(42));
        assert!(report.success);
        assert!(!report.already_member);
        let url = report.authorize_url.unwrap();
        assert!(url.contains("client_id=42"));
        assert!(url.contains("scope=bot"));
        assert!(report.error.unwrap().contains(&url));
    }
}
