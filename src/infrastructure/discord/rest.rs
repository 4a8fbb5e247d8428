//! Discord REST API client.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::dto::{
    ChannelResponse, CreateMessageRequest, CreatedMessageResponse, ErrorResponse, InviteResponse,
    MessageResponse, UserResponse,
};
use crate::domain::entities::{
    AuthToken, BotIdentity, ChannelId, ChannelInfo, HistoryMessage, InviteCode, InviteInfo,
    MessageId, OutgoingMessage,
};
use crate::domain::errors::{AdapterError, AdapterResult};

pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!(
    "DiscordBot (https://github.com/linuxmobile/oxinbox, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// What a failed request was addressing, used to pick the error variant.
#[derive(Debug, Clone, Copy)]
enum Target<'a> {
    CurrentUser,
    Channel(ChannelId),
    Invite(&'a str),
}

/// Thin typed wrapper over the REST endpoints the adapter needs.
pub struct DiscordRestClient {
    client: Client,
    base_url: String,
}

impl DiscordRestClient {
    /// # Errors
    ///
    /// Returns `Configuration` if the HTTP client cannot be built.
    pub fn new() -> AdapterResult<Self> {
        Self::with_base_url(DISCORD_API_BASE)
    }

    /// # Errors
    ///
    /// Returns `Configuration` if the HTTP client cannot be built.
    pub fn with_base_url(base_url: impl Into<String>) -> AdapterResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AdapterError::configuration(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, builder: RequestBuilder, token: &AuthToken) -> RequestBuilder {
        builder.header(header::AUTHORIZATION, token.authorization_header())
    }

    /// Validates the token and returns the bot account.
    ///
    /// # Errors
    ///
    /// Returns `LoginFailure` for a rejected token, `TransientPlatform` otherwise.
    pub async fn current_user(&self, token: &AuthToken) -> AdapterResult<BotIdentity> {
        debug!("Validating bot token against Discord API");

        let request = self.authorized(self.client.get(self.url("/users/@me")), token);
        let user: UserResponse = self.execute(request, Target::CurrentUser).await?;

        if !user.bot {
            warn!(user_id = user.id, "Token does not belong to a bot account");
        }

        Ok(user.into_identity())
    }

    /// # Errors
    ///
    /// Returns `ChannelNotFound` if the channel is missing or hidden from the bot.
    pub async fn channel(
        &self,
        token: &AuthToken,
        channel_id: ChannelId,
    ) -> AdapterResult<ChannelInfo> {
        let request = self.authorized(
            self.client.get(self.url(&format!("/channels/{channel_id}"))),
            token,
        );
        let channel: ChannelResponse = self.execute(request, Target::Channel(channel_id)).await?;
        Ok(channel.into())
    }

    /// # Errors
    ///
    /// Returns `ChannelNotFound` if the bot cannot post there.
    pub async fn create_message(
        &self,
        token: &AuthToken,
        channel_id: ChannelId,
        message: OutgoingMessage,
    ) -> AdapterResult<MessageId> {
        let body = CreateMessageRequest::from(message);
        let request = self.authorized(
            self.client
                .post(self.url(&format!("/channels/{channel_id}/messages")))
                .json(&body),
            token,
        );
        let created: CreatedMessageResponse =
            self.execute(request, Target::Channel(channel_id)).await?;
        Ok(created.id)
    }

    /// Newest-first history, as the API returns it.
    ///
    /// # Errors
    ///
    /// Returns `ChannelNotFound` if the history cannot be read.
    pub async fn messages(
        &self,
        token: &AuthToken,
        channel_id: ChannelId,
        limit: u8,
    ) -> AdapterResult<Vec<HistoryMessage>> {
        let request = self.authorized(
            self.client
                .get(self.url(&format!("/channels/{channel_id}/messages")))
                .query(&[("limit", limit.clamp(1, 100))]),
            token,
        );
        let messages: Vec<MessageResponse> =
            self.execute(request, Target::Channel(channel_id)).await?;
        Ok(messages.into_iter().map(HistoryMessage::from).collect())
    }

    /// # Errors
    ///
    /// Returns `InvalidInvite` for unknown, expired, or non-server invites.
    pub async fn invite(&self, token: &AuthToken, code: &InviteCode) -> AdapterResult<InviteInfo> {
        let request = self.authorized(
            self.client.get(self.url(&format!("/invites/{code}"))),
            token,
        );
        let invite: InviteResponse = self.execute(request, Target::Invite(code.as_str())).await?;

        let guild = invite.guild.ok_or_else(|| {
            AdapterError::invalid_invite(format!("invite '{code}' does not point to a server"))
        })?;

        Ok(InviteInfo {
            code: code.clone(),
            guild_id: guild.id,
            guild_name: guild.name,
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        target: Target<'_>,
    ) -> AdapterResult<T> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Failed to reach Discord API");
            if e.is_timeout() {
                AdapterError::platform("request timed out")
            } else if e.is_connect() {
                AdapterError::platform("failed to connect to Discord")
            } else {
                AdapterError::platform(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from_response(status, response, target).await);
        }

        response.json::<T>().await.map_err(|e| {
            warn!(error = %e, "Failed to parse Discord response");
            AdapterError::platform(format!("failed to parse response: {e}"))
        })
    }

    async fn error_from_response(
        status: StatusCode,
        response: Response,
        target: Target<'_>,
    ) -> AdapterError {
        let message = match response.json::<ErrorResponse>().await {
            Ok(error) => error.message,
            Err(_) => format!("HTTP {status}"),
        };
        debug!(%status, %message, ?target, "Discord API error");
        map_status(status, &message, target)
    }
}

fn map_status(status: StatusCode, message: &str, target: Target<'_>) -> AdapterError {
    match (status, target) {
        (StatusCode::UNAUTHORIZED, _) => AdapterError::login("invalid or expired bot token"),
        (StatusCode::FORBIDDEN | StatusCode::NOT_FOUND, Target::Channel(id)) => {
            AdapterError::channel_not_found(id)
        }
        (StatusCode::NOT_FOUND, Target::Invite(code)) => {
            AdapterError::invalid_invite(format!("invite '{code}' is unknown or expired"))
        }
        (StatusCode::TOO_MANY_REQUESTS, _) => {
            AdapterError::platform(format!("rate limited: {message}"))
        }
        _ => AdapterError::platform(format!("{status}: {message}")),
    }
}
