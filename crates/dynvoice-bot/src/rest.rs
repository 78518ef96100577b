//! Channel management over the platform's HTTP API.
//!
//! Implements [`ChannelManager`] with four endpoints:
//!
//! - `POST   /guilds/{guild}/channels` create a voice channel
//! - `DELETE /channels/{id}`           delete a channel
//! - `PATCH  /channels/{id}`           set parent and position
//! - `GET    /channels/{id}`           fetch a channel

use std::time::Duration;

use async_trait::async_trait;
use dynvoice_core::{
    ChannelId, ChannelInfo, ChannelManager, CreatedChannel, GuildId, ManagerError,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Channel type code for voice channels.
const VOICE_CHANNEL_TYPE: u8 = 2;

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Body of the create-channel request.
#[derive(Debug, Serialize)]
struct CreateChannelRequest<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: u8,
    parent_id: &'a str,
}

/// Body of the modify-channel request.
#[derive(Debug, Serialize)]
struct ModifyChannelRequest<'a> {
    parent_id: &'a str,
    position: i64,
}

/// Channel object returned by the API. Only the fields we use.
#[derive(Debug, Deserialize)]
struct ApiChannel {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    parent_id: Option<String>,
    #[serde(default)]
    position: Option<i64>,
}

impl From<ApiChannel> for ChannelInfo {
    fn from(c: ApiChannel) -> Self {
        ChannelInfo {
            id: ChannelId::new(c.id),
            name: c.name.unwrap_or_default(),
            parent: c.parent_id.map(ChannelId::new),
            position: c.position.unwrap_or(0),
        }
    }
}

/// [`ChannelManager`] talking to the platform's REST API with a bot token.
pub struct RestChannelManager {
    /// HTTP client for API requests.
    client: Client,
    /// Base URL, without trailing slash.
    api_base: String,
    /// Value of the `Authorization` header.
    authorization: String,
}

impl RestChannelManager {
    /// Create a manager for `api_base` authenticating with `token`.
    pub fn new(api_base: &str, token: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("dynvoice/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            authorization: format!("Bot {}", token),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(reqwest::header::AUTHORIZATION, &self.authorization)
    }

    /// Send a request and turn non-success statuses into errors.
    async fn send(
        &self,
        request: RequestBuilder,
        channel: Option<&ChannelId>,
    ) -> std::result::Result<Response, ManagerError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| ManagerError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if let (StatusCode::NOT_FOUND, Some(channel)) = (status, channel) {
            return Err(ManagerError::NotFound(channel.clone()));
        }

        let body = response.text().await.unwrap_or_default();
        Err(ManagerError::Api {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode(response: Response) -> std::result::Result<ApiChannel, ManagerError> {
        response
            .json::<ApiChannel>()
            .await
            .map_err(|e| ManagerError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ChannelManager for RestChannelManager {
    async fn create_voice_channel(
        &self,
        guild: &GuildId,
        name: &str,
        parent: &ChannelId,
    ) -> dynvoice_core::Result<CreatedChannel> {
        let body = CreateChannelRequest {
            name,
            kind: VOICE_CHANNEL_TYPE,
            parent_id: parent.as_str(),
        };
        let request = self
            .client
            .post(self.url(&format!("/guilds/{}/channels", guild)))
            .json(&body);

        let channel = Self::decode(self.send(request, None).await?).await?;
        let info = ChannelInfo::from(channel);
        tracing::info!(guild = %guild, channel = %info.id, name = %info.name, "created voice channel");

        Ok(CreatedChannel {
            id: info.id,
            name: if info.name.is_empty() { name.to_string() } else { info.name },
            position: info.position,
        })
    }

    async fn delete_channel(&self, channel: &ChannelId) -> dynvoice_core::Result<()> {
        let request = self.client.delete(self.url(&format!("/channels/{}", channel)));
        self.send(request, Some(channel)).await?;
        tracing::info!(channel = %channel, "deleted channel");
        Ok(())
    }

    async fn reparent_and_position(
        &self,
        channel: &ChannelId,
        parent: &ChannelId,
        position: i64,
    ) -> dynvoice_core::Result<()> {
        let body = ModifyChannelRequest {
            parent_id: parent.as_str(),
            position,
        };
        let request = self
            .client
            .patch(self.url(&format!("/channels/{}", channel)))
            .json(&body);
        self.send(request, Some(channel)).await?;
        Ok(())
    }

    async fn get_channel(&self, channel: &ChannelId) -> dynvoice_core::Result<ChannelInfo> {
        let request = self.client.get(self.url(&format!("/channels/{}", channel)));
        let channel = Self::decode(self.send(request, Some(channel)).await?).await?;
        Ok(channel.into())
    }
}
