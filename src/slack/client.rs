use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::views::OutgoingMessage;
use crate::errors::SlackApiError;

/// The Slack Web API calls the approval workflow depends on.
#[async_trait]
pub trait SlackApi: Send + Sync {
    /// `views.open`: show a modal for a trigger id.
    async fn open_view(&self, trigger_id: &str, view: &serde_json::Value) -> Result<(), SlackApiError>;

    /// `chat.postMessage`
    async fn post_message(&self, message: &OutgoingMessage) -> Result<PostedMessage, SlackApiError>;

    /// `chat.update`: `message.ts` must identify the message to replace.
    async fn update_message(&self, message: &OutgoingMessage) -> Result<(), SlackApiError>;
}

/// Where a posted message landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub channel: String,
    pub ts: String,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    ts: Option<String>,
}

#[derive(Serialize)]
struct OpenViewRequest<'a> {
    trigger_id: &'a str,
    view: &'a serde_json::Value,
}

/// Bot-token client for the Slack Web API.
#[derive(Clone)]
pub struct SlackClient {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
}

impl SlackClient {
    pub fn new(bot_token: &str, api_base: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("approval-bot/0.1")
            .build()
            .context("failed to build slack HTTP client")?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
        })
    }

    async fn call<T: Serialize + ?Sized>(
        &self,
        method: &'static str,
        body: &T,
    ) -> Result<ApiResponse, SlackApiError> {
        let url = format!("{}/{}", self.api_base, method);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.bot_token)
            .json(body)
            .send()
            .await
            .map_err(|source| SlackApiError::Transport { method, source })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SlackApiError::Status {
                method,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ApiResponse = resp
            .json()
            .await
            .map_err(|source| SlackApiError::Transport { method, source })?;

        if !parsed.ok {
            return Err(SlackApiError::Api {
                method,
                error: parsed.error.unwrap_or_else(|| "unknown_error".to_string()),
            });
        }

        tracing::debug!(method, "slack api call succeeded");
        Ok(parsed)
    }
}

#[async_trait]
impl SlackApi for SlackClient {
    async fn open_view(&self, trigger_id: &str, view: &serde_json::Value) -> Result<(), SlackApiError> {
        self.call("views.open", &OpenViewRequest { trigger_id, view })
            .await
            .map(|_| ())
    }

    async fn post_message(&self, message: &OutgoingMessage) -> Result<PostedMessage, SlackApiError> {
        let resp = self.call("chat.postMessage", message).await?;
        Ok(PostedMessage {
            channel: resp.channel.unwrap_or_else(|| message.channel.clone()),
            ts: resp.ts.unwrap_or_default(),
        })
    }

    async fn update_message(&self, message: &OutgoingMessage) -> Result<(), SlackApiError> {
        self.call("chat.update", message).await.map(|_| ())
    }
}
