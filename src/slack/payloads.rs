//! Inbound Slack request bodies.
//!
//! Slack posts everything to the request URL as
//! `application/x-www-form-urlencoded`: slash commands as plain form fields,
//! interactivity (view submissions, message button clicks) as a single
//! `payload` field holding JSON.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// A parsed inbound request.
#[derive(Debug, Clone)]
pub enum SlackInbound {
    /// Slack's periodic certificate probe on command URLs.
    SslCheck,
    Command(SlashCommand),
    Interaction(InteractionPayload),
}

impl SlackInbound {
    pub fn from_form(body: &[u8]) -> Result<Self, AppError> {
        let fields: HashMap<String, String> = url::form_urlencoded::parse(body).into_owned().collect();

        if let Some(payload) = fields.get("payload") {
            let interaction = serde_json::from_str(payload).map_err(|e| {
                AppError::MalformedPayload(format!("invalid interaction payload: {}", e))
            })?;
            return Ok(SlackInbound::Interaction(interaction));
        }

        if fields.contains_key("ssl_check") {
            return Ok(SlackInbound::SslCheck);
        }

        if fields.contains_key("command") {
            let value = serde_json::to_value(&fields)
                .map_err(|e| AppError::MalformedPayload(e.to_string()))?;
            let command = serde_json::from_value(value).map_err(|e| {
                AppError::MalformedPayload(format!("invalid slash command: {}", e))
            })?;
            return Ok(SlackInbound::Command(command));
        }

        Err(AppError::MalformedPayload(
            "neither a slash command nor an interaction payload".to_string(),
        ))
    }
}

/// Slash command invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlashCommand {
    /// The command, e.g. "/approval-test".
    pub command: String,
    #[serde(default)]
    pub text: String,
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub team_id: String,
    /// Single-use token for `views.open`; expires a few seconds after issue.
    pub trigger_id: String,
    #[serde(default)]
    pub response_url: String,
}

/// Interactivity payloads, discriminated by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionPayload {
    ViewSubmission(ViewSubmission),
    /// Button click on a legacy message attachment.
    InteractiveMessage(InteractiveMessage),
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackChannel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewSubmission {
    pub user: SlackUser,
    pub view: SubmittedView,
    #[serde(default)]
    pub trigger_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedView {
    #[serde(default)]
    pub id: String,
    pub callback_id: String,
    #[serde(default)]
    pub private_metadata: String,
    #[serde(default)]
    pub state: ViewState,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewState {
    /// block_id -> action_id -> value
    #[serde(default)]
    pub values: HashMap<String, HashMap<String, StateValue>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateValue {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Set by `users_select` elements.
    #[serde(default)]
    pub selected_user: Option<String>,
    /// Set by `plain_text_input` elements.
    #[serde(default)]
    pub value: Option<String>,
}

impl ViewSubmission {
    fn field(&self, block_id: &str, action_id: &str) -> Option<&StateValue> {
        self.view.state.values.get(block_id)?.get(action_id)
    }

    pub fn selected_user(&self, block_id: &str, action_id: &str) -> Option<&str> {
        self.field(block_id, action_id)?
            .selected_user
            .as_deref()
            .filter(|u| !u.is_empty())
    }

    pub fn text_value(&self, block_id: &str, action_id: &str) -> Option<&str> {
        self.field(block_id, action_id)?.value.as_deref()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractiveMessage {
    pub callback_id: String,
    #[serde(default)]
    pub actions: Vec<MessageAction>,
    pub user: SlackUser,
    #[serde(default)]
    pub channel: Option<SlackChannel>,
    #[serde(default)]
    pub message_ts: Option<String>,
    /// Echo of the message the button lives on.
    #[serde(default)]
    pub original_message: Option<OriginalMessage>,
    #[serde(default)]
    pub response_url: Option<String>,
    #[serde(default)]
    pub trigger_id: Option<String>,
}

impl InteractiveMessage {
    pub fn original_text(&self) -> Option<&str> {
        self.original_message.as_ref()?.text.as_deref()
    }

    /// Channel and timestamp of the clicked message, when Slack sent both.
    pub fn message_ref(&self) -> Option<(&str, &str)> {
        let channel = self.channel.as_ref()?.id.as_str();
        let ts = self
            .message_ts
            .as_deref()
            .or_else(|| self.original_message.as_ref()?.ts.as_deref())?;
        Some((channel, ts))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageAction {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OriginalMessage {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
}
