//! Modal and message layouts sent to Slack.

use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::approval::{ApprovalRequest, Decision};

pub const MODAL_CALLBACK_ID: &str = "approval_modal";
pub const APPROVER_BLOCK: &str = "approver_block";
pub const APPROVER_ACTION: &str = "approver";
pub const TEXT_BLOCK: &str = "text_block";
pub const TEXT_ACTION: &str = "approval_text";

/// Callback id on the approver's message attachment; routes clicks back to
/// the decision handler.
pub const REQUEST_CALLBACK_ID: &str = "approval_request";

const ATTACHMENT_COLOR: &str = "#3AA3E3";

/// Body of a `chat.postMessage` or `chat.update` call.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutgoingMessage {
    /// User id (opens the bot DM) or channel id.
    pub channel: String,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Value>,
    /// Only set when replacing an existing message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
}

impl OutgoingMessage {
    pub fn text(channel: &str, text: impl Into<String>) -> Self {
        Self {
            channel: channel.to_string(),
            text: text.into(),
            attachments: Vec::new(),
            ts: None,
        }
    }
}

/// The request form: approver picker plus free-text justification.
pub fn request_modal() -> Value {
    json!({
        "type": "modal",
        "callback_id": MODAL_CALLBACK_ID,
        "title": { "type": "plain_text", "text": "Request Approval" },
        "blocks": [
            {
                "type": "input",
                "block_id": APPROVER_BLOCK,
                "element": { "type": "users_select", "action_id": APPROVER_ACTION },
                "label": { "type": "plain_text", "text": "Select Approver" }
            },
            {
                "type": "input",
                "block_id": TEXT_BLOCK,
                "element": {
                    "type": "plain_text_input",
                    "multiline": true,
                    "action_id": TEXT_ACTION
                },
                "label": { "type": "plain_text", "text": "Approval Text" }
            }
        ],
        "submit": { "type": "plain_text", "text": "Submit" }
    })
}

/// Approver-facing text. The requester's mention is the only live token;
/// anything Slack would parse as a mention in `text` is escaped.
pub fn request_text(requester_id: &str, text: &str) -> String {
    format!(
        "You have a new approval request from <@{}>: {}",
        requester_id,
        escape_text(text)
    )
}

/// Escape the three control characters of Slack's `mrkdwn`.
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Button value: `<decision>:<request id>`.
pub fn action_value(decision: Decision, request_id: &Uuid) -> String {
    format!("{}:{}", decision.as_value(), request_id)
}

/// DM to the approver with Approve / Reject buttons.
pub fn approval_request_message(request: &ApprovalRequest) -> OutgoingMessage {
    let buttons: Vec<Value> = [(Decision::Approve, "Approve"), (Decision::Reject, "Reject")]
        .into_iter()
        .map(|(decision, label)| {
            json!({
                "name": decision.as_value(),
                "text": label,
                "type": "button",
                "value": action_value(decision, &request.id),
            })
        })
        .collect();

    OutgoingMessage {
        channel: request.approver_id.clone(),
        text: request_text(&request.requester_id, &request.text),
        attachments: vec![json!({
            "text": "Do you approve this request?",
            "fallback": "You are unable to choose an option",
            "callback_id": REQUEST_CALLBACK_ID,
            "color": ATTACHMENT_COLOR,
            "attachment_type": "default",
            "actions": buttons,
        })],
        ts: None,
    }
}

fn past_tense(decision: Decision) -> &'static str {
    match decision {
        Decision::Approve => "approved",
        Decision::Reject => "rejected",
    }
}

/// DM to the requester announcing the outcome.
pub fn outcome_message(requester_id: &str, decision: Decision, decided_by: &str) -> OutgoingMessage {
    OutgoingMessage::text(
        requester_id,
        format!(
            "Your request was {} by <@{}>.",
            past_tense(decision),
            decided_by
        ),
    )
}

/// Replacement for the approver's message once decided; drops the buttons.
pub fn resolved_request_message(
    channel: &str,
    ts: &str,
    original_text: &str,
    decision: Decision,
    decided_by: &str,
) -> OutgoingMessage {
    let (icon, color) = match decision {
        Decision::Approve => (":white_check_mark:", "good"),
        Decision::Reject => (":x:", "danger"),
    };
    OutgoingMessage {
        channel: channel.to_string(),
        text: original_text.to_string(),
        attachments: vec![json!({
            "text": format!("{} {} by <@{}>", icon, capitalize(past_tense(decision)), decided_by),
            "fallback": past_tense(decision),
            "color": color,
        })],
        ts: Some(ts.to_string()),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
