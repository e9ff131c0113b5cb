use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::errors::WorkflowError;
use crate::models::approval::Decision;

static MENTION_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<@([^>]*)>").unwrap());

/// First user mention (`<@U123>` or `<@U123|name>`) in message text.
///
/// Used to recover the requester from the approver's message when the
/// clicked button carries no request id.
pub fn extract_requester(text: &str) -> Option<&str> {
    let inner = MENTION_REGEX.captures(text)?.get(1)?.as_str();
    let id = inner.split('|').next().unwrap_or(inner).trim();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Decoded value of an Approve / Reject button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionValue {
    pub decision: Decision,
    /// Absent on buttons that only carry `approve` / `reject`.
    pub request_id: Option<Uuid>,
}

impl ActionValue {
    pub fn parse(value: &str) -> Result<Self, WorkflowError> {
        let malformed = || WorkflowError::MalformedAction(value.to_string());

        let (decision, request_id) = match value.split_once(':') {
            Some((decision, id)) => (decision, Some(Uuid::parse_str(id).map_err(|_| malformed())?)),
            None => (value, None),
        };
        let decision = Decision::from_value(decision).ok_or_else(malformed)?;

        Ok(Self {
            decision,
            request_id,
        })
    }
}
