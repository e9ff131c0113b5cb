use uuid::Uuid;

use super::correlation::{self, ActionValue};
use super::ApprovalWorkflow;
use crate::errors::WorkflowError;
use crate::models::approval::Decision;
use crate::slack::payloads::InteractiveMessage;
use crate::slack::views;
use crate::slack::PostedMessage;

/// A decision that reached the requester.
#[derive(Debug, Clone)]
pub struct DecisionOutcome {
    /// `None` when the requester was recovered from the message text.
    pub request_id: Option<Uuid>,
    pub requester_id: String,
    pub decision: Decision,
    pub decided_by: String,
    pub notification: PostedMessage,
}

impl ApprovalWorkflow {
    /// Apply the approver's click and tell the requester.
    ///
    /// Buttons carrying a request id go through the store, which admits one
    /// decision per request from its approver only. Bare `approve` / `reject`
    /// buttons fall back to the first mention in the original message and
    /// have no duplicate guard.
    pub async fn record_decision(
        &self,
        action: &InteractiveMessage,
    ) -> Result<DecisionOutcome, WorkflowError> {
        let raw = action
            .actions
            .first()
            .and_then(|a| a.value.as_deref())
            .ok_or_else(|| WorkflowError::MalformedAction(String::new()))?;
        let value = ActionValue::parse(raw)?;
        let decided_by = action.user.id.as_str();

        let (requester_id, request_text) = match value.request_id {
            Some(id) => {
                let request = self.store.decide(&id, decided_by, value.decision)?;
                let text = views::request_text(&request.requester_id, &request.text);
                (request.requester_id, text)
            }
            None => {
                let original = action.original_text().unwrap_or_default();
                let requester = correlation::extract_requester(original)
                    .ok_or(WorkflowError::CorrelationMissing)?;
                (requester.to_string(), original.to_string())
            }
        };
        tracing::debug!(requester = %requester_id, decision = ?value.decision, "resolved requester");

        let notified = self
            .slack
            .post_message(&views::outcome_message(&requester_id, value.decision, decided_by))
            .await;

        // The decision stands either way; retire the buttons.
        self.close_request_message(action, &request_text, value.decision).await;

        let notification = notified.map_err(|source| WorkflowError::OutcomeDelivery {
            requester: requester_id.clone(),
            source,
        })?;
        tracing::info!(
            requester = %requester_id,
            decided_by,
            ts = %notification.ts,
            "message sent to requester"
        );

        Ok(DecisionOutcome {
            request_id: value.request_id,
            requester_id,
            decision: value.decision,
            decided_by: decided_by.to_string(),
            notification,
        })
    }

    async fn close_request_message(
        &self,
        action: &InteractiveMessage,
        request_text: &str,
        decision: Decision,
    ) {
        let Some((channel, ts)) = action.message_ref() else {
            tracing::debug!("no message reference on action, leaving buttons in place");
            return;
        };
        let replacement = views::resolved_request_message(
            channel,
            ts,
            request_text,
            decision,
            &action.user.id,
        );
        if let Err(e) = self.slack.update_message(&replacement).await {
            tracing::warn!(channel, ts, error = %e, "failed to close approval request message");
        }
    }
}
