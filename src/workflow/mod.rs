//! The approval workflow: command -> modal -> approver DM -> decision.
//!
//! [`ApprovalWorkflow`] is built once at startup and holds the Slack client
//! and the request store. Each step is a method returning a typed result;
//! the receiver in [`crate::api`] acknowledges the event, runs the step and
//! decides what to tell the user when it fails.

pub mod command;
pub mod correlation;
pub mod decision;
pub mod submission;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use crate::errors::WorkflowError;
use crate::slack::views::OutgoingMessage;
use crate::slack::SlackApi;
use crate::store::ApprovalStore;

pub use decision::DecisionOutcome;
pub use submission::SubmittedRequest;

pub struct ApprovalWorkflow {
    slack: Arc<dyn SlackApi>,
    store: ApprovalStore,
    command: String,
}

impl ApprovalWorkflow {
    pub fn new(slack: Arc<dyn SlackApi>, store: ApprovalStore, command: impl Into<String>) -> Self {
        Self {
            slack,
            store,
            command: command.into(),
        }
    }

    /// The slash command that opens the request modal.
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn store(&self) -> &ApprovalStore {
        &self.store
    }

    /// Tell `user_id` that their step failed, when the error warrants it.
    /// Best effort: a failed notice is only logged.
    pub async fn notify_failure(&self, user_id: &str, err: &WorkflowError) {
        let Some(text) = err.notice() else {
            return;
        };
        if let Err(e) = self
            .slack
            .post_message(&OutgoingMessage::text(user_id, text))
            .await
        {
            tracing::warn!(user = user_id, error = %e, "failed to send failure notice");
        }
    }
}
