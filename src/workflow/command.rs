use super::ApprovalWorkflow;
use crate::errors::WorkflowError;
use crate::slack::payloads::SlashCommand;
use crate::slack::views;

impl ApprovalWorkflow {
    /// Open the request modal for the user who ran the command.
    ///
    /// The trigger id is only valid for a few seconds, so this must run
    /// right after the command is acknowledged.
    pub async fn open_request_modal(&self, command: &SlashCommand) -> Result<(), WorkflowError> {
        self.slack
            .open_view(&command.trigger_id, &views::request_modal())
            .await
            .map_err(WorkflowError::DialogOpen)?;

        tracing::info!(user = %command.user_id, "opened approval modal");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::workflow::testing;

    fn command() -> SlashCommand {
        SlashCommand {
            command: "/approval-test".into(),
            text: String::new(),
            user_id: "U000".into(),
            user_name: "alice".into(),
            channel_id: "C1".into(),
            team_id: "T1".into(),
            trigger_id: "trigger-1".into(),
            response_url: String::new(),
        }
    }

    #[tokio::test]
    async fn test_opens_modal_with_trigger() {
        let (workflow, slack) = testing::workflow();
        workflow.open_request_modal(&command()).await.unwrap();

        let views = slack.views.lock().unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].0, "trigger-1");
        assert_eq!(views[0].1["callback_id"], "approval_modal");
        assert_eq!(views[0].1["blocks"][0]["block_id"], "approver_block");
        assert_eq!(views[0].1["blocks"][1]["block_id"], "text_block");
    }

    #[tokio::test]
    async fn test_expired_trigger_is_dialog_open_error() {
        let (workflow, slack) = testing::workflow();
        slack.fail_views.store(true, Ordering::SeqCst);

        let err = workflow.open_request_modal(&command()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::DialogOpen(_)));
        assert!(slack.posted().is_empty());
    }
}
