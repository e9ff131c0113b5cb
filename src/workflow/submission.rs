use super::ApprovalWorkflow;
use crate::errors::WorkflowError;
use crate::models::approval::ApprovalRequest;
use crate::slack::payloads::ViewSubmission;
use crate::slack::views::{self, APPROVER_ACTION, APPROVER_BLOCK, TEXT_ACTION, TEXT_BLOCK};
use crate::slack::PostedMessage;

/// A request that reached its approver.
#[derive(Debug, Clone)]
pub struct SubmittedRequest {
    pub request: ApprovalRequest,
    pub message: PostedMessage,
}

impl ApprovalWorkflow {
    /// Record the submitted request and DM the approver with Approve / Reject
    /// buttons. The request only stays in the store if the DM was delivered.
    pub async fn submit_request(
        &self,
        submission: &ViewSubmission,
    ) -> Result<SubmittedRequest, WorkflowError> {
        let approver = submission
            .selected_user(APPROVER_BLOCK, APPROVER_ACTION)
            .ok_or(WorkflowError::MissingField {
                block_id: APPROVER_BLOCK,
                action_id: APPROVER_ACTION,
            })?;
        let text = submission
            .text_value(TEXT_BLOCK, TEXT_ACTION)
            .filter(|t| !t.trim().is_empty())
            .ok_or(WorkflowError::MissingField {
                block_id: TEXT_BLOCK,
                action_id: TEXT_ACTION,
            })?;

        tracing::info!(approver, approval_text = text, "approval request submitted");

        let request = ApprovalRequest::new(&submission.user.id, approver, text);
        let message = views::approval_request_message(&request);
        self.store.insert(request.clone());

        match self.slack.post_message(&message).await {
            Ok(posted) => {
                tracing::info!(
                    request_id = %request.id,
                    ts = %posted.ts,
                    "message sent to approver"
                );
                Ok(SubmittedRequest {
                    request,
                    message: posted,
                })
            }
            Err(source) => {
                self.store.remove(&request.id);
                Err(WorkflowError::RequestDelivery {
                    requester: request.requester_id,
                    approver: request.approver_id,
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::approval::ApprovalStatus;
    use crate::workflow::correlation::{extract_requester, ActionValue};
    use crate::workflow::testing;

    fn submission(requester: &str, approver: Option<&str>, text: Option<&str>) -> ViewSubmission {
        let mut values = serde_json::Map::new();
        if let Some(approver) = approver {
            values.insert(
                "approver_block".into(),
                serde_json::json!({ "approver": { "type": "users_select", "selected_user": approver } }),
            );
        }
        if let Some(text) = text {
            values.insert(
                "text_block".into(),
                serde_json::json!({ "approval_text": { "type": "plain_text_input", "value": text } }),
            );
        }
        serde_json::from_value(serde_json::json!({
            "user": { "id": requester },
            "view": { "callback_id": "approval_modal", "state": { "values": values } }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_sends_request_to_approver() {
        let (workflow, slack) = testing::workflow();
        let submitted = workflow
            .submit_request(&submission("U000", Some("U123"), Some("Deploy to prod")))
            .await
            .unwrap();

        let posted = slack.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].channel, "U123");
        assert_eq!(
            posted[0].text,
            "You have a new approval request from <@U000>: Deploy to prod"
        );
        assert_eq!(posted[0].attachments[0]["callback_id"], "approval_request");

        let stored = workflow.store().get(&submitted.request.id).unwrap();
        assert_eq!(stored.status, ApprovalStatus::Pending);
        assert_eq!(stored.requester_id, "U000");
        assert_eq!(stored.approver_id, "U123");
        assert_eq!(submitted.message.ts, "1700000000.000001");
    }

    #[tokio::test]
    async fn test_message_carries_exactly_one_requester_mention() {
        let (workflow, slack) = testing::workflow();
        for (requester, text) in [
            ("U000", "a"),
            ("UABC", "multi\nline"),
            ("W1", "x: y"),
            ("U000", "cc <@U999> and <!channel>"),
            ("U777", "<@U123|approver> please"),
        ] {
            workflow
                .submit_request(&submission(requester, Some("U123"), Some(text)))
                .await
                .unwrap();
            let last = slack.posted().pop().unwrap();
            assert_eq!(last.text.matches("<@").count(), 1);
            assert!(!last.text.contains("<!"));
            assert_eq!(extract_requester(&last.text), Some(requester));
        }
    }

    #[tokio::test]
    async fn test_buttons_reference_stored_request() {
        let (workflow, slack) = testing::workflow();
        let submitted = workflow
            .submit_request(&submission("U000", Some("U123"), Some("Deploy")))
            .await
            .unwrap();

        let actions = slack.posted()[0].attachments[0]["actions"].clone();
        for action in actions.as_array().unwrap() {
            let value = ActionValue::parse(action["value"].as_str().unwrap()).unwrap();
            assert_eq!(value.request_id, Some(submitted.request.id));
        }
    }

    #[tokio::test]
    async fn test_missing_approver() {
        let (workflow, slack) = testing::workflow();
        let err = workflow
            .submit_request(&submission("U000", None, Some("Deploy")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::MissingField { block_id: "approver_block", .. }
        ));
        assert!(slack.posted().is_empty());
        assert!(workflow.store().is_empty());
    }

    #[tokio::test]
    async fn test_text_is_kept_as_typed() {
        let (workflow, slack) = testing::workflow();
        let typed = "  Deploy to prod\n  (after the freeze)  ";
        let submitted = workflow
            .submit_request(&submission("U000", Some("U123"), Some(typed)))
            .await
            .unwrap();

        assert_eq!(submitted.request.text, typed);
        assert_eq!(workflow.store().get(&submitted.request.id).unwrap().text, typed);
        assert!(slack.posted()[0].text.ends_with(typed));
    }

    #[tokio::test]
    async fn test_blank_text_is_missing() {
        let (workflow, _slack) = testing::workflow();
        let err = workflow
            .submit_request(&submission("U000", Some("U123"), Some("   ")))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::MissingField { block_id: "text_block", .. }));
    }

    #[tokio::test]
    async fn test_failed_delivery_drops_request() {
        let (workflow, slack) = testing::workflow();
        slack.fail_posts_to("UBAD");

        let err = workflow
            .submit_request(&submission("U000", Some("UBAD"), Some("Deploy")))
            .await
            .unwrap_err();
        match err {
            WorkflowError::RequestDelivery { requester, approver, .. } => {
                assert_eq!(requester, "U000");
                assert_eq!(approver, "UBAD");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(workflow.store().is_empty());
    }
}
