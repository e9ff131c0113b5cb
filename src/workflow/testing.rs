use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::ApprovalWorkflow;
use crate::errors::SlackApiError;
use crate::slack::views::OutgoingMessage;
use crate::slack::{PostedMessage, SlackApi};
use crate::store::ApprovalStore;

/// In-memory [`SlackApi`] that records every call.
#[derive(Default)]
pub(crate) struct RecordingSlack {
    pub views: Mutex<Vec<(String, serde_json::Value)>>,
    pub posted: Mutex<Vec<OutgoingMessage>>,
    pub updated: Mutex<Vec<OutgoingMessage>>,
    pub fail_views: AtomicBool,
    pub failing_channels: Mutex<HashSet<String>>,
}

impl RecordingSlack {
    pub fn fail_posts_to(&self, channel: &str) {
        self.failing_channels.lock().unwrap().insert(channel.to_string());
    }

    pub fn posted(&self) -> Vec<OutgoingMessage> {
        self.posted.lock().unwrap().clone()
    }

    pub fn updated(&self) -> Vec<OutgoingMessage> {
        self.updated.lock().unwrap().clone()
    }
}

#[async_trait]
impl SlackApi for RecordingSlack {
    async fn open_view(&self, trigger_id: &str, view: &serde_json::Value) -> Result<(), SlackApiError> {
        if self.fail_views.load(Ordering::SeqCst) {
            return Err(SlackApiError::Api {
                method: "views.open",
                error: "expired_trigger_id".into(),
            });
        }
        self.views
            .lock()
            .unwrap()
            .push((trigger_id.to_string(), view.clone()));
        Ok(())
    }

    async fn post_message(&self, message: &OutgoingMessage) -> Result<PostedMessage, SlackApiError> {
        if self.failing_channels.lock().unwrap().contains(&message.channel) {
            return Err(SlackApiError::Api {
                method: "chat.postMessage",
                error: "channel_not_found".into(),
            });
        }
        let mut posted = self.posted.lock().unwrap();
        posted.push(message.clone());
        Ok(PostedMessage {
            channel: format!("D{}", message.channel),
            ts: format!("1700000000.{:06}", posted.len()),
        })
    }

    async fn update_message(&self, message: &OutgoingMessage) -> Result<(), SlackApiError> {
        self.updated.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub(crate) fn workflow() -> (ApprovalWorkflow, Arc<RecordingSlack>) {
    let slack = Arc::new(RecordingSlack::default());
    let workflow = ApprovalWorkflow::new(slack.clone(), ApprovalStore::new(), "/approval-test");
    (workflow, slack)
}
