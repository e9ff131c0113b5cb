use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::StatusCode};

use crate::errors::{AppError, WorkflowError};
use crate::slack::payloads::{
    InteractionPayload, InteractiveMessage, SlackInbound, SlashCommand, ViewSubmission,
};
use crate::slack::views::{MODAL_CALLBACK_ID, REQUEST_CALLBACK_ID};
use crate::AppState;

/// POST /slack/events: the app's single Slack request URL.
///
/// Slack expects a 200 within three seconds. Every recognised event is
/// acknowledged with an empty body straight away (which also closes the
/// modal on a view submission) and its handler runs on a spawned task.
pub async fn slack_events(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    match SlackInbound::from_form(&body)? {
        SlackInbound::SslCheck => tracing::debug!("ssl_check probe"),
        SlackInbound::Command(command) => dispatch_command(state, command),
        SlackInbound::Interaction(InteractionPayload::ViewSubmission(submission)) => {
            dispatch_submission(state, submission)
        }
        SlackInbound::Interaction(InteractionPayload::InteractiveMessage(action)) => {
            dispatch_decision(state, action)
        }
        SlackInbound::Interaction(InteractionPayload::Unsupported) => {
            tracing::debug!("ignoring unsupported interaction type");
        }
    }
    Ok(StatusCode::OK)
}

/// POST /approval-test: legacy endpoint kept for existing integrations.
/// Not wired to the workflow.
pub async fn approval_test() -> &'static str {
    "Approval request Sent"
}

fn dispatch_command(state: Arc<AppState>, command: SlashCommand) {
    if command.command != state.workflow.command() {
        tracing::warn!(command = %command.command, "ignoring unknown slash command");
        return;
    }
    tokio::spawn(async move {
        if let Err(e) = state.workflow.open_request_modal(&command).await {
            report(&state, &command.user_id, e).await;
        }
    });
}

fn dispatch_submission(state: Arc<AppState>, submission: ViewSubmission) {
    if submission.view.callback_id != MODAL_CALLBACK_ID {
        tracing::debug!(callback_id = %submission.view.callback_id, "ignoring view submission");
        return;
    }
    tokio::spawn(async move {
        if let Err(e) = state.workflow.submit_request(&submission).await {
            report(&state, &submission.user.id, e).await;
        }
    });
}

fn dispatch_decision(state: Arc<AppState>, action: InteractiveMessage) {
    if action.callback_id != REQUEST_CALLBACK_ID {
        tracing::debug!(callback_id = %action.callback_id, "ignoring message action");
        return;
    }
    tokio::spawn(async move {
        match state.workflow.record_decision(&action).await {
            Ok(outcome) => tracing::info!(
                request_id = ?outcome.request_id,
                requester = %outcome.requester_id,
                decision = ?outcome.decision,
                decided_by = %outcome.decided_by,
                "approval decision delivered"
            ),
            Err(e) => report(&state, &action.user.id, e).await,
        }
    });
}

/// Log a failed step and let the affected user know where that makes sense.
async fn report(state: &AppState, user_id: &str, err: WorkflowError) {
    match &err {
        WorkflowError::AlreadyDecided { .. } | WorkflowError::NotApprover { .. } => {
            tracing::warn!(user = user_id, kind = err.kind(), error = %err, "approval step refused");
        }
        _ => {
            tracing::error!(user = user_id, kind = err.kind(), error = %err, "approval step failed");
        }
    }
    state.workflow.notify_failure(user_id, &err).await;
}
