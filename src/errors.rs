use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::approval::ApprovalStatus;

/// Errors surfaced at the HTTP boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid request signature: {0}")]
    InvalidSignature(&'static str),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code, msg) = match &self {
            AppError::InvalidSignature(reason) => {
                tracing::warn!("rejected slack request: {}", reason);
                (
                    StatusCode::UNAUTHORIZED,
                    "authentication_error",
                    "invalid_signature",
                    "request signature verification failed".to_string(),
                )
            }
            AppError::MalformedPayload(e) => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "malformed_payload",
                e.clone(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal_server_error",
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": msg,
                "type": error_type,
                "code": code,
            }
        }));

        (status, body).into_response()
    }
}

/// Failures of a Slack Web API call.
#[derive(Debug, Error)]
pub enum SlackApiError {
    #[error("{method} request failed: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} returned status {status}: {body}")]
    Status {
        method: &'static str,
        status: u16,
        body: String,
    },

    /// Slack answered `{"ok": false, "error": ...}`.
    #[error("{method} failed: {error}")]
    Api { method: &'static str, error: String },
}

/// Outcome of an approval handler that did not complete.
///
/// Every handler returns one of these to its caller instead of logging and
/// swallowing the failure; the caller decides who (if anyone) hears about it.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("failed to open approval dialog: {0}")]
    DialogOpen(#[source] SlackApiError),

    #[error("failed to deliver approval request to {approver}: {source}")]
    RequestDelivery {
        requester: String,
        approver: String,
        #[source]
        source: SlackApiError,
    },

    #[error("failed to notify requester {requester}: {source}")]
    OutcomeDelivery {
        requester: String,
        #[source]
        source: SlackApiError,
    },

    #[error("unable to extract requester id from original message")]
    CorrelationMissing,

    #[error("submission is missing {block_id}.{action_id}")]
    MissingField {
        block_id: &'static str,
        action_id: &'static str,
    },

    #[error("unrecognised action value {0:?}")]
    MalformedAction(String),

    #[error("approval request {0} not found")]
    UnknownRequest(Uuid),

    #[error("user {user} is not the approver of request {id}")]
    NotApprover { id: Uuid, user: String },

    #[error("approval request {id} was already {status}")]
    AlreadyDecided { id: Uuid, status: ApprovalStatus },
}

impl WorkflowError {
    /// Short machine-readable kind, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowError::DialogOpen(_) => "dialog_open",
            WorkflowError::RequestDelivery { .. } => "request_delivery",
            WorkflowError::OutcomeDelivery { .. } => "outcome_delivery",
            WorkflowError::CorrelationMissing => "correlation_missing",
            WorkflowError::MissingField { .. } => "missing_field",
            WorkflowError::MalformedAction(_) => "malformed_action",
            WorkflowError::UnknownRequest(_) => "unknown_request",
            WorkflowError::NotApprover { .. } => "not_approver",
            WorkflowError::AlreadyDecided { .. } => "already_decided",
        }
    }

    /// Text to send to the user who triggered the failing step, if any.
    ///
    /// A missing correlation token yields nothing: without it there is no
    /// request to talk about and no outbound message is sent.
    pub fn notice(&self) -> Option<String> {
        let text = match self {
            WorkflowError::DialogOpen(_) => {
                "Sorry, the approval form could not be opened. Please run the command again."
                    .to_string()
            }
            WorkflowError::RequestDelivery { approver, .. } => format!(
                "Your approval request could not be delivered to <@{}>. Please try again.",
                approver
            ),
            WorkflowError::OutcomeDelivery { requester, .. } => format!(
                "Your decision was recorded but <@{}> could not be notified.",
                requester
            ),
            WorkflowError::CorrelationMissing => return None,
            WorkflowError::MissingField { .. } => {
                "Your approval request was incomplete. Please select an approver and describe the request."
                    .to_string()
            }
            WorkflowError::MalformedAction(_) | WorkflowError::UnknownRequest(_) => {
                "This approval request is no longer available.".to_string()
            }
            WorkflowError::NotApprover { .. } => {
                "Only the selected approver can decide on this request.".to_string()
            }
            WorkflowError::AlreadyDecided { status, .. } => {
                format!("This request has already been {}.", status)
            }
        };
        Some(text)
    }
}
