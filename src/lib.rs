//! Slack approval bot.
//!
//! A user runs a slash command, names an approver in a modal, the approver
//! gets Approve / Reject buttons and the requester hears the outcome.

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod slack;
pub mod store;
pub mod workflow;

use slack::signature::SignatureVerifier;
use workflow::ApprovalWorkflow;

/// Shared application state passed to handlers and middleware.
pub struct AppState {
    pub workflow: ApprovalWorkflow,
    pub verifier: SignatureVerifier,
}
