//! Slack plumbing: Web API client, inbound payloads, layouts and request
//! signing.

pub mod client;
pub mod payloads;
pub mod signature;
pub mod views;

pub use client::{PostedMessage, SlackApi, SlackClient};
