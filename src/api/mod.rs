use std::sync::Arc;

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::errors::AppError;
use crate::AppState;

pub mod handlers;

/// Slack never sends more than a few kilobytes; anything larger is not Slack.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Full HTTP surface: health, the Slack request URL and the legacy
/// `/approval-test` endpoint.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/approval-test", post(handlers::approval_test))
        .merge(slack_router(state.clone()))
        .fallback(fallback_404)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}

/// Routes that only accept requests signed with the app's signing secret.
fn slack_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/slack/events", post(handlers::slack_events))
        .route_layer(middleware::from_fn_with_state(state, verify_slack_signature))
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Middleware: buffers the body, checks `X-Slack-Signature` over it and
/// hands the same bytes on to the handler.
async fn verify_slack_signature(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| AppError::MalformedPayload(format!("unreadable body: {}", e)))?;

    state.verifier.verify(&parts.headers, &bytes)?;

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

/// Middleware: injects a unique X-Request-Id into every response.
async fn request_id_middleware(req: Request, next: Next) -> Response {
    let req_id = uuid::Uuid::new_v4().to_string();
    let mut resp = next.run(req).await;
    if let Ok(val) = axum::http::HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}
