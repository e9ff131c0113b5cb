//! Slack request signing.
//!
//! Protocol: https://api.slack.com/authentication/verifying-requests-from-slack

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::errors::AppError;

pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
pub const SIGNATURE_HEADER: &str = "x-slack-signature";

type HmacSha256 = Hmac<Sha256>;

/// `v0=` + hex HMAC-SHA256 of `v0:{timestamp}:{body}`.
pub fn compute_signature(secret: &str, timestamp: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(b"v0:");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    format!("v0={}", hex::encode(mac.finalize().into_bytes()))
}

#[derive(Clone)]
pub struct SignatureVerifier {
    secret: String,
    max_age_secs: u64,
}

impl SignatureVerifier {
    pub fn new(secret: &str, max_age_secs: u64) -> Self {
        Self {
            secret: secret.to_string(),
            max_age_secs,
        }
    }

    pub fn verify(&self, headers: &HeaderMap, body: &[u8]) -> Result<(), AppError> {
        self.verify_at(headers, body, chrono::Utc::now().timestamp())
    }

    /// Verify against an explicit clock reading (unix seconds).
    pub fn verify_at(&self, headers: &HeaderMap, body: &[u8], now: i64) -> Result<(), AppError> {
        let timestamp = headers
            .get(TIMESTAMP_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::InvalidSignature("missing timestamp header"))?;

        let ts: i64 = timestamp
            .parse()
            .map_err(|_| AppError::InvalidSignature("unparseable timestamp"))?;
        if (now - ts).unsigned_abs() > self.max_age_secs {
            return Err(AppError::InvalidSignature("stale timestamp"));
        }

        let provided = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::InvalidSignature("missing signature header"))?;

        let expected = compute_signature(&self.secret, timestamp, body);
        if !bool::from(expected.as_bytes().ct_eq(provided.as_bytes())) {
            return Err(AppError::InvalidSignature("signature mismatch"));
        }

        Ok(())
    }
}
