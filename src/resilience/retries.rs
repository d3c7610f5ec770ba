//! Retry classification for upstream responses.
//!
//! Only idempotent GETs are sent upstream, so the decision depends on the
//! failure alone: transport errors, 429 and 5xx are retried; other 4xx and
//! undecodable bodies are not.

use reqwest::StatusCode;

/// True when an upstream status is worth another attempt.
pub fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// True when a transport error is worth another attempt.
pub fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}
