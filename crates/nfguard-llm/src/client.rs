//! Upstream response classification shared by the backends
//!
//! Maps HTTP responses into the core validator error taxonomy. Rate
//! limiting arrives as HTTP 429, sometimes with a `retry-after` header,
//! sometimes only as a suggested wait embedded in the error message
//! ("Rate limit reached ... Please try again in 2.5s"). Both are parsed
//! here so the orchestrator only ever sees structured errors.

use nfguard_core::ValidatorError;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use std::time::Duration;

/// Marker phrase upstream services embed in rate-limit error bodies
const RATE_LIMIT_MARKER: &str = "Rate limit reached";

static SUGGESTED_WAIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[Pp]lease try again in ([0-9]+(?:\.[0-9]+)?)s").expect("valid wait pattern")
});

/// Read the response body, converting failures into validator errors
///
/// Returns the body text only for success statuses. 429 responses and
/// error bodies naming the rate-limit marker become
/// [`ValidatorError::RateLimited`]; other failures become
/// [`ValidatorError::Api`].
pub(crate) async fn read_success_body(
    response: reqwest::Response,
) -> Result<String, ValidatorError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let header_wait = retry_after_from_headers(response.headers());
        let body = response.text().await.unwrap_or_default();
        return Err(ValidatorError::RateLimited {
            retry_after: header_wait.or_else(|| retry_after_from_message(&body)),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|err| ValidatorError::Transport(err.to_string()))?;

    if !status.is_success() {
        let message = api_error_message(&body).unwrap_or_else(|| body.trim().to_string());
        if message.contains(RATE_LIMIT_MARKER) {
            return Err(ValidatorError::RateLimited {
                retry_after: retry_after_from_message(&message),
            });
        }
        return Err(ValidatorError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(body)
}

/// Suggested wait from a `retry-after` header, when parseable as seconds
fn retry_after_from_headers(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?;
    let seconds: f64 = value.trim().parse().ok()?;
    (seconds.is_finite() && seconds >= 0.0).then(|| Duration::from_secs_f64(seconds))
}

/// Suggested wait embedded in an error message
fn retry_after_from_message(message: &str) -> Option<Duration> {
    let captures = SUGGESTED_WAIT.captures(message)?;
    let seconds: f64 = captures.get(1)?.as_str().parse().ok()?;
    Some(Duration::from_secs_f64(seconds))
}

/// Extract the error message from a JSON error body
///
/// Both backends wrap failures as `{"error": {"message": ...}}`; a bare
/// top-level `message` is accepted as a fallback.
fn api_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .or_else(|| value.get("message"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}
