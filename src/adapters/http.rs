use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::core::errors::{Notion2SenError, Result};

/// Longest response excerpt quoted in error messages.
const BODY_EXCERPT_LEN: usize = 512;

/// Build a reqwest client with the given per-request timeout.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(format!("notion2sen/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Notion2SenError::InvalidConfig {
            detail: format!("Failed to create HTTP client: {e}"),
        })
}

/// Build the single-threaded runtime that adapters block on, so callers
/// see plain synchronous calls.
pub fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(Notion2SenError::Io)
}

/// Map a reqwest failure to a transport error for `service`.
pub fn transport(service: &'static str, e: reqwest::Error) -> Notion2SenError {
    let reason = if e.is_timeout() {
        format!("request timed out: {e}")
    } else {
        e.to_string()
    };
    Notion2SenError::Transport { service, reason }
}

/// Read a response body, failing on any status of 400 or above.
pub async fn read_body(service: &'static str, response: reqwest::Response) -> Result<Vec<u8>> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| transport(service, e))?;
    check_status(service, status, &body)?;
    Ok(body.to_vec())
}

/// Reject statuses of 400 and above, quoting the start of the body.
pub fn check_status(service: &'static str, status: StatusCode, body: &[u8]) -> Result<()> {
    if status.as_u16() < 400 {
        return Ok(());
    }
    let text = String::from_utf8_lossy(body);
    let excerpt: String = text.chars().take(BODY_EXCERPT_LEN).collect();
    Err(Notion2SenError::Protocol {
        service,
        reason: format!("status {status}: {}", excerpt.trim()),
    })
}

/// Decode a JSON body, mapping failures to protocol errors.
pub fn decode_json<T: DeserializeOwned>(service: &'static str, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| Notion2SenError::Protocol {
        service,
        reason: format!("could not decode response body: {e}"),
    })
}
