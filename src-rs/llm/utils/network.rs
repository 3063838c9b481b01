use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

const CONNECT_TIMEOUT_SECS: u64 = 30;
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Shared HTTP client for every adapter. Cloning is cheap.
pub fn build_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .context("Failed to build HTTP client")
}

/// Status plus decoded body of a vendor reply.
#[derive(Debug, Clone)]
pub struct VendorReply {
    pub status: StatusCode,
    pub body: Value,
}

impl VendorReply {
    /// True when the reply has a success status and no `error` member.
    pub fn is_clean(&self) -> bool {
        self.status.is_success() && self.body.get("error").map_or(true, Value::is_null)
    }
}

/// Send a prepared request and decode the body.
///
/// A body that is not JSON is kept as `Value::String` so the caller can still
/// surface it in an error message.
pub async fn send_json(request: reqwest::RequestBuilder) -> std::result::Result<VendorReply, reqwest::Error> {
    let response = request.send().await.map_err(reqwest::Error::without_url)?;

    let status = response.status();
    let text = response.text().await.map_err(reqwest::Error::without_url)?;
    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };

    log::debug!("Vendor reply status {}", status);
    Ok(VendorReply { status, body })
}

/// Read an integer token count, tolerating vendors that send it as a float.
pub fn as_token_count(v: Option<&Value>) -> Option<u32> {
    let v = v?;
    v.as_u64()
        .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
        .and_then(|n| u32::try_from(n).ok())
}
