//! Maps transport failures and vendor error payloads onto [`ErrorKind`].
//!
//! Every adapter goes through the functions here, so a 401 reads the same
//! whichever vendor produced it. Classification is table driven: rules are
//! tried in order and the first matching predicate decides the kind.

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::StatusCode;
use serde_json::Value;

use crate::llm::models::provider_base::{ErrorKind, NeutralResponse};
use crate::llm::utils::string_util::truncate_utf8_with_ellipsis;

const MAX_DETAIL_BYTES: usize = 500;

/// What is known about a failure when it is classified.
#[derive(Debug, Clone, Default)]
pub struct FailureSignal {
    pub status: Option<u16>,
    pub text: String,
    pub transport_timeout: bool,
}

impl FailureSignal {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

pub type FailurePredicate = fn(&FailureSignal) -> bool;

pub struct ClassificationRule {
    pub name: &'static str,
    pub matches: FailurePredicate,
    pub kind: ErrorKind,
}

lazy_static! {
    static ref UNAUTHORIZED_PATTERN: Regex =
        Regex::new(r"(?i)\b401\b|unauthori[sz]ed").expect("valid unauthorized pattern");
    static ref RATE_LIMIT_PATTERN: Regex =
        Regex::new(r"(?i)\b429\b|rate[ _-]?limit").expect("valid rate limit pattern");
    static ref TIMEOUT_PATTERN: Regex =
        Regex::new(r"(?i)timeout|timed out|ETIMEDOUT").expect("valid timeout pattern");
}

fn is_unauthorized(signal: &FailureSignal) -> bool {
    signal.status == Some(401) || UNAUTHORIZED_PATTERN.is_match(&signal.text)
}

fn is_rate_limited(signal: &FailureSignal) -> bool {
    signal.status == Some(429) || RATE_LIMIT_PATTERN.is_match(&signal.text)
}

fn is_timeout(signal: &FailureSignal) -> bool {
    signal.transport_timeout || TIMEOUT_PATTERN.is_match(&signal.text)
}

/// Ordered rule table. Anything that matches none of them is `Unknown`.
pub static CLASSIFICATION_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "unauthorized",
        matches: is_unauthorized,
        kind: ErrorKind::Unauthorized,
    },
    ClassificationRule {
        name: "rate_limited",
        matches: is_rate_limited,
        kind: ErrorKind::RateLimited,
    },
    ClassificationRule {
        name: "timeout",
        matches: is_timeout,
        kind: ErrorKind::Timeout,
    },
];

pub fn classify(signal: &FailureSignal) -> ErrorKind {
    classify_with(CLASSIFICATION_RULES, signal)
}

pub fn classify_with(rules: &[ClassificationRule], signal: &FailureSignal) -> ErrorKind {
    rules
        .iter()
        .find(|rule| (rule.matches)(signal))
        .map(|rule| rule.kind)
        .unwrap_or(ErrorKind::Unknown)
}

/// Pull the human readable part out of a vendor `error` member.
///
/// Handles `{"error": "text"}` and `{"error": {"message": ..., "code"|"type"|"status": ...}}`.
pub fn vendor_error_detail(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => {
            let message = obj.get("message").and_then(|m| m.as_str()).unwrap_or_default();
            let code = ["code", "type", "status"]
                .iter()
                .filter_map(|k| obj.get(*k))
                .find_map(|c| match c {
                    Value::String(s) if !s.is_empty() => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                });
            match (message.is_empty(), code) {
                (false, Some(code)) => Some(format!("{} ({})", message, code)),
                (false, None) => Some(message.to_string()),
                (true, Some(code)) => Some(code),
                (true, None) => Some(Value::Object(obj.clone()).to_string()),
            }
        }
        other => Some(other.to_string()),
    }
}

fn body_detail(body: &Value) -> String {
    let raw = match vendor_error_detail(body) {
        Some(detail) => detail,
        None => match body {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    };
    truncate_utf8_with_ellipsis(raw.trim(), MAX_DETAIL_BYTES)
}

fn finish(signal: FailureSignal) -> NeutralResponse {
    let kind = classify(&signal);
    log::warn!("AI request failed [{}]: {}", kind, signal.text);
    NeutralResponse::failure(kind, signal.text)
}

/// The request never produced an HTTP response.
pub fn from_transport(vendor: &str, err: &reqwest::Error) -> NeutralResponse {
    finish(FailureSignal {
        status: None,
        text: format!("{} request failed: {}", vendor, err),
        transport_timeout: err.is_timeout(),
    })
}

/// The vendor answered with a non-success status.
pub fn from_http(vendor: &str, status: StatusCode, body: &Value) -> NeutralResponse {
    let detail = body_detail(body);
    let text = if detail.is_empty() {
        format!("{} API error ({})", vendor, status)
    } else {
        format!("{} API error ({}): {}", vendor, status, detail)
    };
    finish(FailureSignal {
        status: Some(status.as_u16()),
        text,
        transport_timeout: false,
    })
}

/// The vendor answered with a success status but flagged an error in the payload.
pub fn from_payload(vendor: &str, body: &Value) -> NeutralResponse {
    finish(FailureSignal::from_text(format!(
        "{} API error: {}",
        vendor,
        body_detail(body)
    )))
}

/// Success status but no usable content container.
pub fn no_response(vendor: &str) -> NeutralResponse {
    log::warn!("{} returned no content", vendor);
    NeutralResponse::failure(ErrorKind::NoResponse, format!("{} returned no content", vendor))
}

/// Validation failure detected before any network call.
pub fn local(message: impl Into<String>) -> NeutralResponse {
    NeutralResponse::failure(ErrorKind::Unknown, message)
}
