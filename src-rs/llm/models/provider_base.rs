use serde::{Deserialize, Serialize};

use crate::cons::provider_cons::ProviderId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Parse a host role name. Gemini's `model` is accepted for `assistant`.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "system" => Some(Role::System),
            "user" => Some(Role::User),
            "assistant" | "model" => Some(Role::Assistant),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const CREDENTIAL_PROBE_MAX_TOKENS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Accepted for host compatibility; every vendor call is full-response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            stream: None,
        }
    }
}

impl GenerationOptions {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Small request used to check a key, against `model` when one is given.
    pub fn credential_probe(model: Option<&str>) -> Self {
        let options = Self::default().with_max_tokens(CREDENTIAL_PROBE_MAX_TOKENS);
        match model {
            Some(model) => options.with_model(model),
            None => options,
        }
    }

    /// Model to send on the wire: an explicit non-blank model, else the vendor default.
    pub fn model_or_default(&self, provider: ProviderId) -> String {
        self.model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(provider.config().default_model)
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthorized,
    RateLimited,
    Timeout,
    NoResponse,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Timeout => "timeout",
            ErrorKind::NoResponse => "no_response",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single result shape every adapter produces.
///
/// Only [`NeutralResponse::ok`] and [`NeutralResponse::failure`] build one, so
/// a successful response always carries content and a failed one always
/// carries an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NeutralResponse {
    success: bool,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tokens_used: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<ErrorKind>,
}

impl NeutralResponse {
    /// Blank content is not a success: it degrades to a `no_response` failure.
    pub fn ok(content: impl Into<String>, tokens_used: Option<u32>) -> Self {
        let content = content.into();
        if content.trim().is_empty() {
            return Self::failure(ErrorKind::NoResponse, "Provider returned no content");
        }
        Self {
            success: true,
            content,
            tokens_used,
            error: None,
            error_code: None,
        }
    }

    pub fn failure(kind: ErrorKind, error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = format!("Request failed ({})", kind);
        }
        Self {
            success: false,
            content: String::new(),
            tokens_used: None,
            error: Some(error),
            error_code: Some(kind),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn tokens_used(&self) -> Option<u32> {
        self.tokens_used
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn error_code(&self) -> Option<ErrorKind> {
        self.error_code
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

/// Contract shared by the five vendor adapters.
///
/// Implementations never return an error: every failure comes back as a
/// `NeutralResponse` with `success == false`. Each call issues exactly one
/// HTTP request and never retries.
#[allow(async_fn_in_trait)]
pub trait ProviderClient: Send + Sync {
    fn provider(&self) -> ProviderId;

    async fn generate(
        &self,
        messages: &[Message],
        api_key: &str,
        options: &GenerationOptions,
    ) -> NeutralResponse;

    /// One cheap request with `api_key`; `model` falls back to the vendor default.
    async fn test_credential(&self, api_key: &str, model: Option<&str>) -> bool;
}
