use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::cons::provider_cons::ProviderId;
use crate::llm::models::openai::{
    build_chat_completions_request_body, chat_completions_url, probe_chat_completion,
    send_chat_completion,
};
use crate::llm::models::provider_base::{GenerationOptions, Message, NeutralResponse, ProviderClient};

const VENDOR: &str = "GLM";
const TOKEN_TTL_MS: u64 = 3_600_000;

/// Zhipu GLM. OpenAI-shaped wire format, but the bearer token is a JWT
/// signed with the secret half of an `id.secret` key.
#[derive(Debug, Clone)]
pub struct GlmClient {
    pub base_url: String,
    http_client: reqwest::Client,
}

impl GlmClient {
    pub fn new(base_url: String, http_client: reqwest::Client) -> Self {
        Self {
            base_url,
            http_client,
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Split a compound key into `(id, secret)`. Both `.` and `:` are accepted
/// as the delimiter; the first one found wins.
pub fn split_compound_key(api_key: &str) -> Option<(&str, &str)> {
    let (id, secret) = api_key.trim().split_once(|c: char| c == '.' || c == ':')?;
    if id.is_empty() || secret.is_empty() {
        return None;
    }
    Some((id, secret))
}

/// HS256 JWT as expected by the GLM API.
pub fn sign_token(id: &str, secret: &str, now_ms: u64) -> Result<String> {
    let header = json!({ "alg": "HS256", "sign_type": "SIGN" });
    let payload = json!({
        "api_key": id,
        "exp": now_ms + TOKEN_TTL_MS,
        "timestamp": now_ms,
    });

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(payload.to_string())
    );

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .context("Failed to initialise HMAC for GLM token")?;
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", signing_input, signature))
}

/// Bearer token for a raw key. Keys without a delimiter are returned
/// unchanged and left for the vendor to accept or reject.
pub fn derive_bearer_token(api_key: &str, now_ms: u64) -> String {
    let Some((id, secret)) = split_compound_key(api_key) else {
        return api_key.trim().to_string();
    };
    match sign_token(id, secret, now_ms) {
        Ok(token) => token,
        Err(e) => {
            log::warn!("GLM token signing failed, sending raw key: {:#}", e);
            api_key.trim().to_string()
        }
    }
}

impl ProviderClient for GlmClient {
    fn provider(&self) -> ProviderId {
        ProviderId::Glm
    }

    async fn generate(
        &self,
        messages: &[Message],
        api_key: &str,
        options: &GenerationOptions,
    ) -> NeutralResponse {
        let model = options.model_or_default(ProviderId::Glm);
        let request_body = build_chat_completions_request_body(&model, messages, options);
        let token = derive_bearer_token(api_key, now_millis());
        send_chat_completion(
            &self.http_client,
            VENDOR,
            &chat_completions_url(&self.base_url),
            &token,
            &request_body,
        )
        .await
    }

    async fn test_credential(&self, api_key: &str, model: Option<&str>) -> bool {
        let options = GenerationOptions::credential_probe(model);
        let model = options.model_or_default(ProviderId::Glm);
        let request_body =
            build_chat_completions_request_body(&model, &[Message::user("Hi")], &options);
        let token = derive_bearer_token(api_key, now_millis());
        probe_chat_completion(
            &self.http_client,
            VENDOR,
            &chat_completions_url(&self.base_url),
            &token,
            &request_body,
        )
        .await
    }
}
