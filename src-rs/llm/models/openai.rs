use serde_json::{json, Value};

use crate::cons::provider_cons::ProviderId;
use crate::llm::models::provider_base::{GenerationOptions, Message, NeutralResponse, ProviderClient};
use crate::llm::utils::error_normalizer;
use crate::llm::utils::network::{as_token_count, send_json, VendorReply};

/// Client for OpenAI-compatible chat completion endpoints (OpenAI and Grok).
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    provider: ProviderId,
    pub api_base: String,
    http_client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(provider: ProviderId, api_base: String, http_client: reqwest::Client) -> Self {
        Self {
            provider,
            api_base,
            http_client,
        }
    }

    fn vendor(&self) -> &'static str {
        self.provider.vendor_label()
    }
}

impl ProviderClient for OpenAiClient {
    fn provider(&self) -> ProviderId {
        self.provider
    }

    async fn generate(
        &self,
        messages: &[Message],
        api_key: &str,
        options: &GenerationOptions,
    ) -> NeutralResponse {
        let model = options.model_or_default(self.provider);
        let request_body = build_chat_completions_request_body(&model, messages, options);
        send_chat_completion(
            &self.http_client,
            self.vendor(),
            &chat_completions_url(&self.api_base),
            api_key,
            &request_body,
        )
        .await
    }

    async fn test_credential(&self, api_key: &str, model: Option<&str>) -> bool {
        let options = GenerationOptions::credential_probe(model);
        let model = options.model_or_default(self.provider);
        let request_body =
            build_chat_completions_request_body(&model, &[Message::user("Hi")], &options);
        probe_chat_completion(
            &self.http_client,
            self.vendor(),
            &chat_completions_url(&self.api_base),
            api_key,
            &request_body,
        )
        .await
    }
}

pub fn create_openai(api_base: String, http_client: reqwest::Client) -> OpenAiClient {
    OpenAiClient::new(ProviderId::OpenAI, api_base, http_client)
}

pub fn create_grok(api_base: String, http_client: reqwest::Client) -> OpenAiClient {
    OpenAiClient::new(ProviderId::Grok, api_base, http_client)
}

pub(crate) fn build_chat_completions_request_body(
    model: &str,
    messages: &[Message],
    options: &GenerationOptions,
) -> Value {
    let converted_messages: Vec<Value> = messages
        .iter()
        .map(|msg| {
            json!({
                "role": msg.role.as_str(),
                "content": msg.content,
            })
        })
        .collect();

    json!({
        "model": model,
        "messages": converted_messages,
        "temperature": options.temperature,
        "max_tokens": options.max_tokens,
        "stream": false,
    })
}

pub(crate) fn chat_completions_url(api_base: &str) -> String {
    format!("{}/chat/completions", api_base.trim_end_matches('/'))
}

/// `choices[0].message.content`, if present and non-blank.
pub(crate) fn extract_chat_completion_content(body: &Value) -> Option<String> {
    let content = body
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())?;
    if content.trim().is_empty() {
        return None;
    }
    Some(content.to_string())
}

pub(crate) fn chat_completion_tokens(body: &Value) -> Option<u32> {
    as_token_count(body.pointer("/usage/total_tokens"))
}

fn has_choices(body: &Value) -> bool {
    body.get("choices")
        .and_then(|c| c.as_array())
        .is_some_and(|arr| !arr.is_empty())
}

/// Shared by every OpenAI-shaped vendor; `bearer` is whatever goes after `Bearer `.
pub(crate) async fn send_chat_completion(
    http_client: &reqwest::Client,
    vendor: &str,
    url: &str,
    bearer: &str,
    request_body: &Value,
) -> NeutralResponse {
    let request = http_client
        .post(url)
        .header("Authorization", format!("Bearer {}", bearer))
        .json(request_body);

    let reply = match send_json(request).await {
        Ok(reply) => reply,
        Err(err) => return error_normalizer::from_transport(vendor, &err),
    };
    chat_completion_response(vendor, &reply)
}

pub(crate) fn chat_completion_response(vendor: &str, reply: &VendorReply) -> NeutralResponse {
    if !reply.status.is_success() {
        return error_normalizer::from_http(vendor, reply.status, &reply.body);
    }
    if !reply.is_clean() {
        return error_normalizer::from_payload(vendor, &reply.body);
    }

    match extract_chat_completion_content(&reply.body) {
        Some(content) => {
            let tokens = chat_completion_tokens(&reply.body);
            log::debug!("{} completion: {} chars, tokens {:?}", vendor, content.len(), tokens);
            NeutralResponse::ok(content, tokens)
        }
        None => error_normalizer::no_response(vendor),
    }
}

pub(crate) async fn probe_chat_completion(
    http_client: &reqwest::Client,
    vendor: &str,
    url: &str,
    bearer: &str,
    request_body: &Value,
) -> bool {
    let request = http_client
        .post(url)
        .header("Authorization", format!("Bearer {}", bearer))
        .json(request_body);

    match send_json(request).await {
        Ok(reply) => reply.is_clean() && has_choices(&reply.body),
        Err(err) => {
            log::warn!("{} credential check failed: {}", vendor, err);
            false
        }
    }
}
