use serde_json::{json, Value};

use crate::cons::provider_cons::ProviderId;
use crate::llm::models::provider_base::{
    GenerationOptions, Message, NeutralResponse, ProviderClient, Role,
};
use crate::llm::utils::error_normalizer;
use crate::llm::utils::network::{as_token_count, send_json, VendorReply};

const VENDOR: &str = "Claude";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct ClaudeClient {
    pub base_url: String,
    http_client: reqwest::Client,
}

impl ClaudeClient {
    pub fn new(base_url: String, http_client: reqwest::Client) -> Self {
        Self {
            base_url,
            http_client,
        }
    }

    async fn post(&self, api_key: &str, body: &Value) -> Result<VendorReply, reqwest::Error> {
        let url = format!("{}/messages", self.base_url.trim_end_matches('/'));
        let request = self
            .http_client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(body);
        send_json(request).await
    }
}

/// Builds a Messages API body. System text moves to the top-level `system`
/// field and consecutive turns with the same role are merged, since the API
/// requires user/assistant alternation.
pub(crate) fn build_messages_request_body(
    model: &str,
    messages: &[Message],
    options: &GenerationOptions,
) -> Value {
    let mut system_parts: Vec<&str> = Vec::new();
    let mut anthropic_messages: Vec<Value> = Vec::new();

    for msg in messages {
        let role = match msg.role {
            Role::System => {
                system_parts.push(&msg.content);
                continue;
            }
            Role::User => "user",
            Role::Assistant => "assistant",
        };

        if let Some(last) = anthropic_messages.last_mut() {
            if last["role"] == role {
                let merged = format!(
                    "{}\n\n{}",
                    last["content"].as_str().unwrap_or_default(),
                    msg.content
                );
                last["content"] = Value::String(merged);
                continue;
            }
        }
        anthropic_messages.push(json!({
            "role": role,
            "content": msg.content
        }));
    }

    let mut request_body = json!({
        "model": model,
        "messages": anthropic_messages,
        "max_tokens": options.max_tokens,
        "temperature": options.temperature,
    });

    if !system_parts.is_empty() {
        request_body["system"] = json!(system_parts.join("\n\n"));
    }

    request_body
}

/// Text of every `content[]` block with `type == "text"`, joined.
pub(crate) fn extract_text_blocks(body: &Value) -> Option<String> {
    let blocks = body.get("content").and_then(|c| c.as_array())?;
    let text: String = blocks
        .iter()
        .filter(|block| block.get("type").and_then(|t| t.as_str()) == Some("text"))
        .filter_map(|block| block.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

pub(crate) fn usage_tokens(body: &Value) -> Option<u32> {
    let input = as_token_count(body.pointer("/usage/input_tokens"));
    let output = as_token_count(body.pointer("/usage/output_tokens"));
    match (input, output) {
        (None, None) => None,
        (i, o) => Some(i.unwrap_or(0).saturating_add(o.unwrap_or(0))),
    }
}

impl ProviderClient for ClaudeClient {
    fn provider(&self) -> ProviderId {
        ProviderId::Claude
    }

    async fn generate(
        &self,
        messages: &[Message],
        api_key: &str,
        options: &GenerationOptions,
    ) -> NeutralResponse {
        let model = options.model_or_default(ProviderId::Claude);
        let request_body = build_messages_request_body(&model, messages, options);

        let reply = match self.post(api_key, &request_body).await {
            Ok(reply) => reply,
            Err(err) => return error_normalizer::from_transport(VENDOR, &err),
        };

        if !reply.status.is_success() {
            return error_normalizer::from_http(VENDOR, reply.status, &reply.body);
        }
        if !reply.is_clean() {
            return error_normalizer::from_payload(VENDOR, &reply.body);
        }

        match extract_text_blocks(&reply.body) {
            Some(content) => NeutralResponse::ok(content, usage_tokens(&reply.body)),
            None => error_normalizer::no_response(VENDOR),
        }
    }

    async fn test_credential(&self, api_key: &str, model: Option<&str>) -> bool {
        let options = GenerationOptions::credential_probe(model);
        let model = options.model_or_default(ProviderId::Claude);
        let request_body = build_messages_request_body(&model, &[Message::user("Hi")], &options);

        match self.post(api_key, &request_body).await {
            Ok(reply) => {
                reply.is_clean()
                    && reply.body.get("type").and_then(|t| t.as_str()) != Some("error")
                    && reply
                        .body
                        .get("content")
                        .and_then(|c| c.as_array())
                        .is_some_and(|arr| !arr.is_empty())
            }
            Err(err) => {
                log::warn!("Claude credential check failed: {}", err);
                false
            }
        }
    }
}
