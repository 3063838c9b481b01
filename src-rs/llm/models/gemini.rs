use serde_json::{json, Value};

use crate::cons::provider_cons::ProviderId;
use crate::llm::models::provider_base::{
    GenerationOptions, Message, NeutralResponse, ProviderClient, Role,
};
use crate::llm::utils::error_normalizer;
use crate::llm::utils::network::{as_token_count, send_json, VendorReply};

const VENDOR: &str = "Gemini";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    pub base_url: String,
    http_client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(base_url: String, http_client: reqwest::Client) -> Self {
        Self {
            base_url,
            http_client,
        }
    }

    fn generate_content_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }

    async fn post(&self, model: &str, api_key: &str, body: &Value) -> Result<VendorReply, reqwest::Error> {
        let request = self
            .http_client
            .post(self.generate_content_url(model))
            .query(&[("key", api_key)])
            .json(body);
        send_json(request).await
    }
}

/// Gemini has no system role: system text goes to `systemInstruction` and
/// `assistant` turns are sent as `model`.
pub(crate) fn build_generate_content_body(messages: &[Message], options: &GenerationOptions) -> Value {
    let mut contents = Vec::new();
    let mut system_parts: Vec<&str> = Vec::new();

    for msg in messages {
        match msg.role {
            Role::System => system_parts.push(&msg.content),
            Role::User | Role::Assistant => {
                let role = if msg.role == Role::Assistant { "model" } else { "user" };
                contents.push(json!({
                    "role": role,
                    "parts": [{ "text": msg.content }]
                }));
            }
        }
    }

    let mut request_body = json!({
        "contents": contents,
        "generationConfig": {
            "temperature": options.temperature,
            "maxOutputTokens": options.max_tokens,
        }
    });

    if !system_parts.is_empty() {
        request_body["systemInstruction"] = json!({
            "parts": [{ "text": system_parts.join("\n\n") }]
        });
    }

    request_body
}

/// `candidates[0].content.parts[].text`, joined.
pub(crate) fn extract_candidate_text(body: &Value) -> Option<String> {
    let parts = body
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|cand| cand.get("content"))
        .and_then(|cont| cont.get("parts"))
        .and_then(|parts| parts.as_array())?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

pub(crate) fn usage_tokens(body: &Value) -> Option<u32> {
    as_token_count(body.pointer("/usageMetadata/totalTokenCount"))
}

impl ProviderClient for GeminiClient {
    fn provider(&self) -> ProviderId {
        ProviderId::Gemini
    }

    async fn generate(
        &self,
        messages: &[Message],
        api_key: &str,
        options: &GenerationOptions,
    ) -> NeutralResponse {
        let model = options.model_or_default(ProviderId::Gemini);
        let request_body = build_generate_content_body(messages, options);

        let reply = match self.post(&model, api_key, &request_body).await {
            Ok(reply) => reply,
            Err(err) => return error_normalizer::from_transport(VENDOR, &err),
        };

        if !reply.status.is_success() {
            return error_normalizer::from_http(VENDOR, reply.status, &reply.body);
        }
        if !reply.is_clean() {
            return error_normalizer::from_payload(VENDOR, &reply.body);
        }

        match extract_candidate_text(&reply.body) {
            Some(content) => NeutralResponse::ok(content, usage_tokens(&reply.body)),
            None => {
                if let Some(reason) = reply
                    .body
                    .pointer("/promptFeedback/blockReason")
                    .and_then(|r| r.as_str())
                {
                    log::warn!("Gemini blocked the prompt: {}", reason);
                }
                error_normalizer::no_response(VENDOR)
            }
        }
    }

    async fn test_credential(&self, api_key: &str, model: Option<&str>) -> bool {
        let options = GenerationOptions::credential_probe(model);
        let model = options.model_or_default(ProviderId::Gemini);
        let request_body = build_generate_content_body(&[Message::user("Hi")], &options);

        match self.post(&model, api_key, &request_body).await {
            Ok(reply) => {
                reply.is_clean()
                    && reply
                        .body
                        .get("candidates")
                        .and_then(|c| c.as_array())
                        .is_some_and(|arr| !arr.is_empty())
            }
            Err(err) => {
                log::warn!("Gemini credential check failed: {}", err);
                false
            }
        }
    }
}
