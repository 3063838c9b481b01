use std::collections::HashMap;

use crate::cons::provider_cons::ProviderId;

use super::claude::ClaudeClient;
use super::gemini::GeminiClient;
use super::glm::GlmClient;
use super::openai::{create_grok, create_openai, OpenAiClient};
pub use super::provider_base::{GenerationOptions, Message, NeutralResponse, ProviderClient};

pub enum AnyProviderClient {
    Gemini(GeminiClient),
    Grok(OpenAiClient),
    Claude(ClaudeClient),
    OpenAI(OpenAiClient),
    Glm(GlmClient),
}

impl ProviderClient for AnyProviderClient {
    fn provider(&self) -> ProviderId {
        match self {
            AnyProviderClient::Gemini(c) => c.provider(),
            AnyProviderClient::Grok(c) => c.provider(),
            AnyProviderClient::Claude(c) => c.provider(),
            AnyProviderClient::OpenAI(c) => c.provider(),
            AnyProviderClient::Glm(c) => c.provider(),
        }
    }

    async fn generate(
        &self,
        messages: &[Message],
        api_key: &str,
        options: &GenerationOptions,
    ) -> NeutralResponse {
        match self {
            AnyProviderClient::Gemini(c) => c.generate(messages, api_key, options).await,
            AnyProviderClient::Grok(c) => c.generate(messages, api_key, options).await,
            AnyProviderClient::Claude(c) => c.generate(messages, api_key, options).await,
            AnyProviderClient::OpenAI(c) => c.generate(messages, api_key, options).await,
            AnyProviderClient::Glm(c) => c.generate(messages, api_key, options).await,
        }
    }

    async fn test_credential(&self, api_key: &str, model: Option<&str>) -> bool {
        match self {
            AnyProviderClient::Gemini(c) => c.test_credential(api_key, model).await,
            AnyProviderClient::Grok(c) => c.test_credential(api_key, model).await,
            AnyProviderClient::Claude(c) => c.test_credential(api_key, model).await,
            AnyProviderClient::OpenAI(c) => c.test_credential(api_key, model).await,
            AnyProviderClient::Glm(c) => c.test_credential(api_key, model).await,
        }
    }
}

pub fn create_client(
    provider: ProviderId,
    base_url: String,
    http_client: reqwest::Client,
) -> AnyProviderClient {
    match provider {
        ProviderId::Gemini => AnyProviderClient::Gemini(GeminiClient::new(base_url, http_client)),
        ProviderId::Grok => AnyProviderClient::Grok(create_grok(base_url, http_client)),
        ProviderId::Claude => AnyProviderClient::Claude(ClaudeClient::new(base_url, http_client)),
        ProviderId::OpenAI => AnyProviderClient::OpenAI(create_openai(base_url, http_client)),
        ProviderId::Glm => AnyProviderClient::Glm(GlmClient::new(base_url, http_client)),
    }
}

/// Builds adapters on demand, sharing one HTTP client. Endpoint overrides
/// replace the registry base URL for a provider (used for proxies and tests).
#[derive(Clone)]
pub struct ProviderClientFactory {
    http_client: reqwest::Client,
    endpoints: HashMap<ProviderId, String>,
}

impl ProviderClientFactory {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            endpoints: HashMap::new(),
        }
    }

    pub fn set_endpoint(&mut self, provider: ProviderId, base_url: impl Into<String>) {
        self.endpoints.insert(provider, base_url.into());
    }

    pub fn endpoint(&self, provider: ProviderId) -> &str {
        self.endpoints
            .get(&provider)
            .map(String::as_str)
            .unwrap_or(provider.config().endpoint_base)
    }

    pub fn client_for(&self, provider: ProviderId) -> AnyProviderClient {
        create_client(
            provider,
            self.endpoint(provider).to_string(),
            self.http_client.clone(),
        )
    }
}
