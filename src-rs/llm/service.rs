//! AI orchestration service.
//!
//! Owns the live settings snapshot, picks the adapter, key and model for a
//! request and dispatches it. Nothing here returns an error: local
//! validation problems and vendor failures both come back as a failed
//! [`NeutralResponse`].

use anyhow::Result;
use serde::Serialize;
use std::sync::{Arc, RwLock};

use crate::config::AiSettings;
use crate::cons::provider_cons::ProviderId;
use crate::llm::models::provider_base::{GenerationOptions, Message, NeutralResponse, ProviderClient};
use crate::llm::models::provider_handle::ProviderClientFactory;
use crate::llm::prompts::{self, AnalysisTemplate};
use crate::llm::utils::error_normalizer;
use crate::llm::utils::network::build_http_client;
use crate::llm::utils::string_util::non_blank;

/// Registry row plus per-installation state, for settings screens.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    pub id: ProviderId,
    pub display_name: &'static str,
    pub default_model: &'static str,
    pub resolved_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_format_hint: Option<&'static str>,
    pub configured: bool,
    pub active: bool,
}

pub struct AiService {
    settings: RwLock<Arc<AiSettings>>,
    clients: ProviderClientFactory,
}

impl AiService {
    pub fn new(settings: AiSettings) -> Result<Self> {
        Ok(Self::with_http_client(settings, build_http_client()?))
    }

    pub fn with_http_client(settings: AiSettings, http_client: reqwest::Client) -> Self {
        Self {
            settings: RwLock::new(Arc::new(settings)),
            clients: ProviderClientFactory::new(http_client),
        }
    }

    /// Point `provider` at a different base URL (proxy, self-hosted gateway, test server).
    pub fn with_endpoint(mut self, provider: ProviderId, base_url: impl Into<String>) -> Self {
        self.clients.set_endpoint(provider, base_url);
        self
    }

    /// Snapshot of the current settings. Holding it keeps a request consistent
    /// even if the settings are replaced mid-flight.
    pub fn settings(&self) -> Arc<AiSettings> {
        match self.settings.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replace the settings as a whole.
    pub fn update_settings(&self, settings: AiSettings) {
        let next = Arc::new(settings);
        match self.settings.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        log::info!("AI settings replaced");
    }

    pub fn active_provider(&self) -> Option<ProviderId> {
        self.settings().provider
    }

    pub fn is_configured(&self, provider: ProviderId) -> bool {
        self.settings().is_configured(provider)
    }

    pub fn resolve_model(&self, provider: ProviderId) -> String {
        self.settings().resolve_model(provider)
    }

    pub fn list_providers(&self) -> Vec<ProviderStatus> {
        let settings = self.settings();
        ProviderId::ALL
            .iter()
            .map(|id| {
                let cfg = id.config();
                ProviderStatus {
                    id: *id,
                    display_name: cfg.display_name,
                    default_model: cfg.default_model,
                    resolved_model: settings.resolve_model(*id),
                    api_key_format_hint: cfg.api_key_format_hint,
                    configured: settings.is_configured(*id),
                    active: settings.provider == Some(*id),
                }
            })
            .collect()
    }

    /// Generate with the active default provider.
    pub async fn generate(&self, messages: &[Message], options: &GenerationOptions) -> NeutralResponse {
        let settings = self.settings();
        self.generate_active(&settings, messages, options).await
    }

    /// Generate with an explicitly named provider, independent of the active default.
    pub async fn generate_with_provider(
        &self,
        provider: ProviderId,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> NeutralResponse {
        let settings = self.settings();
        self.generate_with_snapshot(&settings, provider, messages, options)
            .await
    }

    async fn generate_active(
        &self,
        settings: &AiSettings,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> NeutralResponse {
        let Some(provider) = settings.provider else {
            return error_normalizer::local("No AI provider selected");
        };
        self.generate_with_snapshot(settings, provider, messages, options)
            .await
    }

    /// Dispatch using only `settings`. Callers that read provider, model or
    /// language from a snapshot must pass that same snapshot here.
    pub(crate) async fn generate_with_snapshot(
        &self,
        settings: &AiSettings,
        provider: ProviderId,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> NeutralResponse {
        let Some(api_key) = settings.api_key(provider) else {
            return error_normalizer::local(format!(
                "API key not configured for {}",
                provider.display_name()
            ));
        };
        if messages.is_empty() {
            return error_normalizer::local("No messages to send");
        }

        let mut options = options.clone();
        if non_blank(options.model.as_deref()).is_none() {
            options.model = Some(settings.resolve_model(provider));
        }

        log::info!(
            "Calling {} ({}) with {} messages",
            provider,
            options.model.as_deref().unwrap_or_default(),
            messages.len()
        );

        let client = self.clients.client_for(provider);
        let response = client.generate(messages, api_key, &options).await;
        if response.success() {
            log::debug!("{} answered, tokens {:?}", provider, response.tokens_used());
        }
        response
    }

    pub async fn summarize(
        &self,
        content: &str,
        language: Option<&str>,
        options: &GenerationOptions,
    ) -> NeutralResponse {
        let settings = self.settings();
        let language = non_blank(language).unwrap_or(settings.language());
        self.generate_active(&settings, &prompts::summarize_messages(content, language), options)
            .await
    }

    /// Apply an arbitrary instruction to `content` with the active provider.
    pub async fn generate_with_prompt(
        &self,
        prompt: &str,
        content: &str,
        options: &GenerationOptions,
    ) -> NeutralResponse {
        if prompt.trim().is_empty() {
            return error_normalizer::local("Prompt is empty");
        }
        let settings = self.settings();
        let messages = prompts::prompt_messages(prompt, content, settings.language());
        self.generate_active(&settings, &messages, options).await
    }

    /// Run a built-in template, optionally against a specific provider.
    pub async fn analyze_with_template(
        &self,
        template: AnalysisTemplate,
        content: &str,
        provider: Option<ProviderId>,
    ) -> NeutralResponse {
        let settings = self.settings();
        let Some(provider) = provider.or(settings.provider) else {
            return error_normalizer::local("No AI provider selected");
        };
        let messages =
            prompts::prompt_messages(&template.instruction(settings.language()), content, settings.language());
        self.generate_with_snapshot(&settings, provider, &messages, &GenerationOptions::default())
            .await
    }

    /// Check an arbitrary key against `provider` without storing it. The
    /// check runs against the model this installation would use.
    pub async fn test_credential(&self, provider: ProviderId, api_key: &str) -> bool {
        let model = self.resolve_model(provider);
        self.check_credential(provider, api_key, &model).await
    }

    /// Check the stored key for `provider`; `false` when none is configured.
    pub async fn test_provider(&self, provider: ProviderId) -> bool {
        let settings = self.settings();
        match settings.api_key(provider) {
            Some(key) => {
                self.check_credential(provider, key, &settings.resolve_model(provider))
                    .await
            }
            None => false,
        }
    }

    async fn check_credential(&self, provider: ProviderId, api_key: &str, model: &str) -> bool {
        if api_key.trim().is_empty() {
            return false;
        }
        log::info!("Testing {} credential with {}", provider, model);
        self.clients
            .client_for(provider)
            .test_credential(api_key.trim(), Some(model))
            .await
    }
}
