use napi::bindgen_prelude::*;
use napi_derive::napi;
use std::sync::Arc;

use crate::init_logger;
use crate::llm::service::AiService;
use crate::llm::synthesis;

use super::ai_core_util::{
    self, CoreGenerationOptions, CoreMessage, CoreProviderStatus, CoreResponse,
    CoreSynthesisRequest, CoreSynthesisResult, CoreTemplate,
};

/// Node-facing handle owning one [`AiService`].
///
/// Vendor and validation failures resolve to `{ success: false, ... }`;
/// only malformed settings JSON rejects.
#[napi]
pub struct AiCore {
    inner: Arc<AiService>,
}

#[napi]
impl AiCore {
    #[napi(constructor)]
    pub fn new(settings_json: Option<String>) -> Result<Self> {
        init_logger();
        let settings = ai_core_util::parse_settings(settings_json)?;
        let service = AiService::new(settings)
            .map_err(|e| Error::from_reason(format!("Failed to create AI service: {:#}", e)))?;
        Ok(Self {
            inner: Arc::new(service),
        })
    }

    #[napi]
    pub async fn generate(
        &self,
        messages: Vec<CoreMessage>,
        options: Option<CoreGenerationOptions>,
    ) -> Result<CoreResponse> {
        let messages = match ai_core_util::to_messages(messages) {
            Ok(m) => m,
            Err(response) => return Ok(response),
        };
        let options = ai_core_util::to_options(options);
        let response = self.inner.generate(&messages, &options).await;
        Ok(ai_core_util::to_core_response(response))
    }

    #[napi]
    pub async fn generate_with_provider(
        &self,
        provider: String,
        messages: Vec<CoreMessage>,
        options: Option<CoreGenerationOptions>,
    ) -> Result<CoreResponse> {
        let provider = match ai_core_util::parse_provider(&provider) {
            Ok(p) => p,
            Err(response) => return Ok(response),
        };
        let messages = match ai_core_util::to_messages(messages) {
            Ok(m) => m,
            Err(response) => return Ok(response),
        };
        let options = ai_core_util::to_options(options);
        let response = self
            .inner
            .generate_with_provider(provider, &messages, &options)
            .await;
        Ok(ai_core_util::to_core_response(response))
    }

    #[napi]
    pub async fn summarize(
        &self,
        content: String,
        language: Option<String>,
        options: Option<CoreGenerationOptions>,
    ) -> Result<CoreResponse> {
        let options = ai_core_util::to_options(options);
        let response = self
            .inner
            .summarize(&content, language.as_deref(), &options)
            .await;
        Ok(ai_core_util::to_core_response(response))
    }

    #[napi]
    pub async fn generate_with_prompt(
        &self,
        prompt: String,
        content: String,
        options: Option<CoreGenerationOptions>,
    ) -> Result<CoreResponse> {
        let options = ai_core_util::to_options(options);
        let response = self
            .inner
            .generate_with_prompt(&prompt, &content, &options)
            .await;
        Ok(ai_core_util::to_core_response(response))
    }

    #[napi]
    pub async fn analyze_with_template(
        &self,
        template: String,
        content: String,
        provider: Option<String>,
    ) -> Result<CoreResponse> {
        let template = match ai_core_util::parse_template(&template) {
            Ok(t) => t,
            Err(response) => return Ok(response),
        };
        let provider = match provider.as_deref().map(ai_core_util::parse_provider).transpose() {
            Ok(p) => p,
            Err(response) => return Ok(response),
        };
        let response = self
            .inner
            .analyze_with_template(template, &content, provider)
            .await;
        Ok(ai_core_util::to_core_response(response))
    }

    #[napi]
    pub fn list_templates(&self) -> Vec<CoreTemplate> {
        ai_core_util::list_templates()
    }

    #[napi]
    pub async fn synthesize(&self, request: CoreSynthesisRequest) -> Result<CoreSynthesisResult> {
        let request = match ai_core_util::to_synthesis_request(request) {
            Ok(r) => r,
            Err(response) => return Ok(ai_core_util::rejected_synthesis(response)),
        };
        let result = synthesis::synthesize(&self.inner, &request).await;
        Ok(ai_core_util::to_core_synthesis(result))
    }

    #[napi]
    pub async fn test_credential(&self, provider: String, api_key: String) -> Result<bool> {
        let Ok(provider) = ai_core_util::parse_provider(&provider) else {
            return Ok(false);
        };
        Ok(self.inner.test_credential(provider, &api_key).await)
    }

    #[napi]
    pub async fn test_provider(&self, provider: String) -> Result<bool> {
        let Ok(provider) = ai_core_util::parse_provider(&provider) else {
            return Ok(false);
        };
        Ok(self.inner.test_provider(provider).await)
    }

    #[napi]
    pub fn list_providers(&self) -> Vec<CoreProviderStatus> {
        self.inner
            .list_providers()
            .into_iter()
            .map(ai_core_util::to_core_status)
            .collect()
    }

    #[napi]
    pub fn update_settings(&self, settings_json: String) -> Result<()> {
        let settings = ai_core_util::parse_settings(Some(settings_json))?;
        self.inner.update_settings(settings);
        Ok(())
    }

    /// Current settings as JSON, without credentials.
    #[napi]
    pub fn get_settings(&self) -> String {
        serde_json::to_string(self.inner.settings().as_ref()).unwrap_or_else(|_| "{}".to_string())
    }
}
