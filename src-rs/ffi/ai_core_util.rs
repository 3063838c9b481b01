use napi::bindgen_prelude::*;
use napi_derive::napi;

use crate::config::AiSettings;
use crate::cons::provider_cons::ProviderId;
use crate::llm::models::provider_base::{GenerationOptions, Message, NeutralResponse, Role};
use crate::llm::prompts::AnalysisTemplate;
use crate::llm::service::ProviderStatus;
use crate::llm::synthesis::{
    AnalysisType, SourceItem, SourceReference, SourceType, SynthesisRequest, SynthesisResult,
};
use crate::llm::utils::error_normalizer;

#[napi(object)]
pub struct CoreMessage {
    pub role: String,
    pub content: String,
}

#[napi(object)]
pub struct CoreGenerationOptions {
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub stream: Option<bool>,
}

#[napi(object)]
pub struct CoreResponse {
    pub success: bool,
    pub content: String,
    pub tokens_used: Option<u32>,
    pub error: Option<String>,
    pub error_code: Option<String>,
}

#[napi(object)]
pub struct CoreProviderStatus {
    pub id: String,
    pub display_name: String,
    pub default_model: String,
    pub resolved_model: String,
    pub api_key_format_hint: Option<String>,
    pub configured: bool,
    pub active: bool,
}

#[napi(object)]
pub struct CoreTemplate {
    pub id: String,
    pub label: String,
}

#[napi(object)]
pub struct CoreSourceItem {
    pub title: String,
    pub content: String,
    #[napi(js_name = "type")]
    pub source_type: String,
    pub url: Option<String>,
    pub file_path: Option<String>,
    pub site_name: Option<String>,
}

#[napi(object)]
pub struct CoreSynthesisRequest {
    pub sources: Vec<CoreSourceItem>,
    pub analysis_type: Option<String>,
    pub custom_prompt: Option<String>,
    pub include_source_references: Option<bool>,
    pub language: Option<String>,
}

#[napi(object)]
pub struct CoreSourceReference {
    pub index: u32,
    pub title: String,
    #[napi(js_name = "type")]
    pub source_type: String,
    pub url: Option<String>,
    pub file_path: Option<String>,
    pub char_count: u32,
}

#[napi(object)]
pub struct CoreSynthesisResult {
    pub response: CoreResponse,
    pub title: String,
    pub document: Option<String>,
    pub sources: Vec<CoreSourceReference>,
    pub total_chars: u32,
    pub provider: Option<String>,
    pub model: Option<String>,
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

pub fn parse_settings(json: Option<String>) -> Result<AiSettings> {
    let settings = match json.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(json) => AiSettings::from_json(json),
        None => AiSettings::load(),
    };
    settings.map_err(|e| Error::from_reason(format!("Failed to load AI settings: {:#}", e)))
}

fn rejected(message: String) -> CoreResponse {
    to_core_response(error_normalizer::local(message))
}

pub fn parse_provider(name: &str) -> std::result::Result<ProviderId, CoreResponse> {
    ProviderId::from_name(name).ok_or_else(|| rejected(format!("Unknown provider '{}'", name)))
}

pub fn parse_template(name: &str) -> std::result::Result<AnalysisTemplate, CoreResponse> {
    AnalysisTemplate::from_name(name).ok_or_else(|| rejected(format!("Unknown template '{}'", name)))
}

pub fn list_templates() -> Vec<CoreTemplate> {
    AnalysisTemplate::ALL
        .iter()
        .map(|t| CoreTemplate {
            id: t.as_str().to_string(),
            label: t.label().to_string(),
        })
        .collect()
}

pub fn to_messages(messages: Vec<CoreMessage>) -> std::result::Result<Vec<Message>, CoreResponse> {
    messages
        .into_iter()
        .map(|m| match Role::from_name(&m.role) {
            Some(role) => Ok(Message::new(role, m.content)),
            None => Err(rejected(format!("Unknown message role '{}'", m.role))),
        })
        .collect()
}

pub fn to_options(options: Option<CoreGenerationOptions>) -> GenerationOptions {
    let mut out = GenerationOptions::default();
    let Some(options) = options else {
        return out;
    };
    out.model = options.model;
    if let Some(t) = options.temperature {
        out.temperature = t;
    }
    if let Some(m) = options.max_tokens {
        out.max_tokens = m;
    }
    out.stream = options.stream;
    out
}

pub fn to_core_response(response: NeutralResponse) -> CoreResponse {
    CoreResponse {
        success: response.success(),
        tokens_used: response.tokens_used(),
        error: response.error().map(str::to_string),
        error_code: response.error_code().map(|k| k.as_str().to_string()),
        content: response.into_content(),
    }
}

pub fn to_core_status(status: ProviderStatus) -> CoreProviderStatus {
    CoreProviderStatus {
        id: status.id.provider_name().to_string(),
        display_name: status.display_name.to_string(),
        default_model: status.default_model.to_string(),
        resolved_model: status.resolved_model,
        api_key_format_hint: status.api_key_format_hint.map(str::to_string),
        configured: status.configured,
        active: status.active,
    }
}

pub fn to_synthesis_request(
    request: CoreSynthesisRequest,
) -> std::result::Result<SynthesisRequest, CoreResponse> {
    let sources = request
        .sources
        .into_iter()
        .map(|s| -> std::result::Result<SourceItem, CoreResponse> {
            let source_type = SourceType::from_name(&s.source_type)
                .ok_or_else(|| rejected(format!("Unknown source type '{}'", s.source_type)))?;
            let mut item = SourceItem::new(source_type, s.title, s.content);
            if let Some(url) = s.url {
                item = item.with_url(url);
            }
            if let Some(path) = s.file_path {
                item = item.with_file_path(path);
            }
            item.metadata.site_name = s.site_name;
            Ok(item)
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    // Absent means the default; a name that does not parse is an error.
    let analysis_type = match request.analysis_type.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(name) => AnalysisType::from_name(name)
            .ok_or_else(|| rejected(format!("Unknown analysis type '{}'", name)))?,
        None => AnalysisType::default(),
    };

    let mut out = SynthesisRequest::new(sources, analysis_type)
        .with_source_references(request.include_source_references.unwrap_or(true));
    out.custom_prompt = request.custom_prompt;
    out.language = request.language;
    Ok(out)
}

fn to_core_reference(reference: SourceReference) -> CoreSourceReference {
    CoreSourceReference {
        index: count_u32(reference.index),
        title: reference.title,
        source_type: reference.source_type.as_str().to_string(),
        url: reference.url,
        file_path: reference.file_path,
        char_count: count_u32(reference.char_count),
    }
}

pub fn to_core_synthesis(result: SynthesisResult) -> CoreSynthesisResult {
    CoreSynthesisResult {
        response: to_core_response(result.response),
        title: result.title,
        document: result.document,
        sources: result.sources.into_iter().map(to_core_reference).collect(),
        total_chars: count_u32(result.total_chars),
        provider: result.provider.map(|p| p.provider_name().to_string()),
        model: result.model,
    }
}

/// Result shape for a request that was rejected before any source was read.
pub fn rejected_synthesis(response: CoreResponse) -> CoreSynthesisResult {
    CoreSynthesisResult {
        response,
        title: String::new(),
        document: None,
        sources: Vec::new(),
        total_chars: 0,
        provider: None,
        model: None,
    }
}
