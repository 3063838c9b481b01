//! Multi-source synthesis.
//!
//! Renders N sources into one aggregated prompt, sends it through
//! [`AiService::generate_with_provider`] exactly once and wraps the answer in
//! a markdown document that points back at every source.

pub mod document;
pub mod prompt;

use serde::{Deserialize, Serialize};

use crate::cons::provider_cons::ProviderId;
use crate::llm::models::provider_base::{GenerationOptions, NeutralResponse};
use crate::llm::service::AiService;
use crate::llm::utils::error_normalizer;
use crate::llm::utils::string_util::{char_len, non_blank};

pub const SYNTHESIS_TEMPERATURE: f64 = 0.7;
pub const SYNTHESIS_MAX_TOKENS: u32 = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    WebClip,
    Note,
    Selection,
    Manual,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::WebClip => "web-clip",
            SourceType::Note => "note",
            SourceType::Selection => "selection",
            SourceType::Manual => "manual",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourceType::WebClip => "Web Clip",
            SourceType::Note => "Note",
            SourceType::Selection => "Selection",
            SourceType::Manual => "Manual Input",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "web-clip" | "webclip" | "web" => Some(SourceType::WebClip),
            "note" => Some(SourceType::Note),
            "selection" => Some(SourceType::Selection),
            "manual" => Some(SourceType::Manual),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default)]
    pub char_count: usize,
}

/// One unit of synthesis input. `char_count` is fixed when the item is built
/// and is what every report uses afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceItem {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub source_type: SourceType,
    #[serde(default)]
    pub metadata: SourceMetadata,
}

/// Record handed over by the content-acquisition service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebClip {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub site_name: Option<String>,
    pub content: String,
}

impl SourceItem {
    pub fn new(
        source_type: SourceType,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let content = content.into();
        let char_count = char_len(&content);
        Self {
            title: title.into(),
            content,
            source_type,
            metadata: SourceMetadata {
                char_count,
                ..Default::default()
            },
        }
    }

    pub fn web_clip(title: impl Into<String>, url: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(SourceType::WebClip, title, content).with_url(url)
    }

    pub fn note(title: impl Into<String>, file_path: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(SourceType::Note, title, content).with_file_path(file_path)
    }

    pub fn selection(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(SourceType::Selection, title, content)
    }

    pub fn manual(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(SourceType::Manual, title, content)
    }

    pub fn from_clip(clip: WebClip) -> Self {
        let mut item = Self::web_clip(clip.title, clip.url, clip.content);
        item.metadata.site_name = clip.site_name.filter(|s| !s.trim().is_empty());
        item
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.metadata.url = non_blank(Some(url.as_str())).map(str::to_string);
        self
    }

    pub fn with_file_path(mut self, file_path: impl Into<String>) -> Self {
        let file_path = file_path.into();
        self.metadata.file_path = non_blank(Some(file_path.as_str())).map(str::to_string);
        self
    }

    pub fn char_count(&self) -> usize {
        self.metadata.char_count
    }

    /// Title shown in prompts and references; never blank.
    pub fn display_title(&self) -> &str {
        non_blank(Some(self.title.as_str())).unwrap_or("Untitled")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    #[default]
    Synthesis,
    Comparison,
    Summary,
    Custom,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::Synthesis => "synthesis",
            AnalysisType::Comparison => "comparison",
            AnalysisType::Summary => "summary",
            AnalysisType::Custom => "custom",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisType::Synthesis => "Multi-Source Synthesis",
            AnalysisType::Comparison => "Source Comparison",
            AnalysisType::Summary => "Combined Summary",
            AnalysisType::Custom => "Custom Analysis",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "synthesis" | "synthesize" => Some(AnalysisType::Synthesis),
            "comparison" | "compare" => Some(AnalysisType::Comparison),
            "summary" | "summarize" => Some(AnalysisType::Summary),
            "custom" => Some(AnalysisType::Custom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    pub sources: Vec<SourceItem>,
    #[serde(default)]
    pub analysis_type: AnalysisType,
    #[serde(default)]
    pub custom_prompt: Option<String>,
    #[serde(default = "default_include_references")]
    pub include_source_references: bool,
    /// Output language; the settings default applies when unset.
    #[serde(default)]
    pub language: Option<String>,
}

fn default_include_references() -> bool {
    true
}

impl SynthesisRequest {
    pub fn new(sources: Vec<SourceItem>, analysis_type: AnalysisType) -> Self {
        Self {
            sources,
            analysis_type,
            custom_prompt: None,
            include_source_references: true,
            language: None,
        }
    }

    pub fn with_custom_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_prompt = Some(prompt.into());
        self
    }

    pub fn with_source_references(mut self, include: bool) -> Self {
        self.include_source_references = include;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn total_chars(&self) -> usize {
        self.sources.iter().map(SourceItem::char_count).sum()
    }
}

/// Back-reference to one input source, in input order starting at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceReference {
    pub index: usize,
    pub title: String,
    #[serde(rename = "type")]
    pub source_type: SourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub char_count: usize,
}

impl SourceReference {
    pub fn from_sources(sources: &[SourceItem]) -> Vec<SourceReference> {
        sources
            .iter()
            .enumerate()
            .map(|(i, s)| SourceReference {
                index: i + 1,
                title: s.display_title().to_string(),
                source_type: s.source_type,
                url: s.metadata.url.clone(),
                file_path: s.metadata.file_path.clone(),
                char_count: s.char_count(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisResult {
    pub response: NeutralResponse,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    pub sources: Vec<SourceReference>,
    pub total_chars: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Location reported by the note sink, when the document was saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_path: Option<String>,
}

impl SynthesisResult {
    fn from_response(request: &SynthesisRequest, response: NeutralResponse) -> Self {
        Self {
            response,
            title: document::suggested_title(request.analysis_type, &request.sources),
            document: None,
            sources: SourceReference::from_sources(&request.sources),
            total_chars: request.total_chars(),
            provider: None,
            model: None,
            saved_path: None,
        }
    }

    pub fn success(&self) -> bool {
        self.response.success()
    }
}

/// Where finished documents go. Returns the location of the saved note.
#[allow(async_fn_in_trait)]
pub trait NoteSink {
    async fn save(&self, title: &str, markdown: &str) -> anyhow::Result<String>;
}

/// Run one synthesis. Succeeds or fails as a whole; there is exactly one
/// vendor call and no retry.
pub async fn synthesize(service: &AiService, request: &SynthesisRequest) -> SynthesisResult {
    if request.sources.is_empty() {
        return SynthesisResult::from_response(request, error_normalizer::local("No sources to synthesize"));
    }

    let settings = service.settings();
    let Some(provider) = settings.provider else {
        return SynthesisResult::from_response(request, error_normalizer::local("No AI provider selected"));
    };
    let language = non_blank(request.language.as_deref()).unwrap_or(settings.language());
    let model = settings.resolve_model(provider);

    let messages = prompt::build_messages(request, language);
    let options = GenerationOptions::default()
        .with_model(model.clone())
        .with_temperature(SYNTHESIS_TEMPERATURE)
        .with_max_tokens(SYNTHESIS_MAX_TOKENS);

    log::info!(
        "Synthesizing {} sources ({}, {} chars) with {}",
        request.sources.len(),
        request.analysis_type.as_str(),
        request.total_chars(),
        provider
    );

    let response = service
        .generate_with_snapshot(&settings, provider, &messages, &options)
        .await;

    let mut result = SynthesisResult::from_response(request, response);
    if result.response.success() {
        result.document = Some(document::build_document(
            request,
            provider,
            &model,
            result.response.content(),
        ));
    }
    result.provider = Some(provider);
    result.model = Some(model);
    result
}

/// [`synthesize`], then hand the finished document to `sink`. A sink error
/// turns the whole result into a failure.
pub async fn synthesize_and_save<S: NoteSink>(
    service: &AiService,
    request: &SynthesisRequest,
    sink: &S,
) -> SynthesisResult {
    let mut result = synthesize(service, request).await;
    let Some(markdown) = result.document.as_deref() else {
        return result;
    };

    match sink.save(&result.title, markdown).await {
        Ok(path) => {
            log::info!("Saved synthesis note to {}", path);
            result.saved_path = Some(path);
        }
        Err(e) => {
            result.response = error_normalizer::local(format!("Failed to save synthesis note: {:#}", e));
        }
    }
    result
}
