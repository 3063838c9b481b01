use crate::llm::models::provider_base::Message;
use crate::llm::utils::string_util::non_blank;

use super::{AnalysisType, SourceItem, SynthesisRequest};

pub const SOURCE_SEPARATOR: &str = "\n\n---\n\n";
pub const SOURCES_LABEL: &str = "=== SOURCES ===";
pub const SOURCES_END_LABEL: &str = "=== END OF SOURCES ===";

/// Fixed-layout block for the source at 1-based `index`.
pub fn render_source_block(index: usize, source: &SourceItem) -> String {
    let mut block = format!("### Source {}: {}\n", index, source.display_title());
    block.push_str(&format!("Type: {}\n", source.source_type.label()));
    if let Some(url) = source.metadata.url.as_deref() {
        block.push_str(&format!("URL: {}\n", url));
    }
    if let Some(path) = source.metadata.file_path.as_deref() {
        block.push_str(&format!("File: {}\n", path));
    }
    block.push_str(&format!("Characters: {}\n\n", source.char_count()));
    block.push_str(source.content.trim_end());
    block
}

/// All sources in input order, separated by a horizontal rule.
pub fn render_sources(sources: &[SourceItem]) -> String {
    sources
        .iter()
        .enumerate()
        .map(|(i, s)| render_source_block(i + 1, s))
        .collect::<Vec<_>>()
        .join(SOURCE_SEPARATOR)
}

pub fn base_instruction(analysis_type: AnalysisType) -> &'static str {
    match analysis_type {
        AnalysisType::Synthesis => {
            "Synthesize the following sources into one coherent analysis. Integrate their key ideas, \
             show where they agree and contrast where they differ."
        }
        AnalysisType::Comparison => {
            "Compare the following sources. Identify the strengths and weaknesses of each one, \
             then explain how their perspectives relate to each other."
        }
        AnalysisType::Summary => {
            "Condense the following sources into a single summary of their most important points."
        }
        AnalysisType::Custom => "",
    }
}

/// A non-blank custom prompt goes first, followed by the type instruction.
pub fn combined_instruction(request: &SynthesisRequest) -> String {
    let base = base_instruction(request.analysis_type);
    match non_blank(request.custom_prompt.as_deref()) {
        Some(custom) if base.is_empty() => custom.to_string(),
        Some(custom) => format!("{}\n\n{}", custom, base),
        None => base.to_string(),
    }
}

pub fn system_prompt(include_source_references: bool, language: &str) -> String {
    let mut prompt = format!(
        "You are an expert research analyst. You combine information from several independent \
         sources into clear, well-structured markdown. Write your entire response in {}.",
        language
    );
    if include_source_references {
        prompt.push_str(
            " Cite the sources inline by their number, for example [Source 1], whenever you use information from them.",
        );
    }
    prompt
}

pub fn user_prompt(request: &SynthesisRequest) -> String {
    let count = request.sources.len();
    let mut prompt = String::new();

    let instruction = combined_instruction(request);
    if !instruction.is_empty() {
        prompt.push_str(&instruction);
        prompt.push_str("\n\n");
    }

    prompt.push_str(SOURCES_LABEL);
    prompt.push_str("\n\n");
    prompt.push_str(&render_sources(&request.sources));
    prompt.push_str("\n\n");
    prompt.push_str(SOURCES_END_LABEL);
    prompt.push_str(&format!(
        "\n\nBase your analysis on all {} {} above.",
        count,
        if count == 1 { "source" } else { "sources" }
    ));
    prompt
}

/// The system and user message pair sent for one synthesis.
pub fn build_messages(request: &SynthesisRequest, language: &str) -> Vec<Message> {
    vec![
        Message::system(system_prompt(request.include_source_references, language)),
        Message::user(user_prompt(request)),
    ]
}
