use serde::Serialize;

use crate::cons::provider_cons::ProviderId;
use crate::llm::utils::string_util::escape_link_label;

use super::{AnalysisType, SourceItem, SourceReference, SynthesisRequest};

const MAX_TITLE_CHARS: usize = 80;

/// Traceability fields written as YAML front-matter.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FrontMatter<'a> {
    #[serde(rename = "type")]
    analysis_type: AnalysisType,
    provider: ProviderId,
    model: &'a str,
    source_count: usize,
    total_chars: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sources: Vec<&'a str>,
}

fn front_matter(request: &SynthesisRequest, provider: ProviderId, model: &str) -> String {
    let matter = FrontMatter {
        analysis_type: request.analysis_type,
        provider,
        model,
        source_count: request.sources.len(),
        total_chars: request.total_chars(),
        sources: request
            .sources
            .iter()
            .filter_map(|s| s.metadata.url.as_deref().or(s.metadata.file_path.as_deref()))
            .collect(),
    };
    match serde_yaml::to_string(&matter) {
        Ok(yaml) => format!("---\n{}---\n\n", yaml),
        Err(e) => {
            log::warn!("Failed to render synthesis front-matter: {}", e);
            String::new()
        }
    }
}

/// One reference line: URL link, else wiki link to the file, else the plain title.
pub fn reference_line(reference: &SourceReference) -> String {
    let body = if let Some(url) = reference.url.as_deref() {
        format!("[{}]({})", escape_link_label(&reference.title), url)
    } else if let Some(path) = reference.file_path.as_deref() {
        format!("[[{}]]", path.strip_suffix(".md").unwrap_or(path))
    } else {
        reference.title.clone()
    };
    format!("{}. {}", reference.index, body)
}

/// Final markdown: front-matter, type label, references, character total, body.
pub fn build_document(
    request: &SynthesisRequest,
    provider: ProviderId,
    model: &str,
    body: &str,
) -> String {
    let mut doc = front_matter(request, provider, model);

    doc.push_str(&format!("# {}\n\n", request.analysis_type.label()));

    doc.push_str("## Sources\n\n");
    for reference in SourceReference::from_sources(&request.sources) {
        doc.push_str(&reference_line(&reference));
        doc.push('\n');
    }

    doc.push_str(&format!(
        "\n**Total characters analyzed:** {}\n\n---\n\n",
        request.total_chars()
    ));
    doc.push_str(body.trim());
    doc.push('\n');
    doc
}

/// Note title from the analysis type and the first source. Characters that
/// are not allowed in file names are dropped.
pub fn suggested_title(analysis_type: AnalysisType, sources: &[SourceItem]) -> String {
    let raw = match sources {
        [] => analysis_type.label().to_string(),
        [only] => format!("{}: {}", analysis_type.label(), only.display_title()),
        [first, rest @ ..] => format!(
            "{}: {} and {} more",
            analysis_type.label(),
            first.display_title(),
            rest.len()
        ),
    };

    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '#' | '^' | '[' | ']'))
        .map(|c| if c.is_control() { ' ' } else { c })
        .take(MAX_TITLE_CHARS)
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
