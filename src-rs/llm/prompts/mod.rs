//! Fixed prompt text used by the service shortcuts.

use serde::{Deserialize, Serialize};

use crate::llm::models::provider_base::Message;

/// Messages for the plain summary shortcut.
pub fn summarize_messages(content: &str, language: &str) -> Vec<Message> {
    vec![
        Message::system(format!(
            "You are a helpful assistant that writes clear, accurate summaries of web content and notes. \
             Always respond in {}.",
            language
        )),
        Message::user(format!(
            "Please summarize the following content in {}. Capture the main points and key details \
             in well-structured markdown.\n\n{}",
            language, content
        )),
    ]
}

/// Messages for an arbitrary instruction applied to a piece of content.
pub fn prompt_messages(prompt: &str, content: &str, language: &str) -> Vec<Message> {
    vec![
        Message::system(format!(
            "You are a helpful assistant that analyzes web content and notes. Respond in {} using markdown.",
            language
        )),
        Message::user(format!("{}\n\n---\n\n{}", prompt.trim(), content)),
    ]
}

/// Built-in analysis shortcuts offered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisTemplate {
    Summary,
    KeyPoints,
    Outline,
    Critique,
    Questions,
    Translate,
}

impl AnalysisTemplate {
    pub const ALL: [AnalysisTemplate; 6] = [
        AnalysisTemplate::Summary,
        AnalysisTemplate::KeyPoints,
        AnalysisTemplate::Outline,
        AnalysisTemplate::Critique,
        AnalysisTemplate::Questions,
        AnalysisTemplate::Translate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisTemplate::Summary => "summary",
            AnalysisTemplate::KeyPoints => "key-points",
            AnalysisTemplate::Outline => "outline",
            AnalysisTemplate::Critique => "critique",
            AnalysisTemplate::Questions => "questions",
            AnalysisTemplate::Translate => "translate",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisTemplate::Summary => "Summary",
            AnalysisTemplate::KeyPoints => "Key points",
            AnalysisTemplate::Outline => "Outline",
            AnalysisTemplate::Critique => "Critical review",
            AnalysisTemplate::Questions => "Study questions",
            AnalysisTemplate::Translate => "Translation",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "summary" => Some(AnalysisTemplate::Summary),
            "key-points" | "keypoints" => Some(AnalysisTemplate::KeyPoints),
            "outline" => Some(AnalysisTemplate::Outline),
            "critique" | "review" => Some(AnalysisTemplate::Critique),
            "questions" => Some(AnalysisTemplate::Questions),
            "translate" | "translation" => Some(AnalysisTemplate::Translate),
            _ => None,
        }
    }

    pub fn instruction(&self, language: &str) -> String {
        match self {
            AnalysisTemplate::Summary => format!(
                "Write a concise summary of the content below in {}. Start with a one-sentence overview, \
                 then list the most important details.",
                language
            ),
            AnalysisTemplate::KeyPoints => format!(
                "Extract the key points of the content below as a bulleted list in {}. \
                 Keep each point short and factual.",
                language
            ),
            AnalysisTemplate::Outline => format!(
                "Produce a hierarchical outline of the content below in {} using markdown headings and nested lists.",
                language
            ),
            AnalysisTemplate::Critique => format!(
                "Critically review the content below in {}: assess its arguments, evidence and possible biases, \
                 and note anything that is missing.",
                language
            ),
            AnalysisTemplate::Questions => format!(
                "Write study questions in {} that test understanding of the content below, followed by short answers.",
                language
            ),
            AnalysisTemplate::Translate => format!(
                "Translate the content below into {}. Preserve the structure and formatting.",
                language
            ),
        }
    }
}
