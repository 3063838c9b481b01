use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Gemini,
    Grok,
    Claude,
    OpenAI,
    Glm,
}

impl ProviderId {
    pub const ALL: [ProviderId; 5] = [
        ProviderId::Gemini,
        ProviderId::Grok,
        ProviderId::Claude,
        ProviderId::OpenAI,
        ProviderId::Glm,
    ];

    /// Returns the identifier used in settings files (e.g., "openai", "claude")
    pub fn provider_name(&self) -> &'static str {
        match self {
            ProviderId::Gemini => "gemini",
            ProviderId::Grok => "grok",
            ProviderId::Claude => "claude",
            ProviderId::OpenAI => "openai",
            ProviderId::Glm => "glm",
        }
    }

    /// Helper to parse from a string (handles aliases)
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Some(ProviderId::Gemini),
            "grok" | "xai" => Some(ProviderId::Grok),
            "claude" | "anthropic" => Some(ProviderId::Claude),
            "openai" => Some(ProviderId::OpenAI),
            "glm" | "zhipu" | "zhipuai" => Some(ProviderId::Glm),
            _ => None,
        }
    }

    pub fn config(&self) -> &'static ProviderConfig {
        match self {
            ProviderId::Gemini => &PROVIDER_REGISTRY[0],
            ProviderId::Grok => &PROVIDER_REGISTRY[1],
            ProviderId::Claude => &PROVIDER_REGISTRY[2],
            ProviderId::OpenAI => &PROVIDER_REGISTRY[3],
            ProviderId::Glm => &PROVIDER_REGISTRY[4],
        }
    }

    pub fn display_name(&self) -> &'static str {
        self.config().display_name
    }

    /// Short vendor name used as the prefix of error messages.
    pub fn vendor_label(&self) -> &'static str {
        match self {
            ProviderId::Gemini => "Gemini",
            ProviderId::Grok => "Grok",
            ProviderId::Claude => "Claude",
            ProviderId::OpenAI => "OpenAI",
            ProviderId::Glm => "GLM",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.provider_name())
    }
}

/// Static description of a supported vendor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub id: ProviderId,
    pub display_name: &'static str,
    pub default_model: &'static str,
    pub endpoint_base: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_format_hint: Option<&'static str>,
}

pub static PROVIDER_REGISTRY: [ProviderConfig; 5] = [
    ProviderConfig {
        id: ProviderId::Gemini,
        display_name: "Google Gemini",
        default_model: "gemini-2.0-flash",
        endpoint_base: "https://generativelanguage.googleapis.com/v1beta",
        api_key_format_hint: Some("AIza..."),
    },
    ProviderConfig {
        id: ProviderId::Grok,
        display_name: "xAI Grok",
        default_model: "grok-2-latest",
        endpoint_base: "https://api.x.ai/v1",
        api_key_format_hint: Some("xai-..."),
    },
    ProviderConfig {
        id: ProviderId::Claude,
        display_name: "Anthropic Claude",
        default_model: "claude-3-5-sonnet-20241022",
        endpoint_base: "https://api.anthropic.com/v1",
        api_key_format_hint: Some("sk-ant-..."),
    },
    ProviderConfig {
        id: ProviderId::OpenAI,
        display_name: "OpenAI",
        default_model: "gpt-4o-mini",
        endpoint_base: "https://api.openai.com/v1",
        api_key_format_hint: Some("sk-..."),
    },
    ProviderConfig {
        id: ProviderId::Glm,
        display_name: "Zhipu GLM",
        default_model: "glm-4-flash",
        endpoint_base: "https://open.bigmodel.cn/api/paas/v4",
        api_key_format_hint: Some("id.secret"),
    },
];
