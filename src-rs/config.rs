use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cons::provider_cons::ProviderId;
use crate::llm::utils::serde_util::{
    deserialize_bool_lax, deserialize_provider_map_lax, deserialize_provider_opt_lax,
    deserialize_string_lax,
};

pub const DEFAULT_LANGUAGE: &str = "English";
const SETTINGS_DIR: &str = ".webnote";
const SETTINGS_FILE: &str = "ai-settings.json";

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// AI settings as held by the host's settings store.
///
/// Recognized keys: `provider`, `apiKeys`, `models`, `useCustomModel`,
/// `customModel`, `defaultLanguage`. Unknown keys are ignored and missing
/// keys take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    /// Active default provider
    #[serde(default, deserialize_with = "deserialize_provider_opt_lax")]
    pub provider: Option<ProviderId>,

    /// Secrets per provider; never written back by this crate
    #[serde(default, alias = "api_keys", deserialize_with = "deserialize_provider_map_lax", skip_serializing)]
    pub api_keys: HashMap<ProviderId, String>,

    /// Configured model per provider
    #[serde(default, deserialize_with = "deserialize_provider_map_lax")]
    pub models: HashMap<ProviderId, String>,

    #[serde(default, alias = "use_custom_model", deserialize_with = "deserialize_bool_lax")]
    pub use_custom_model: bool,

    #[serde(default, alias = "custom_model", deserialize_with = "deserialize_string_lax")]
    pub custom_model: String,

    #[serde(default = "default_language", alias = "default_language", deserialize_with = "deserialize_string_lax")]
    pub default_language: String,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider: None,
            api_keys: HashMap::new(),
            models: HashMap::new(),
            use_custom_model: false,
            custom_model: String::new(),
            default_language: default_language(),
        }
    }
}

impl AiSettings {
    /// Parse the host store's JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse AI settings JSON")
    }

    /// Non-blank credential for `provider`, if any.
    pub fn api_key(&self, provider: ProviderId) -> Option<&str> {
        self.api_keys
            .get(&provider)
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
    }

    pub fn is_configured(&self, provider: ProviderId) -> bool {
        self.api_key(provider).is_some()
    }

    /// The custom model applies only to the active default provider. Otherwise
    /// the configured model for `provider` is used, falling back to the
    /// registry default.
    pub fn resolve_model(&self, provider: ProviderId) -> String {
        let custom = self.custom_model.trim();
        if self.use_custom_model && !custom.is_empty() && self.provider == Some(provider) {
            return custom.to_string();
        }
        self.models
            .get(&provider)
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .unwrap_or(provider.config().default_model)
            .to_string()
    }

    pub fn language(&self) -> &str {
        let lang = self.default_language.trim();
        if lang.is_empty() {
            DEFAULT_LANGUAGE
        } else {
            lang
        }
    }

    /// Load with layered strategy:
    /// 1. Defaults (Embedded Config.toml)
    /// 2. User patch (~/.webnote/ai-settings.json)
    /// 3. Project patch (./.webnote/ai-settings.json)
    pub fn load() -> Result<Self> {
        let user_path = dirs::home_dir().map(|home| home.join(SETTINGS_DIR).join(SETTINGS_FILE));
        let project_path = Path::new(SETTINGS_DIR).join(SETTINGS_FILE);
        Self::load_layers(user_path, Some(project_path))
    }

    pub fn load_layers(user_path: Option<PathBuf>, project_path: Option<PathBuf>) -> Result<Self> {
        let default_str = include_str!("../Config.toml");
        let mut settings: AiSettings =
            toml::from_str(default_str).context("Failed to parse embedded Config.toml")?;

        for path in [user_path, project_path].into_iter().flatten() {
            Self::apply_patch(&mut settings, &path);
        }

        Ok(settings)
    }

    pub(crate) fn apply_patch<P: AsRef<Path>>(settings: &mut AiSettings, path: P) {
        let path = path.as_ref();
        if !path.exists() {
            return;
        }
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Failed to read settings patch at {}: {}", path.display(), e);
                return;
            }
        };
        match serde_json::from_str::<AiSettingsPatch>(&content) {
            Ok(patch) => patch.apply_to(settings),
            Err(e) => {
                log::warn!("Failed to parse settings patch at {}: {}", path.display(), e);
            }
        }
    }
}

/// Partial settings document; absent keys leave the current value alone.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSettingsPatch {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default, alias = "api_keys", deserialize_with = "deserialize_provider_map_lax")]
    pub api_keys: HashMap<ProviderId, String>,
    #[serde(default, deserialize_with = "deserialize_provider_map_lax")]
    pub models: HashMap<ProviderId, String>,
    #[serde(default, alias = "use_custom_model")]
    pub use_custom_model: Option<bool>,
    #[serde(default, alias = "custom_model")]
    pub custom_model: Option<String>,
    #[serde(default, alias = "default_language")]
    pub default_language: Option<String>,
}

impl AiSettingsPatch {
    pub fn apply_to(self, settings: &mut AiSettings) {
        if let Some(provider) = self.provider {
            settings.provider = ProviderId::from_name(&provider);
        }
        settings.api_keys.extend(self.api_keys);
        settings.models.extend(self.models);
        if let Some(v) = self.use_custom_model {
            settings.use_custom_model = v;
        }
        if let Some(v) = self.custom_model {
            settings.custom_model = v;
        }
        if let Some(v) = self.default_language {
            settings.default_language = v;
        }
    }
}
