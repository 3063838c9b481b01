use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

use crate::cons::provider_cons::ProviderId;

/// Unknown or blank provider names become `None` instead of failing the whole document.
pub fn deserialize_provider_opt_lax<'de, D>(deserializer: D) -> Result<Option<ProviderId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(ProviderId::from_name))
}

/// Provider-keyed string map; entries with unknown provider names are dropped.
pub fn deserialize_provider_map_lax<'de, D>(
    deserializer: D,
) -> Result<HashMap<ProviderId, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<HashMap<String, Option<String>>>::deserialize(deserializer)?;
    let mut out = HashMap::new();
    for (name, value) in raw.unwrap_or_default() {
        let Some(provider) = ProviderId::from_name(&name) else {
            log::debug!("Ignoring settings entry for unknown provider '{}'", name);
            continue;
        };
        if let Some(value) = value {
            out.insert(provider, value);
        }
    }
    Ok(out)
}

pub fn deserialize_bool_lax<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wrapper {
        Bool(bool),
        Str(String),
        Num(i64),
    }

    match Option::<Wrapper>::deserialize(deserializer)? {
        Some(Wrapper::Bool(b)) => Ok(b),
        Some(Wrapper::Str(s)) => Ok(matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes")),
        Some(Wrapper::Num(n)) => Ok(n != 0),
        None => Ok(false),
    }
}

pub fn deserialize_string_lax<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
