//! Engine settings, environment-backed with sensible defaults.
//!
//! Settings carry serde derives because hosts store and ship them across
//! process boundaries; the env path exists for embedded use where the host
//! has no settings UI.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Expand a collapsed container when something is dropped into it.
    pub auto_expand_on_drop: bool,
    /// Fail loud on malformed keys inside recognized legacy namespaces.
    /// When false, such keys are logged and passed through untouched.
    pub strict_namespaces: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            auto_expand_on_drop: true,
            strict_namespaces: true,
        }
    }
}

impl EngineSettings {
    /// Read settings from the environment (`.env` honored when present).
    ///
    /// - `SHEETBRIDGE_AUTO_EXPAND`
    /// - `SHEETBRIDGE_STRICT_NAMESPACES`
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        Self {
            auto_expand_on_drop: env_flag("SHEETBRIDGE_AUTO_EXPAND", defaults.auto_expand_on_drop),
            strict_namespaces: env_flag(
                "SHEETBRIDGE_STRICT_NAMESPACES",
                defaults.strict_namespaces,
            ),
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}
