use std::path::Path;

use serde::{Deserialize, Serialize};

use frostline_core::models;
use frostline_core::FrostlineError;

pub const DEFAULT_TOKEN_TYPE: &str = "PROGRAMMATIC_ACCESS_TOKEN";

/// Keys accepted in `config.json`.
pub const KNOWN_KEYS: &[&str] = &[
    "account_url",
    "token",
    "token_type",
    "role",
    "warehouse",
    "default_model",
    "replay_history",
    "log_level",
];

/// Connection and session settings, stored in `<store_root>/config.json`.
///
/// Dataset identifiers are not part of this file; they are fixed in
/// `frostline_core::dataset`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FrostlineConfig {
    /// Account URL, e.g. `https://xy12345.snowflakecomputing.com`.
    pub account_url: Option<String>,
    pub token: Option<String>,
    pub token_type: String,
    pub role: Option<String>,
    pub warehouse: Option<String>,
    pub default_model: Option<String>,
    /// Replay the whole transcript before every chat cycle.
    pub replay_history: bool,
    pub log_level: Option<String>,
}

impl Default for FrostlineConfig {
    fn default() -> Self {
        Self {
            account_url: None,
            token: None,
            token_type: DEFAULT_TOKEN_TYPE.to_string(),
            role: None,
            warehouse: None,
            default_model: None,
            replay_history: false,
            log_level: None,
        }
    }
}

impl FrostlineConfig {
    /// Load from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Load from a JSON file, falling back to defaults when it cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{e}. Using defaults.");
                Self::default()
            }
        }
    }

    /// Apply `FROSTLINE_*` environment overrides from `lookup`.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = non_empty("FROSTLINE_ACCOUNT_URL") {
            self.account_url = Some(v);
        }
        if let Some(v) = non_empty("FROSTLINE_TOKEN") {
            self.token = Some(v);
        }
        if let Some(v) = non_empty("FROSTLINE_TOKEN_TYPE") {
            self.token_type = v;
        }
        if let Some(v) = non_empty("FROSTLINE_ROLE") {
            self.role = Some(v);
        }
        if let Some(v) = non_empty("FROSTLINE_WAREHOUSE") {
            self.warehouse = Some(v);
        }
        if let Some(v) = non_empty("FROSTLINE_MODEL") {
            self.default_model = Some(v);
        }
        self
    }

    /// Load `path` and apply the process environment on top.
    pub fn resolve(path: &Path) -> anyhow::Result<Self> {
        Ok(Self::load(path)?.with_env_overrides(|k| std::env::var(k).ok()))
    }

    /// The model a new session starts with.
    pub fn initial_model(&self) -> Result<String, FrostlineError> {
        match &self.default_model {
            Some(name) => models::validate_model(name),
            None => Ok(models::default_model().to_string()),
        }
    }

    pub fn require_account_url(&self) -> anyhow::Result<&str> {
        self.account_url
            .as_deref()
            .map(|u| u.trim_end_matches('/'))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No account URL configured. Run `frostline config set account_url <url>` or set FROSTLINE_ACCOUNT_URL."
                )
            })
    }

    pub fn require_token(&self) -> anyhow::Result<&str> {
        self.token.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "No access token configured. Set FROSTLINE_TOKEN or run `frostline config set token <token>`."
            )
        })
    }
}

/// Mask all but the last four characters of a secret for display.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{tail}", "*".repeat(chars.len() - 4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn load_missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = FrostlineConfig::load(&tmp.path().join("config.json")).unwrap();
        assert_eq!(config, FrostlineConfig::default());
        assert_eq!(config.token_type, DEFAULT_TOKEN_TYPE);
    }

    #[test]
    fn load_partial_file_fills_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"account_url":"https://acme.snowflakecomputing.com","replay_history":true}"#,
        )
        .unwrap();
        let config = FrostlineConfig::load(&path).unwrap();
        assert_eq!(
            config.account_url.as_deref(),
            Some("https://acme.snowflakecomputing.com")
        );
        assert!(config.replay_history);
        assert_eq!(config.token_type, DEFAULT_TOKEN_TYPE);
    }

    #[test]
    fn load_invalid_json_errors_but_load_or_default_recovers() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(FrostlineConfig::load(&path).is_err());
        assert_eq!(
            FrostlineConfig::load_or_default(&path),
            FrostlineConfig::default()
        );
    }

    #[test]
    fn env_overrides_take_precedence() {
        let env: HashMap<&str, &str> = [
            ("FROSTLINE_ACCOUNT_URL", "https://env.snowflakecomputing.com"),
            ("FROSTLINE_TOKEN", "secret-token"),
            ("FROSTLINE_MODEL", "mistral-large2"),
            ("FROSTLINE_ROLE", "  "),
        ]
        .into_iter()
        .collect();
        let base = FrostlineConfig {
            account_url: Some("https://file.snowflakecomputing.com".into()),
            role: Some("ANALYST".into()),
            ..FrostlineConfig::default()
        };
        let config = base.with_env_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(
            config.account_url.as_deref(),
            Some("https://env.snowflakecomputing.com")
        );
        assert_eq!(config.token.as_deref(), Some("secret-token"));
        assert_eq!(config.default_model.as_deref(), Some("mistral-large2"));
        // blank values do not override
        assert_eq!(config.role.as_deref(), Some("ANALYST"));
    }

    #[test]
    fn initial_model_defaults_and_validates() {
        let config = FrostlineConfig::default();
        assert_eq!(config.initial_model().unwrap(), "claude-3-5-sonnet");

        let config = FrostlineConfig {
            default_model: Some("not-a-model".into()),
            ..FrostlineConfig::default()
        };
        assert!(matches!(
            config.initial_model(),
            Err(FrostlineError::UnknownModel(_))
        ));
    }

    #[test]
    fn account_url_trailing_slash_trimmed() {
        let config = FrostlineConfig {
            account_url: Some("https://acme.snowflakecomputing.com/".into()),
            ..FrostlineConfig::default()
        };
        assert_eq!(
            config.require_account_url().unwrap(),
            "https://acme.snowflakecomputing.com"
        );
        assert!(FrostlineConfig::default().require_token().is_err());
    }

    #[test]
    fn mask_secret_keeps_tail() {
        assert_eq!(mask_secret("abcdefgh"), "****efgh");
        assert_eq!(mask_secret("abc"), "***");
        assert_eq!(mask_secret(""), "");
    }

    #[test]
    fn known_keys_cover_every_field() {
        let val = serde_json::to_value(FrostlineConfig::default()).unwrap();
        for key in val.as_object().unwrap().keys() {
            assert!(KNOWN_KEYS.contains(&key.as_str()), "missing key {key}");
        }
    }
}
