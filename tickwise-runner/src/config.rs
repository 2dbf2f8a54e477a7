//! Engine configuration, loaded from TOML.
//!
//! Every section and every field is optional; anything left out takes the
//! documented default. Validation runs on every load so an `EngineConfig`
//! obtained from `from_toml_str` / `from_file` is always usable.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tickwise_core::indicators::{IndicatorParams, ParamsError};
use tickwise_core::risk::RiskParams;
use tickwise_core::scoring::{PolicyError, ScoringPolicy};

/// Longest generative call the engine will wait for.
pub const MAX_INSIGHT_TIMEOUT_MS: u64 = 60_000;

/// Keys this short are treated as placeholders, not credentials.
const MIN_CREDENTIAL_LEN: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Indicators(#[from] ParamsError),

    #[error(transparent)]
    Scoring(#[from] PolicyError),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub risk: RiskParams,
    pub indicators: IndicatorParams,
    pub scoring: ScoringPolicy,
    pub insight: InsightConfig,
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let risk = &self.risk;
        if !risk.risk_free_rate.is_finite() {
            return Err(invalid("risk.risk_free_rate", "must be a finite number"));
        }
        if risk.trading_days == 0 {
            return Err(invalid("risk.trading_days", "must be >= 1"));
        }
        if risk.beta_min_overlap < 2 {
            return Err(invalid("risk.beta_min_overlap", "must be >= 2"));
        }

        self.indicators.validate()?;
        self.scoring.validate()?;
        self.insight.validate()
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Settings for the generative insight call.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Master switch; `false` forces the rule-based path even with a credential.
    pub enabled: bool,
    /// OpenAI-compatible endpoint root (`/chat/completions` is appended).
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Explicit key; takes precedence over `api_key_env`. Never serialized.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub timeout_ms: u64,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.deepseek.com".to_string(),
            model: "deepseek-chat".to_string(),
            api_key_env: "DEEPSEEK_API_KEY".to_string(),
            api_key: None,
            timeout_ms: 10_000,
            temperature: 0.3,
            max_tokens: 1000,
        }
    }
}

impl fmt::Debug for InsightConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsightConfig")
            .field("enabled", &self.enabled)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key_env", &self.api_key_env)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl InsightConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The usable API key, if any: the explicit key first, then the
    /// environment variable. Placeholders count as absent.
    pub fn resolve_credential(&self) -> Option<String> {
        if !self.enabled {
            return None;
        }
        self.api_key
            .clone()
            .filter(|k| is_usable_credential(k))
            .or_else(|| {
                std::env::var(&self.api_key_env)
                    .ok()
                    .filter(|k| is_usable_credential(k))
            })
            .map(|k| k.trim().to_string())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 || self.timeout_ms > MAX_INSIGHT_TIMEOUT_MS {
            return Err(invalid(
                "insight.timeout_ms",
                format!("must be in 1..={MAX_INSIGHT_TIMEOUT_MS}"),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(invalid("insight.temperature", "must be in 0.0..=2.0"));
        }
        if self.max_tokens == 0 {
            return Err(invalid("insight.max_tokens", "must be >= 1"));
        }
        if self.enabled && self.base_url.trim().is_empty() {
            return Err(invalid("insight.base_url", "must not be empty"));
        }
        Ok(())
    }
}

/// Rejects empty keys, short keys and template placeholders such as
/// `your_api_key_here`.
pub fn is_usable_credential(key: &str) -> bool {
    let key = key.trim();
    let placeholder = key.starts_with("your_") && key.ends_with("_here");
    key.len() > MIN_CREDENTIAL_LEN && !placeholder
}
