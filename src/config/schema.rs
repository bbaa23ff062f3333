use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_MAX_WORD_COUNT: usize = 100;
pub const DEFAULT_STYLISTIC_QUALIFIER: &str = "concise";
pub const DEFAULT_MAX_REFINEMENT_ATTEMPTS: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path the config was loaded from - not serialized
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub constraints: ConstraintsConfig,

    #[serde(default)]
    pub refinement: RefinementConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            provider: ProviderConfig::default(),
            constraints: ConstraintsConfig::default(),
            refinement: RefinementConfig::default(),
        }
    }
}

// ── Generation backend ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Backend name: openai, openrouter, groq, mistral, ollama, compatible
    #[serde(default = "default_provider_name")]
    pub name: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Overrides the backend's default endpoint
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider_name() -> String {
    "openai".into()
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            model: default_model(),
            base_url: None,
            api_key: None,
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ── Constraint set ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintsConfig {
    /// Inclusive upper bound on whitespace-delimited words
    #[serde(default = "default_max_word_count")]
    pub max_word_count: usize,
    /// Words or phrases that must not appear (case-insensitive substring)
    #[serde(default)]
    pub forbidden_words: Vec<String>,
}

fn default_max_word_count() -> usize {
    DEFAULT_MAX_WORD_COUNT
}

impl Default for ConstraintsConfig {
    fn default() -> Self {
        Self {
            max_word_count: DEFAULT_MAX_WORD_COUNT,
            forbidden_words: Vec::new(),
        }
    }
}

// ── Refinement ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinementConfig {
    /// Appended to the style slot when a refinement runs; empty disables it
    #[serde(default = "default_stylistic_qualifier")]
    pub stylistic_qualifier: String,
    #[serde(default = "default_max_refinement_attempts")]
    pub max_refinement_attempts: u32,
}

fn default_stylistic_qualifier() -> String {
    DEFAULT_STYLISTIC_QUALIFIER.into()
}

fn default_max_refinement_attempts() -> u32 {
    DEFAULT_MAX_REFINEMENT_ATTEMPTS
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            stylistic_qualifier: default_stylistic_qualifier(),
            max_refinement_attempts: DEFAULT_MAX_REFINEMENT_ATTEMPTS,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.name.trim().is_empty() {
            return Err(ConfigError::Validation("provider.name must not be empty".into()));
        }
        if self.provider.model.trim().is_empty() {
            return Err(ConfigError::Validation("provider.model must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(ConfigError::Validation(format!(
                "provider.temperature must be within 0.0..=2.0, got {}",
                self.provider.temperature
            )));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "provider.timeout_secs must be greater than zero".into(),
            ));
        }
        if let Some(index) = self
            .constraints
            .forbidden_words
            .iter()
            .position(|w| w.trim().is_empty())
        {
            return Err(ConfigError::Validation(format!(
                "constraints.forbidden_words[{index}] is blank"
            )));
        }
        Ok(())
    }
}
