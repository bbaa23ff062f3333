use super::compatible::OpenAiCompatibleProvider;
use super::ollama::OllamaProvider;
use super::traits::Provider;
use crate::config::ProviderConfig;
use crate::error::ConfigError;
use tracing::debug;

/// Resolve the API key for a backend from config and environment variables.
///
/// Resolution order:
/// 1. Explicit `api_key` (trimmed, ignored if empty)
/// 2. Backend-specific environment variable (e.g. `OPENAI_API_KEY`)
/// 3. `NEGPROMPT_API_KEY`
pub fn resolve_api_key(name: &str, explicit_api_key: Option<&str>) -> Option<String> {
    if let Some(key) = explicit_api_key.map(str::trim).filter(|k| !k.is_empty()) {
        return Some(key.to_string());
    }

    let provider_env_candidates: &[&str] = match name {
        "openai" => &["OPENAI_API_KEY"],
        "openrouter" => &["OPENROUTER_API_KEY"],
        "groq" => &["GROQ_API_KEY"],
        "mistral" => &["MISTRAL_API_KEY"],
        _ => &[],
    };

    provider_env_candidates
        .iter()
        .chain(["NEGPROMPT_API_KEY"].iter())
        .find_map(|env_var| {
            std::env::var(env_var)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
}

/// Maps hosted OpenAI-compatible backends to their default base URL.
pub fn hosted_base_url(name: &str) -> Option<&'static str> {
    match name {
        "openai" => Some("https://api.openai.com/v1"),
        "openrouter" => Some("https://openrouter.ai/api/v1"),
        "groq" => Some("https://api.groq.com/openai/v1"),
        "mistral" => Some("https://api.mistral.ai/v1"),
        _ => None,
    }
}

/// Build the generation backend named by `config.name`.
///
/// Supported names:
/// - `"openai"`, `"openrouter"`, `"groq"`, `"mistral"`: hosted OpenAI-compatible APIs
/// - `"ollama"`: local Ollama server
/// - `"compatible"`: any OpenAI-compatible endpoint; requires `base_url`
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn Provider>, ConfigError> {
    let name = config.name.trim();
    let base_url = config
        .base_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty());
    debug!(provider = name, model = %config.model, "creating provider");

    if name == "ollama" {
        return Ok(Box::new(
            OllamaProvider::new(base_url, &config.model, config.temperature)
                .with_timeout(config.timeout_secs),
        ));
    }

    let base_url = match (name, hosted_base_url(name), base_url) {
        ("compatible", _, Some(url)) | (_, Some(_), Some(url)) => url,
        (_, Some(default_url), None) => default_url,
        ("compatible", None, None) => {
            return Err(ConfigError::Validation(
                "provider \"compatible\" requires provider.base_url".into(),
            ));
        }
        _ => {
            return Err(ConfigError::Validation(format!(
                "unknown provider: {name}. Supported: openai, openrouter, groq, mistral, ollama, compatible"
            )));
        }
    };

    let api_key = resolve_api_key(name, config.api_key.as_deref());
    Ok(Box::new(
        OpenAiCompatibleProvider::new(
            name,
            base_url,
            api_key.as_deref(),
            &config.model,
            config.temperature,
        )
        .with_timeout(config.timeout_secs),
    ))
}
