use super::Config;
use tracing::warn;

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Some(provider) = non_empty_env("NEGPROMPT_PROVIDER") {
            self.provider.name = provider;
        }

        if let Some(model) = non_empty_env("NEGPROMPT_MODEL") {
            self.provider.model = model;
        }

        if let Some(base_url) = non_empty_env("NEGPROMPT_BASE_URL") {
            self.provider.base_url = Some(base_url);
        }

        if let Some(key) = non_empty_env("NEGPROMPT_API_KEY") {
            self.provider.api_key = Some(key);
        }

        if let Some(temp_str) = non_empty_env("NEGPROMPT_TEMPERATURE") {
            match temp_str.parse::<f64>() {
                Ok(temp) if (0.0..=2.0).contains(&temp) => self.provider.temperature = temp,
                _ => warn!(value = %temp_str, "ignoring NEGPROMPT_TEMPERATURE outside 0.0..=2.0"),
            }
        }

        if let Some(max_str) = non_empty_env("NEGPROMPT_MAX_WORDS") {
            match max_str.parse::<usize>() {
                Ok(max) => self.constraints.max_word_count = max,
                Err(_) => warn!(value = %max_str, "ignoring unparsable NEGPROMPT_MAX_WORDS"),
            }
        }
    }
}
