use super::Config;
use crate::error::ConfigError;
use directories::UserDirs;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".negprompt";
const CONFIG_FILE: &str = "config.toml";

impl Config {
    /// `~/.negprompt/config.toml`, when a home directory can be found.
    pub fn default_path() -> Option<PathBuf> {
        UserDirs::new().map(|u| u.home_dir().join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Parse the config file at `path` (a leading `~` is expanded).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let expanded = expand_path(path);
        let contents = fs::read_to_string(&expanded).map_err(|e| {
            ConfigError::Load(format!("failed to read {}: {e}", expanded.display()))
        })?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(format!("{}: {e}", expanded.display())))?;
        config.config_path = Some(expanded);
        Ok(config)
    }

    /// Load from `path` when given; otherwise from the default location if it
    /// exists, falling back to built-in defaults. Env overrides are applied
    /// and the result validated.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(default_path) => Self::load(&default_path)?,
                None => Self::default(),
            },
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let expanded = expand_path(path);
        if let Some(parent) = expanded.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("failed to serialize config: {e}")))?;
        fs::write(&expanded, toml_str)?;
        Ok(())
    }
}

fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).into_owned())
}
