//! Configuration Management Module
//!
//! Layered configuration for MarketLens: built-in defaults, then an optional
//! TOML file, then environment variable overrides.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable holding the provider API key
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable selecting the chat model
pub const ENV_MODEL: &str = "MARKETLENS_MODEL";
/// Environment variable overriding the provider base URL
pub const ENV_BASE_URL: &str = "MARKETLENS_BASE_URL";
/// Environment variable overriding the data folder
pub const ENV_DATA_DIR: &str = "MARKETLENS_DATA_DIR";
/// Environment variable overriding the log level
pub const ENV_LOG_LEVEL: &str = "MARKETLENS_LOG";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// What to answer when the model replies without calling `query_data`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Answer with the fixed refusal text
    #[default]
    Refuse,
    /// Pass the model's own text through
    Direct,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub llm: LlmConfig,
    pub assistant: AssistantConfig,
    pub logging: LoggingConfig,
}

/// Dataset location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Folder holding the raw and merged CSV files
    pub dir: PathBuf,
    /// Merged dataset file name inside `dir`
    pub file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            file: "merged_data_open_close.csv".to_string(),
        }
    }
}

impl DataConfig {
    /// Full path of the merged dataset
    pub fn dataset_path(&self) -> PathBuf {
        self.dir.join(&self.file)
    }
}

/// Chat-completion provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
    pub retry: RetryConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key: None,
            temperature: 0.5,
            max_tokens: 500,
            timeout_seconds: 30,
            retry: RetryConfig::default(),
        }
    }
}

/// Backoff settings for rate-limited provider calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub multiplier: f64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            multiplier: 2.0,
            max_delay_ms: 30_000,
        }
    }
}

/// Assistant behaviour
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub fallback: FallbackPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Resolve configuration: defaults, then file, then environment
    ///
    /// An explicit path must exist. Without one, the per-user file
    /// (`<config_dir>/marketlens/config.toml`) is used when present.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|path| path.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Per-user configuration file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("marketlens").join("config.toml"))
    }

    /// Read and parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Parse TOML; missing sections and keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(api_key) = value(ENV_API_KEY) {
            self.llm.api_key = Some(api_key);
            debug!("Applied env override for API key");
        }

        if let Some(model) = value(ENV_MODEL) {
            self.llm.model = model;
            debug!("Applied env override for model");
        }

        if let Some(base_url) = value(ENV_BASE_URL) {
            self.llm.base_url = base_url;
            debug!("Applied env override for base URL");
        }

        if let Some(dir) = value(ENV_DATA_DIR) {
            self.data.dir = PathBuf::from(dir);
            debug!("Applied env override for data folder");
        }

        if let Some(level) = value(ENV_LOG_LEVEL) {
            self.logging.level = level;
            debug!("Applied env override for log level");
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model name is empty".to_string()));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature {} outside 0.0..=2.0",
                self.llm.temperature
            )));
        }

        if self.llm.max_tokens == 0 {
            return Err(ConfigError::Invalid("max_tokens must be positive".to_string()));
        }

        if self.llm.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }

        if self.llm.retry.multiplier < 1.0 {
            return Err(ConfigError::Invalid(
                "retry.multiplier must be at least 1.0".to_string(),
            ));
        }

        if self.data.file.trim().is_empty() {
            return Err(ConfigError::Invalid("data.file is empty".to_string()));
        }

        if self.llm.api_key.as_deref().map_or(true, str::is_empty) {
            warn!("No API key configured; set {} to talk to the model", ENV_API_KEY);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.llm.temperature, 0.5);
        assert_eq!(config.llm.max_tokens, 500);
        assert_eq!(config.llm.retry.max_attempts, 3);
        assert_eq!(config.assistant.fallback, FallbackPolicy::Refuse);
        assert_eq!(
            config.data.dataset_path(),
            PathBuf::from("data/merged_data_open_close.csv")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
[llm]
model = "gpt-4"

[assistant]
fallback = "direct"
"#,
        )
        .unwrap();
        assert_eq!(config.llm.model, "gpt-4");
        assert_eq!(config.llm.temperature, 0.5);
        assert_eq!(config.assistant.fallback, FallbackPolicy::Direct);
        assert_eq!(config.data, DataConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = AppConfig::from_toml_str("[llm\nmodel=").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_API_KEY, "sk-test"),
            (ENV_MODEL, "gpt-4o-mini"),
            (ENV_DATA_DIR, "/srv/market"),
            (ENV_BASE_URL, "  "),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.data.dir, PathBuf::from("/srv/market"));
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.llm.temperature = 3.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = AppConfig::default();
        config.llm.retry.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.llm.model = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[data]\nfile = \"prices.csv\"\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.data.file, "prices.csv");

        let missing = AppConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
