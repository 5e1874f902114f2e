//! Configuration management

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::core::errors::{Result, TranslationError};
use crate::core::models::SafetyPolicy;
use crate::core::prompt::PromptTemplate;

/// Default Gemini REST base URL
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default generation model
pub const DEFAULT_MODEL: &str = "gemini-pro";

/// Successful rows between two milestone notifications
pub const DEFAULT_PROGRESS_INTERVAL: usize = 100;

/// Per-request timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Configuration for translator
///
/// Unset fields fall back to `Default`, which reads the environment, so
/// every loader stacks defaults, then environment, then its own source.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub api_key: String,
    pub api_endpoint: String,
    pub model: String,
    pub timeout_ms: u64,
    pub progress_interval: usize,
    /// Custom template; the built-in one-shot template is used when unset
    pub prompt_template: Option<String>,
    pub safety_policy: SafetyPolicy,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_key: api_key_from_env().unwrap_or_default(),
            api_endpoint: std::env::var("GEMINI_API_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            timeout_ms: lenient(env_timeout_ms(), DEFAULT_TIMEOUT_MS),
            progress_interval: lenient(env_progress_interval(), DEFAULT_PROGRESS_INTERVAL),
            prompt_template: None,
            safety_policy: SafetyPolicy::block_none(),
        }
    }
}

impl fmt::Debug for TranslatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("TranslatorConfig")
            .field("api_key", &api_key)
            .field("api_endpoint", &self.api_endpoint)
            .field("model", &self.model)
            .field("timeout_ms", &self.timeout_ms)
            .field("progress_interval", &self.progress_interval)
            .field("prompt_template", &self.prompt_template)
            .field("safety_policy", &self.safety_policy)
            .finish()
    }
}

fn api_key_from_env() -> Option<String> {
    std::env::var("GEMINI_API_KEY")
        .or_else(|_| std::env::var("GOOGLE_API_KEY"))
        .ok()
        .filter(|key| !key.is_empty())
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| TranslationError::ConfigError {
            message: format!("{} has an invalid value: {}", key, raw),
        }),
        Err(_) => Ok(default),
    }
}

fn env_timeout_ms() -> Result<u64> {
    env_or("REQUEST_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)
}

fn env_progress_interval() -> Result<usize> {
    env_or("PROGRESS_INTERVAL", DEFAULT_PROGRESS_INTERVAL)
}

fn lenient<T>(value: Result<T>, default: T) -> T {
    value.unwrap_or_else(|e| {
        warn!("{}, using default", e);
        default
    })
}

impl TranslatorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = api_key_from_env().ok_or_else(|| TranslationError::ConfigError {
            message: "GEMINI_API_KEY environment variable is required".to_string(),
        })?;

        Ok(Self {
            api_key,
            timeout_ms: env_timeout_ms()?,
            progress_interval: env_progress_interval()?,
            ..Self::default()
        })
    }

    /// Load from the environment, or from a config file when one is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::from_env()?,
        };

        info!(
            "Using model {} with {} safety settings",
            config.model,
            config.safety_policy.settings().len()
        );

        Ok(config)
    }

    /// Load from a JSON or TOML file, with `TRANSLATOR_*` environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(TranslationError::FileError {
                path: path.display().to_string(),
                message: "Config file not found".to_string(),
            });
        }

        // Malformed environment values are errors here, not silent defaults
        env_timeout_ms()?;
        env_progress_interval()?;

        debug!("Loading config from {}", path.display());

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("TRANSLATOR").try_parsing(true))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Parsed prompt template
    pub fn prompt_template(&self) -> Result<PromptTemplate> {
        match &self.prompt_template {
            Some(raw) => PromptTemplate::parse(raw),
            None => Ok(PromptTemplate::default()),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| TranslationError::ConfigError {
            message: message.to_string(),
        };

        if self.api_key.is_empty() {
            return Err(invalid("API key is required"));
        }

        if self.api_endpoint.is_empty() {
            return Err(invalid("API endpoint is required"));
        }

        if self.model.is_empty() {
            return Err(invalid("model is required"));
        }

        if self.timeout_ms == 0 {
            return Err(invalid("timeout_ms must be greater than 0"));
        }

        if self.progress_interval == 0 {
            return Err(invalid("progress_interval must be greater than 0"));
        }

        self.prompt_template()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{BlockThreshold, HarmCategory};
    use std::io::Write;

    fn valid_config() -> TranslatorConfig {
        TranslatorConfig {
            api_key: "test_key".to_string(),
            api_endpoint: "https://test.com".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_missing_key() {
        let config = TranslatorConfig {
            api_key: "".to_string(),
            ..valid_config()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_interval() {
        let config = TranslatorConfig {
            progress_interval: 0,
            ..valid_config()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_template() {
        let config = TranslatorConfig {
            prompt_template: Some("no placeholder here".to_string()),
            ..valid_config()
        };

        assert!(matches!(
            config.validate(),
            Err(TranslationError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_from_file_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{
                "api_key": "file_key",
                "model": "gemini-1.5-flash",
                "progress_interval": 25,
                "prompt_template": "Thai: {{text}}\nEnglish:",
                "safety_policy": [
                    {{"category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_ONLY_HIGH"}}
                ]
            }}"#
        )
        .unwrap();

        let config = TranslatorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.api_key, "file_key");
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.progress_interval, 25);
        assert_eq!(
            config.safety_policy.threshold_for(HarmCategory::Harassment),
            Some(BlockThreshold::BlockOnlyHigh)
        );
        assert_eq!(
            config.prompt_template().unwrap().render("x"),
            "Thai: x\nEnglish:"
        );
    }

    #[test]
    fn test_from_file_layers_over_environment() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "api_key": "file_key" }}"#).unwrap();

        std::env::set_var("PROGRESS_INTERVAL", "7");
        std::env::set_var("REQUEST_TIMEOUT_MS", "1234");
        let from_file = TranslatorConfig::from_file(file.path());
        let default = TranslatorConfig::default();
        std::env::remove_var("PROGRESS_INTERVAL");
        std::env::remove_var("REQUEST_TIMEOUT_MS");

        let from_file = from_file.unwrap();
        assert_eq!(from_file.api_key, "file_key");
        assert_eq!(from_file.progress_interval, 7);
        assert_eq!(from_file.timeout_ms, 1234);
        assert_eq!(default.progress_interval, 7);
        assert_eq!(default.timeout_ms, 1234);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = TranslatorConfig {
            api_key: "secret-key-123".to_string(),
            ..valid_config()
        };
        let printed = format!("{:?}", config);
        assert!(!printed.contains("secret-key-123"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_from_file_missing() {
        let result = TranslatorConfig::from_file("/definitely/not/here.json");
        assert!(matches!(result, Err(TranslationError::FileError { .. })));
    }

    #[test]
    fn test_to_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = TranslatorConfig {
            model: "gemini-1.5-pro".to_string(),
            ..valid_config()
        };
        config.to_file(&path).unwrap();

        let loaded = TranslatorConfig::from_file(&path).unwrap();
        assert_eq!(loaded.model, "gemini-1.5-pro");
        assert_eq!(loaded.safety_policy, SafetyPolicy::block_none());
    }
}
