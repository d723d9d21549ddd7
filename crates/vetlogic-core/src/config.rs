//! Configuration loading from `vetlogic-config.yaml`.
//!
//! Deserializes the YAML configuration file into typed structs. Every
//! section has defaults so a partial file works. Secrets and deployment
//! values can be overridden from the environment (see
//! [`VetLogicConfig::apply_env_overrides`]).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use vetlogic_engine::GameRules;
use vetlogic_store::DEFAULT_SAVE_KEY;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `vetlogic-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VetLogicConfig {
    /// Game rules and balance constants.
    #[serde(default)]
    pub rules: GameRules,

    /// Where saves are kept.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Chat-completion backend for case generation and grading.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Remote question bank.
    #[serde(default)]
    pub question_bank: QuestionBankConfig,

    /// HTTP proxy listener.
    #[serde(default)]
    pub server: ServerConfig,

    /// Local player identity.
    #[serde(default)]
    pub player: PlayerConfig,
}

impl VetLogicConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise start from defaults. The
    /// environment is applied either way.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        tracing::info!(path = %path.display(), "config file not found, using defaults");
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Override values from environment variables.
    ///
    /// - `DEEPSEEK_API_KEY` -> `llm.api_key`
    /// - `SUPABASE_URL` -> `question_bank.url`
    /// - `SUPABASE_ANON_KEY` -> `question_bank.anon_key`
    /// - `PORT` -> `server.port`
    /// - `VETLOGIC_SAVE_DIR` -> `storage.save_dir`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DEEPSEEK_API_KEY") {
            self.llm.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("SUPABASE_URL") {
            self.question_bank.url = Some(val);
        }
        if let Ok(val) = std::env::var("SUPABASE_ANON_KEY") {
            self.question_bank.anon_key = Some(val);
        }
        if let Ok(val) = std::env::var("PORT") {
            match val.parse() {
                Ok(port) => self.server.port = port,
                Err(e) => tracing::warn!(value = %val, error = %e, "ignoring invalid PORT"),
            }
        }
        if let Ok(val) = std::env::var("VETLOGIC_SAVE_DIR") {
            self.storage.save_dir = PathBuf::from(val);
        }
    }
}

/// Save storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Directory holding save files.
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,
    /// Key of the save blob.
    #[serde(default = "default_save_key")]
    pub save_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            save_dir: default_save_dir(),
            save_key: default_save_key(),
        }
    }
}

fn default_save_dir() -> PathBuf {
    PathBuf::from("./saves")
}

fn default_save_key() -> String {
    DEFAULT_SAVE_KEY.to_owned()
}

/// Chat-completion backend settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LlmConfig {
    /// API base URL, without the `/chat/completions` suffix.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key. Normally supplied through `DEEPSEEK_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            model: default_model(),
            api_key: None,
            timeout_ms: default_timeout_ms(),
            temperature: default_temperature(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.deepseek.com".to_owned()
}

fn default_model() -> String {
    "deepseek-chat".to_owned()
}

const fn default_timeout_ms() -> u64 {
    15_000
}

const fn default_temperature() -> f64 {
    1.3
}

/// Remote question bank settings. Both fields must be set for the remote
/// bank to be used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QuestionBankConfig {
    /// Project URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Anonymous API key.
    #[serde(default)]
    pub anon_key: Option<String>,
}

impl QuestionBankConfig {
    /// URL and key, when both are configured and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let url = self.url.as_deref().filter(|s| !s.is_empty())?;
        let key = self.anon_key.as_deref().filter(|s| !s.is_empty())?;
        Some((url, key))
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    3000
}

/// Local player identity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlayerConfig {
    /// Identifier attached to recorded answers.
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
        }
    }
}

fn default_user_id() -> String {
    "local-player".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn empty_yaml_gives_defaults() {
        let config: VetLogicConfig = serde_yml::from_str("{}").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.llm.model, "deepseek-chat");
        assert_eq!(config.llm.timeout_ms, 15_000);
        assert_eq!(config.storage.save_key, "vet-tycoon-state");
        assert_eq!(config.rules, GameRules::default());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn nested_rules_override() {
        let yaml = "
rules:
  energy:
    case_cost: 10
  ranks:
    intern: 800
server:
  port: 8080
";
        let config: VetLogicConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.rules.energy.case_cost, 10);
        assert_eq!(config.rules.energy.exam_cost, 20);
        assert_eq!(config.rules.ranks.intern, 800);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn credentials_need_both_values() {
        let mut bank = QuestionBankConfig {
            url: Some("https://x.supabase.co".to_owned()),
            anon_key: None,
        };
        assert!(bank.credentials().is_none());
        bank.anon_key = Some(String::new());
        assert!(bank.credentials().is_none());
        bank.anon_key = Some("key".to_owned());
        assert_eq!(bank.credentials(), Some(("https://x.supabase.co", "key")));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn shipped_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../vetlogic-config.yaml");
        let contents = std::fs::read_to_string(path).unwrap();
        let config: VetLogicConfig = serde_yml::from_str(&contents).unwrap();
        assert_eq!(config.rules.qualification.pass_mark, 4);
        assert_eq!(config.rules, GameRules::default());
    }
}
