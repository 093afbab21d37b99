//! Configuration management for the household assistant client
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{AssistantError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Chat widget behavior
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the household assistant backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional request timeout in seconds. Requests wait indefinitely when unset.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_user_agent() -> String {
    format!("household-assistant/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: None,
            user_agent: default_user_agent(),
        }
    }
}

/// What the chat does with a pending confirmation when the confirm call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationFailurePolicy {
    /// Clear the pending confirmation so the chat returns to normal input
    #[default]
    Release,
    /// Keep the pending confirmation and ask for yes/no again
    Retain,
}

impl ConfirmationFailurePolicy {
    /// Parse a policy name ("release" or "retain")
    pub fn parse_str(s: &str) -> std::result::Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "release" => Ok(Self::Release),
            "retain" => Ok(Self::Retain),
            other => Err(format!("Unknown confirmation failure policy: {}", other)),
        }
    }
}

/// Chat widget configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Behavior when the confirm endpoint cannot be reached
    #[serde(default)]
    pub confirmation_failure: ConfirmationFailurePolicy,

    /// Prefix bot messages with their stage tag
    #[serde(default = "default_show_stage_tags")]
    pub show_stage_tags: bool,
}

fn default_show_stage_tags() -> bool {
    true
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            confirmation_failure: ConfirmationFailurePolicy::default(),
            show_stage_tags: default_show_stage_tags(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AssistantError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| AssistantError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("HOUSEHOLD_API_URL") {
            self.gateway.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("HOUSEHOLD_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.gateway.timeout_seconds = Some(value);
            } else {
                tracing::warn!("Invalid HOUSEHOLD_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(policy) = std::env::var("HOUSEHOLD_CONFIRMATION_FAILURE") {
            match ConfirmationFailurePolicy::parse_str(&policy) {
                Ok(value) => self.chat.confirmation_failure = value,
                Err(e) => tracing::warn!("Invalid HOUSEHOLD_CONFIRMATION_FAILURE: {}", e),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(url) = &cli.api_url {
            tracing::debug!("CLI override: api_url={}", url);
            self.gateway.base_url = url.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is not an http(s) URL or the timeout is zero
    pub fn validate(&self) -> Result<()> {
        if self.gateway.base_url.trim().is_empty() {
            return Err(AssistantError::Config("gateway.base_url cannot be empty".to_string()).into());
        }

        let parsed = url::Url::parse(&self.gateway.base_url).map_err(|e| {
            AssistantError::Config(format!(
                "Invalid gateway.base_url {}: {}",
                self.gateway.base_url, e
            ))
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AssistantError::Config(format!(
                "gateway.base_url must use http or https, got {}",
                parsed.scheme()
            ))
            .into());
        }

        if self.gateway.timeout_seconds == Some(0) {
            return Err(AssistantError::Config(
                "gateway.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var("HOUSEHOLD_API_URL");
        std::env::remove_var("HOUSEHOLD_TIMEOUT_SECONDS");
        std::env::remove_var("HOUSEHOLD_CONFIRMATION_FAILURE");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.gateway.base_url, "http://localhost:8000");
        assert_eq!(config.gateway.timeout_seconds, None);
        assert_eq!(
            config.chat.confirmation_failure,
            ConfirmationFailurePolicy::Release
        );
        assert!(config.chat.show_stage_tags);
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_url() {
        let mut config = Config::default();
        config.gateway.base_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_scheme() {
        let mut config = Config::default();
        config.gateway.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_unparseable_url() {
        let mut config = Config::default();
        config.gateway.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.gateway.timeout_seconds = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
gateway:
  base_url: https://home.example.com
  timeout_seconds: 30
chat:
  confirmation_failure: retain
  show_stage_tags: false
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.gateway.base_url, "https://home.example.com");
        assert_eq!(config.gateway.timeout_seconds, Some(30));
        assert_eq!(
            config.chat.confirmation_failure,
            ConfirmationFailurePolicy::Retain
        );
        assert!(!config.chat.show_stage_tags);
        assert!(config.gateway.user_agent.starts_with("household-assistant/"));
    }

    #[test]
    fn test_config_from_empty_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.gateway.base_url, "http://localhost:8000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            ConfirmationFailurePolicy::parse_str("Release").unwrap(),
            ConfirmationFailurePolicy::Release
        );
        assert_eq!(
            ConfirmationFailurePolicy::parse_str(" retain ").unwrap(),
            ConfirmationFailurePolicy::Retain
        );
        assert!(ConfirmationFailurePolicy::parse_str("sometimes").is_err());
    }

    #[test]
    #[serial]
    fn test_load_missing_file_uses_defaults() {
        clear_env();
        let cli = Cli::try_parse_from(["household", "health"]).unwrap();
        let config = Config::load("/nonexistent/household.yaml", &cli).unwrap();
        assert_eq!(config.gateway.base_url, "http://localhost:8000");
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "gateway:\n  base_url: http://10.0.0.5:9000\n").unwrap();

        let cli = Cli::try_parse_from(["household", "health"]).unwrap();
        let config = Config::load(path.to_str().unwrap(), &cli).unwrap();
        assert_eq!(config.gateway.base_url, "http://10.0.0.5:9000");
    }

    #[test]
    #[serial]
    fn test_load_rejects_malformed_file() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "gateway: [unterminated").unwrap();

        let cli = Cli::try_parse_from(["household", "health"]).unwrap();
        assert!(Config::load(path.to_str().unwrap(), &cli).is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("HOUSEHOLD_API_URL", "http://env.example:8080");
        std::env::set_var("HOUSEHOLD_TIMEOUT_SECONDS", "15");
        std::env::set_var("HOUSEHOLD_CONFIRMATION_FAILURE", "retain");

        let cli = Cli::try_parse_from(["household", "health"]).unwrap();
        let config = Config::load("/nonexistent/household.yaml", &cli).unwrap();
        clear_env();

        assert_eq!(config.gateway.base_url, "http://env.example:8080");
        assert_eq!(config.gateway.timeout_seconds, Some(15));
        assert_eq!(
            config.chat.confirmation_failure,
            ConfirmationFailurePolicy::Retain
        );
    }

    #[test]
    #[serial]
    fn test_invalid_env_timeout_is_ignored() {
        clear_env();
        std::env::set_var("HOUSEHOLD_TIMEOUT_SECONDS", "soon");

        let cli = Cli::try_parse_from(["household", "health"]).unwrap();
        let config = Config::load("/nonexistent/household.yaml", &cli).unwrap();
        clear_env();

        assert_eq!(config.gateway.timeout_seconds, None);
    }

    #[test]
    #[serial]
    fn test_cli_override_beats_env() {
        clear_env();
        std::env::set_var("HOUSEHOLD_API_URL", "http://env.example:8080");

        let cli =
            Cli::try_parse_from(["household", "--api-url", "http://cli.example:1", "health"])
                .unwrap();
        let config = Config::load("/nonexistent/household.yaml", &cli).unwrap();
        clear_env();

        assert_eq!(config.gateway.base_url, "http://cli.example:1");
    }
}
