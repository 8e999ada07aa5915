//! Configuration management for Searchlens
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, SearchlensError};
use crate::views::Tab;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Searchlens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Terminal UI settings
    #[serde(default)]
    pub ui: UiConfig,
}

/// Backend connection configuration
///
/// The base URL is the only address the client talks to; both the chat
/// and image-analysis endpoints are resolved against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend (e.g. `http://localhost:5000`)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Optional request timeout in seconds; requests wait indefinitely when unset
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_user_agent() -> String {
    format!("searchlens/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            request_timeout_seconds: None,
        }
    }
}

/// Terminal UI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tab shown when the interactive session starts
    #[serde(default)]
    pub default_tab: Tab,

    /// Question pre-filled in the image view (and restored by clear)
    #[serde(default = "default_question")]
    pub default_question: String,

    /// Largest image accepted for upload (bytes)
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: u64,

    /// Colorize terminal output
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_question() -> String {
    crate::views::image::DEFAULT_QUESTION.to_string()
}

fn default_max_image_bytes() -> u64 {
    16 * 1024 * 1024 // 16 MiB
}

fn default_color() -> bool {
    true
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_tab: Tab::default(),
            default_question: default_question(),
            max_image_bytes: default_max_image_bytes(),
            color: default_color(),
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
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
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
            .map_err(|e| SearchlensError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| SearchlensError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("SEARCHLENS_BASE_URL") {
            self.backend.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("SEARCHLENS_REQUEST_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.backend.request_timeout_seconds = Some(value);
            } else {
                tracing::warn!("Invalid SEARCHLENS_REQUEST_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(tab) = std::env::var("SEARCHLENS_DEFAULT_TAB") {
            match Tab::parse_str(&tab) {
                Ok(tab) => self.ui.default_tab = tab,
                Err(e) => tracing::warn!("Invalid SEARCHLENS_DEFAULT_TAB: {}", e),
            }
        }

        if let Ok(question) = std::env::var("SEARCHLENS_DEFAULT_QUESTION") {
            self.ui.default_question = question;
        }

        if let Ok(max_bytes) = std::env::var("SEARCHLENS_MAX_IMAGE_BYTES") {
            if let Ok(value) = max_bytes.parse() {
                self.ui.max_image_bytes = value;
            } else {
                tracing::warn!("Invalid SEARCHLENS_MAX_IMAGE_BYTES: {}", max_bytes);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(base_url) = &cli.base_url {
            tracing::debug!("Using base URL override from CLI: {}", base_url);
            self.backend.base_url = base_url.clone();
        }

        if cli.no_color {
            self.ui.color = false;
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is not an absolute http(s) URL or a
    /// numeric limit is zero
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.backend.base_url).map_err(|e| {
            SearchlensError::Config(format!(
                "Invalid backend.base_url '{}': {}",
                self.backend.base_url, e
            ))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(SearchlensError::Config(format!(
                "backend.base_url must use http or https, got '{}'",
                url.scheme()
            ))
            .into());
        }

        if self.backend.request_timeout_seconds == Some(0) {
            return Err(SearchlensError::Config(
                "backend.request_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.ui.max_image_bytes == 0 {
            return Err(SearchlensError::Config(
                "ui.max_image_bytes must be greater than 0".to_string(),
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
    use serial_test::serial;
    use tempfile::TempDir;

    fn clear_env() {
        for key in [
            "SEARCHLENS_BASE_URL",
            "SEARCHLENS_REQUEST_TIMEOUT_SECONDS",
            "SEARCHLENS_DEFAULT_TAB",
            "SEARCHLENS_DEFAULT_QUESTION",
            "SEARCHLENS_MAX_IMAGE_BYTES",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.backend.base_url, "http://localhost:5000");
        assert_eq!(config.backend.request_timeout_seconds, None);
        assert_eq!(config.ui.default_tab, Tab::Chat);
        assert_eq!(config.ui.default_question, "Describe this image in detail");
        assert_eq!(config.ui.max_image_bytes, 16 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_yaml_fills_defaults() {
        let yaml = r#"
backend:
  base_url: http://10.0.0.5:8080
ui:
  default_tab: image
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.backend.base_url, "http://10.0.0.5:8080");
        assert!(config.backend.user_agent.starts_with("searchlens/"));
        assert_eq!(config.ui.default_tab, Tab::Image);
        assert!(config.ui.color);
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::default();
        config.backend.base_url = "localhost:5000/api".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_http_scheme() {
        let mut config = Config::default();
        config.backend.base_url = "ftp://example.com".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = Config::default();
        config.ui.max_image_bytes = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.backend.request_timeout_seconds = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_load_missing_file_uses_defaults() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.yaml");
        let config = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "backend:\n  base_url: http://backend:9000\n  request_timeout_seconds: 30\n",
        )
        .unwrap();

        let config = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap();
        assert_eq!(config.backend.base_url, "http://backend:9000");
        assert_eq!(config.backend.request_timeout_seconds, Some(30));
    }

    #[test]
    #[serial]
    fn test_load_invalid_yaml_fails() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "backend: [unclosed").unwrap();

        let result = Config::load(path.to_str().unwrap(), &Cli::default());
        assert!(result.unwrap_err().to_string().contains("Failed to parse config"));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("SEARCHLENS_BASE_URL", "http://env-host:7000");
        std::env::set_var("SEARCHLENS_DEFAULT_TAB", "image");
        std::env::set_var("SEARCHLENS_DEFAULT_QUESTION", "What breed is this dog?");
        std::env::set_var("SEARCHLENS_MAX_IMAGE_BYTES", "not-a-number");

        let mut config = Config::default();
        config.apply_env_vars();
        clear_env();

        assert_eq!(config.backend.base_url, "http://env-host:7000");
        assert_eq!(config.ui.default_tab, Tab::Image);
        assert_eq!(config.ui.default_question, "What breed is this dog?");
        assert_eq!(config.ui.max_image_bytes, 16 * 1024 * 1024);
    }

    #[test]
    #[serial]
    fn test_cli_overrides_env() {
        clear_env();
        std::env::set_var("SEARCHLENS_BASE_URL", "http://env-host:7000");

        let cli = Cli {
            base_url: Some("http://cli-host:6000".to_string()),
            no_color: true,
            ..Cli::default()
        };
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.yaml");
        let config = Config::load(path.to_str().unwrap(), &cli).unwrap();
        clear_env();

        assert_eq!(config.backend.base_url, "http://cli-host:6000");
        assert!(!config.ui.color);
    }
}
