//! genzen-server configuration
//!
//! Priority order: command-line argument, then environment variable, then
//! TOML config file, then compiled default.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Script-generation upstream configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Chat-completions API base URL
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,
    /// API key; read from GENZEN_GENERATION_API_KEY when absent
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_generation_model")]
    pub model: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_base_url(),
            api_key: None,
            model: default_generation_model(),
        }
    }
}

/// Identity-provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Token-verification endpoint of the external identity provider
    #[serde(default = "default_verify_url")]
    pub verify_url: String,
    /// Provider tag recorded on first-seen signup
    #[serde(default = "default_provider")]
    pub provider: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            verify_url: default_verify_url(),
            provider: default_provider(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            db_path: default_db_path(),
            generation: GenerationConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration, layering an optional TOML file under environment
    /// and command-line overrides supplied by the caller
    pub fn load(config_file: Option<&Path>) -> Result<Config> {
        let mut config = match config_file {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("failed to read {}: {}", path.display(), e))
                })?;
                toml::from_str(&content)
                    .map_err(|e| Error::Config(format!("invalid config file: {}", e)))?
            }
            None => Config::default(),
        };

        if config.generation.api_key.is_none() {
            if let Ok(key) = std::env::var("GENZEN_GENERATION_API_KEY") {
                config.generation.api_key = Some(key);
            }
        }

        Ok(config)
    }
}

fn default_port() -> u16 {
    5750
}

fn default_db_path() -> PathBuf {
    PathBuf::from("genzen.db")
}

fn default_generation_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_generation_model() -> String {
    "gpt-5".to_string()
}

fn default_verify_url() -> String {
    "https://oauth2.googleapis.com/tokeninfo".to_string()
}

fn default_provider() -> String {
    "firebase".to_string()
}
