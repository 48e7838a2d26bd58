use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::error::{Error, Result};

/// Environment variables consulted for the provider API key, in order.
const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub model: String,
    pub api_endpoint: Option<String>,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub max_sessions: usize,
    pub session_timeout_seconds: u64,
    pub max_messages_per_session: usize,
    pub max_message_length: usize,
    pub max_tool_rounds: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            api_endpoint: None, // Uses default Gemini endpoint
            timeout_seconds: 60,
            max_retries: 3,
            temperature: None,
            max_output_tokens: None,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_sessions: 1000,
            session_timeout_seconds: 24 * 60 * 60,
            max_messages_per_session: 200,
            max_message_length: 8192,
            max_tool_rounds: 4,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            provider: ProviderConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

impl AppConfig {
    pub async fn load(config_file: &Path) -> Result<Self> {
        if !config_file.exists() {
            info!("Config file not found, using default configuration");
            return Ok(Self::default());
        }

        info!("Loading configuration from: {:?}", config_file);

        let config_content = fs::read_to_string(config_file).await?;
        let config: AppConfig = toml::from_str(&config_content)
            .map_err(|e| Error::Config(config::ConfigError::Message(e.to_string())))?;

        config.validate()?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.provider.model.is_empty() {
            return Err(Error::validation("Provider model must not be empty"));
        }
        if self.provider.timeout_seconds == 0 {
            return Err(Error::validation("Provider timeout must be positive"));
        }
        if let Some(temp) = self.provider.temperature {
            if !(0.0..=2.0).contains(&temp) {
                return Err(Error::validation("Temperature must be between 0.0 and 2.0"));
            }
        }
        if self.chat.max_sessions == 0 {
            return Err(Error::validation("Session limit must be positive"));
        }
        if self.chat.max_messages_per_session == 0 {
            return Err(Error::validation("Message limit must be positive"));
        }
        if self.chat.max_message_length == 0 {
            return Err(Error::validation("Message length limit must be positive"));
        }
        if self.chat.max_tool_rounds == 0 {
            return Err(Error::validation("Tool round limit must be positive"));
        }
        Ok(())
    }

    /// Resolve the provider API key from the environment. The key is never
    /// read from the config file so it cannot end up in version control.
    pub fn resolve_api_key(&self) -> Result<String> {
        for var in API_KEY_VARS {
            if let Ok(key) = std::env::var(var) {
                if !key.trim().is_empty() {
                    return Ok(key);
                }
            }
        }
        Err(Error::validation(format!(
            "No API key found; set one of {}",
            API_KEY_VARS.join(", ")
        )))
    }
}
