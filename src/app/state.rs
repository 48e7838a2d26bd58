use std::sync::Arc;
use parking_lot::RwLock;
use tracing::info;

use crate::app::config::AppConfig;
use crate::chat::ChatService;
use crate::error::Result;
use crate::models::{GeminiProvider, ModelProvider};
use crate::tools::Toolkit;

/// Shared application state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    config: Arc<RwLock<AppConfig>>,
    chat: Arc<ChatService>,
    toolkit: Arc<Toolkit>,
}

impl AppState {
    /// Build state around an explicit provider. Used directly by tests,
    /// which substitute a scripted provider for the real client.
    pub fn with_provider(config: AppConfig, provider: Box<dyn ModelProvider>) -> Result<Self> {
        let toolkit = Arc::new(Toolkit::new()?);
        let chat = Arc::new(ChatService::new(
            provider,
            Arc::clone(&toolkit),
            config.provider.clone(),
            config.chat.clone(),
        ));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            chat,
            toolkit,
        })
    }

    /// Build state with the Gemini provider, resolving the API key from the
    /// environment.
    pub fn new(config: AppConfig) -> Result<Self> {
        info!("Initializing application state");

        let api_key = config.resolve_api_key()?;
        let provider = GeminiProvider::new(api_key, config.provider.clone())?;

        Self::with_provider(config, Box::new(provider))
    }

    pub fn get_config(&self) -> AppConfig {
        self.config.read().clone()
    }

    pub fn chat(&self) -> &ChatService {
        &self.chat
    }

    pub fn toolkit(&self) -> &Toolkit {
        &self.toolkit
    }
}
