pub mod config;
pub mod state;

pub use config::{AppConfig, ChatConfig, ProviderConfig, ServerConfig};
pub use state::AppState;
