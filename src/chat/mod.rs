pub mod service;
pub mod types;

pub use service::ChatService;
pub use types::{ChatMessage, ChatOutcome, ChatSession, ResponseUsage, StoredRole};
