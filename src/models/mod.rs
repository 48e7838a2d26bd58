pub mod circuit_breaker;
pub mod gemini;
pub mod provider;

pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use gemini::GeminiProvider;
pub use provider::{
    FunctionCall, GenerateRequest, GenerateResponse, Message, MessagePart, MessageRole,
    ModelProvider, TokenUsage, ToolDeclaration,
};
