use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::app::config::{ChatConfig, ProviderConfig};
use crate::chat::types::{ChatMessage, ChatOutcome, ChatSession, ResponseUsage, StoredRole};
use crate::error::{Error, Result};
use crate::models::{GenerateRequest, Message, ModelProvider};
use crate::tools::Toolkit;

/// Fixed persona sent with every provider request.
const SYSTEM_INSTRUCTION: &str = r#"You are BlockchainBuddy, an expert blockchain and cryptocurrency assistant. You help users with:

1. **Blockchain Information**: Explain different blockchain networks, their features, consensus mechanisms, and use cases.

2. **Wallet Address Validation**: Verify if wallet addresses are in the correct format for different chains.

3. **Gas Fee Explanations**: Help users understand gas fees, how they work, and tips to save on transaction costs.

4. **Smart Contract Development**: Provide templates and guidance for creating smart contracts (ERC-20, ERC-721, etc.).

5. **Unit Conversions**: Convert between crypto units (ETH/Gwei/Wei, BTC/Satoshi, SOL/Lamports).

6. **General Crypto Knowledge**: Answer questions about DeFi, NFTs, DAOs, Layer 2 solutions, and more.

**Guidelines**:
- Always be accurate and up-to-date with blockchain information
- Warn users about security best practices (never share private keys, verify contracts, etc.)
- Use the available tools to provide concrete data when possible
- Explain complex concepts in simple terms
- If you're unsure about something, say so rather than guessing"#;

/// Returned when the model produces no usable text.
const FALLBACK_RESPONSE: &str =
    "I apologize, but I couldn't generate a response. Please try again.";

/// Coordinates chat sessions and the relay loop against the model provider.
pub struct ChatService {
    provider: Box<dyn ModelProvider>,
    toolkit: Arc<Toolkit>,
    provider_config: ProviderConfig,
    config: ChatConfig,
    sessions: RwLock<HashMap<String, ChatSession>>,
    messages: RwLock<HashMap<String, Vec<ChatMessage>>>,
}

impl ChatService {
    pub fn new(
        provider: Box<dyn ModelProvider>,
        toolkit: Arc<Toolkit>,
        provider_config: ProviderConfig,
        config: ChatConfig,
    ) -> Self {
        info!(
            "Initializing chat service with provider '{}'",
            provider.provider_name()
        );

        Self {
            provider,
            toolkit,
            provider_config,
            config,
            sessions: RwLock::new(HashMap::new()),
            messages: RwLock::new(HashMap::new()),
        }
    }

    /// Relay one user message, creating or resuming a session. A supplied id
    /// that is unknown (evicted, or from a previous process) starts a fresh
    /// session under that id.
    pub async fn send_message(
        &self,
        session_id: Option<String>,
        message: &str,
    ) -> Result<ChatOutcome> {
        let start_time = Instant::now();

        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("Message must not be empty"));
        }
        if trimmed.len() > self.config.max_message_length {
            return Err(Error::validation(format!(
                "Message exceeds maximum length of {} characters",
                self.config.max_message_length
            )));
        }

        let session_id = self.ensure_session(session_id).await;

        // Append the user turn and snapshot the conversation for the provider
        let conversation = {
            let mut messages = self.messages.write().await;
            let history = messages.entry(session_id.clone()).or_default();

            if history.len() >= self.config.max_messages_per_session {
                return Err(Error::chat(format!(
                    "Session {} reached the message limit",
                    session_id
                )));
            }

            history.push(ChatMessage::user(trimmed));
            history
                .iter()
                .map(|stored| match stored.role {
                    StoredRole::User => Message::user(stored.content.clone()),
                    StoredRole::Assistant => Message::assistant(stored.content.clone()),
                })
                .collect::<Vec<_>>()
        };

        let (response_text, usage, tool_rounds) = self.run_model_loop(conversation).await?;

        // Record the assistant turn and bump session counters
        {
            let mut messages = self.messages.write().await;
            if let Some(history) = messages.get_mut(&session_id) {
                history.push(ChatMessage::assistant(response_text.clone()));
            }
        }
        {
            let mut sessions = self.sessions.write().await;
            if let Some(session) = sessions.get_mut(&session_id) {
                session.increment_message_count();
            }
        }

        let processing_time_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Generated response for session {} in {}ms ({} tool rounds)",
            session_id, processing_time_ms, tool_rounds
        );

        Ok(ChatOutcome {
            session_id,
            response: response_text,
            usage,
            tool_rounds,
            processing_time_ms,
        })
    }

    /// Call the provider until it stops asking for tools, executing each
    /// requested function against the local toolkit.
    async fn run_model_loop(
        &self,
        mut conversation: Vec<Message>,
    ) -> Result<(String, ResponseUsage, usize)> {
        let declarations = self.toolkit.declarations();
        let mut usage = ResponseUsage::default();
        let mut tool_rounds = 0;

        loop {
            let mut request =
                GenerateRequest::new(self.provider_config.model.clone(), conversation.clone())
                    .with_system_instruction(SYSTEM_INSTRUCTION)
                    .with_tools(declarations.clone());
            if let Some(temperature) = self.provider_config.temperature {
                request = request.with_temperature(temperature);
            }
            if let Some(max_output_tokens) = self.provider_config.max_output_tokens {
                request = request.with_max_output_tokens(max_output_tokens);
            }

            let response = self.provider.generate(request).await?;
            if let Some(turn_usage) = &response.usage {
                usage.add(turn_usage.input_tokens, turn_usage.output_tokens);
            }

            if response.has_function_calls() && tool_rounds < self.config.max_tool_rounds {
                tool_rounds += 1;
                debug!(
                    "Model requested {} function call(s), round {}/{}",
                    response.function_calls.len(),
                    tool_rounds,
                    self.config.max_tool_rounds
                );

                for call in response.function_calls {
                    let result = self.toolkit.execute(&call.name, &call.args);
                    conversation.push(Message::function_call(call.clone()));
                    conversation.push(Message::function_response(call.name, result));
                }
                continue;
            }

            if response.has_function_calls() {
                warn!(
                    "Tool round limit ({}) reached, returning best-effort text",
                    self.config.max_tool_rounds
                );
            }

            let text = response.text.trim().to_string();
            let final_text = if text.is_empty() {
                FALLBACK_RESPONSE.to_string()
            } else {
                text
            };

            return Ok((final_text, usage, tool_rounds));
        }
    }

    /// Resolve the session to use, creating one when needed and evicting
    /// when the registry is full. Evicted sessions lose their history too,
    /// so a later session under a recycled id starts clean.
    async fn ensure_session(&self, session_id: Option<String>) -> String {
        let mut evicted = Vec::new();

        let id = {
            let mut sessions = self.sessions.write().await;

            match session_id {
                Some(id) if sessions.contains_key(&id) => {
                    if let Some(session) = sessions.get_mut(&id) {
                        session.touch();
                    }
                    id
                }
                supplied => {
                    if sessions.len() >= self.config.max_sessions {
                        evicted = Self::evict(&mut sessions, self.session_timeout());
                    }

                    let session = match supplied {
                        Some(id) => {
                            info!("Creating chat session with client-supplied id: {}", id);
                            ChatSession::with_id(id)
                        }
                        None => {
                            let session = ChatSession::new();
                            info!("Created new chat session: {}", session.id);
                            session
                        }
                    };
                    let id = session.id.clone();
                    sessions.insert(id.clone(), session);
                    id
                }
            }
        };

        if !evicted.is_empty() {
            let mut messages = self.messages.write().await;
            for old_id in &evicted {
                messages.remove(old_id);
            }
        }

        id
    }

    fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.config.session_timeout_seconds)
    }

    /// Drop every session idle past the timeout; if none qualify, drop the
    /// oldest-updated one so a new session can always be admitted. Returns
    /// the evicted ids so callers can clear the matching histories.
    fn evict(sessions: &mut HashMap<String, ChatSession>, timeout: Duration) -> Vec<String> {
        let now = chrono::Utc::now();
        let mut stale: Vec<String> = sessions
            .iter()
            .filter(|(_, session)| {
                (now - session.updated_at).to_std().unwrap_or_default() > timeout
            })
            .map(|(id, _)| id.clone())
            .collect();

        if stale.is_empty() {
            if let Some(oldest) = sessions
                .values()
                .min_by_key(|session| session.updated_at)
                .map(|session| session.id.clone())
            {
                stale.push(oldest);
            }
        }

        warn!("Session limit reached, evicting {} session(s)", stale.len());
        for id in &stale {
            sessions.remove(id);
        }
        stale
    }

    pub async fn get_session(&self, session_id: &str) -> Result<ChatSession> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| Error::SessionNotFound(session_id.to_string()))
    }

    pub async fn list_sessions(&self) -> Vec<ChatSession> {
        let sessions = self.sessions.read().await;
        let mut list: Vec<ChatSession> = sessions.values().cloned().collect();
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        list
    }

    /// Remove a session and its history. Deleting an unknown session is not
    /// an error.
    pub async fn delete_session(&self, session_id: &str) -> bool {
        let existed = {
            let mut sessions = self.sessions.write().await;
            sessions.remove(session_id).is_some()
        };
        {
            let mut messages = self.messages.write().await;
            messages.remove(session_id);
        }

        if existed {
            info!("Deleted session: {}", session_id);
        }
        existed
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FunctionCall, GenerateResponse, TokenUsage};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Provider that replays scripted responses and records requests.
    struct ScriptedProvider {
        responses: Mutex<VecDeque<GenerateResponse>>,
        requests: Arc<Mutex<Vec<GenerateRequest>>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<GenerateResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn request_log(&self) -> Arc<Mutex<Vec<GenerateRequest>>> {
            Arc::clone(&self.requests)
        }

        fn text_response(text: &str) -> GenerateResponse {
            GenerateResponse {
                text: text.to_string(),
                function_calls: Vec::new(),
                finish_reason: Some("STOP".to_string()),
                usage: Some(TokenUsage::new(10, 5)),
            }
        }

        fn tool_response(name: &str, args: serde_json::Value) -> GenerateResponse {
            GenerateResponse {
                text: String::new(),
                function_calls: vec![FunctionCall {
                    name: name.to_string(),
                    args,
                }],
                finish_reason: Some("STOP".to_string()),
                usage: Some(TokenUsage::new(10, 5)),
            }
        }
    }

    #[async_trait::async_trait]
    impl ModelProvider for ScriptedProvider {
        async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| Error::model_provider("Script exhausted"))
        }

        fn provider_name(&self) -> &str {
            "scripted"
        }
    }

    fn service_with(responses: Vec<GenerateResponse>, config: ChatConfig) -> ChatService {
        ChatService::new(
            Box::new(ScriptedProvider::new(responses)),
            Arc::new(Toolkit::new().unwrap()),
            ProviderConfig::default(),
            config,
        )
    }

    #[tokio::test]
    async fn test_send_message_creates_session() {
        let service = service_with(
            vec![ScriptedProvider::text_response("Hello from the model")],
            ChatConfig::default(),
        );

        let outcome = service.send_message(None, "Hi there").await.unwrap();
        assert_eq!(outcome.response, "Hello from the model");
        assert!(!outcome.session_id.is_empty());
        assert_eq!(outcome.tool_rounds, 0);
        assert_eq!(outcome.usage.total_tokens, 15);
        assert_eq!(service.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_session_history_grows_across_turns() {
        let service = service_with(
            vec![
                ScriptedProvider::text_response("First answer"),
                ScriptedProvider::text_response("Second answer"),
            ],
            ChatConfig::default(),
        );

        let first = service.send_message(None, "Question one").await.unwrap();
        let second = service
            .send_message(Some(first.session_id.clone()), "Question two")
            .await
            .unwrap();

        assert_eq!(first.session_id, second.session_id);
        let session = service.get_session(&first.session_id).await.unwrap();
        assert_eq!(session.message_count, 2);

        let history = service.messages.read().await;
        // user, assistant, user, assistant
        assert_eq!(history[&first.session_id].len(), 4);
    }

    #[tokio::test]
    async fn test_function_call_round_trip() {
        let service = service_with(
            vec![
                ScriptedProvider::tool_response(
                    "get_blockchain_info",
                    json!({"chain_name": "ethereum"}),
                ),
                ScriptedProvider::text_response("Ethereum launched in 2015."),
            ],
            ChatConfig::default(),
        );

        let outcome = service
            .send_message(None, "When did Ethereum launch?")
            .await
            .unwrap();

        assert_eq!(outcome.response, "Ethereum launched in 2015.");
        assert_eq!(outcome.tool_rounds, 1);
        // Both provider rounds contribute usage
        assert_eq!(outcome.usage.total_tokens, 30);
    }

    #[tokio::test]
    async fn test_tool_round_limit_falls_back() {
        let mut config = ChatConfig::default();
        config.max_tool_rounds = 1;

        // The model keeps asking for tools past the budget
        let service = service_with(
            vec![
                ScriptedProvider::tool_response("explain_gas_fees", json!({"chain": "ethereum"})),
                ScriptedProvider::tool_response("explain_gas_fees", json!({"chain": "solana"})),
            ],
            config,
        );

        let outcome = service.send_message(None, "Compare gas fees").await.unwrap();
        assert_eq!(outcome.response, FALLBACK_RESPONSE);
        assert_eq!(outcome.tool_rounds, 1);
    }

    #[tokio::test]
    async fn test_empty_model_text_uses_fallback() {
        let service = service_with(
            vec![ScriptedProvider::text_response("   ")],
            ChatConfig::default(),
        );

        let outcome = service.send_message(None, "Hello").await.unwrap();
        assert_eq!(outcome.response, FALLBACK_RESPONSE);
    }

    #[tokio::test]
    async fn test_rejects_empty_message() {
        let service = service_with(vec![], ChatConfig::default());
        let result = service.send_message(None, "   \n  ").await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_rejects_oversized_message() {
        let mut config = ChatConfig::default();
        config.max_message_length = 10;
        let service = service_with(vec![], config);

        let result = service.send_message(None, "This is far too long").await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_message_limit_per_session() {
        let mut config = ChatConfig::default();
        config.max_messages_per_session = 2;

        let service = service_with(
            vec![ScriptedProvider::text_response("Answer")],
            config,
        );

        let outcome = service.send_message(None, "First").await.unwrap();
        // History now holds user + assistant, which is already at the cap
        let result = service
            .send_message(Some(outcome.session_id), "Second")
            .await;
        assert!(matches!(result, Err(Error::Chat(_))));
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest_session() {
        let mut config = ChatConfig::default();
        config.max_sessions = 1;

        let service = service_with(
            vec![
                ScriptedProvider::text_response("One"),
                ScriptedProvider::text_response("Two"),
            ],
            config,
        );

        let first = service.send_message(None, "First").await.unwrap();
        let second = service.send_message(None, "Second").await.unwrap();

        assert_eq!(service.session_count().await, 1);
        assert!(service.get_session(&first.session_id).await.is_err());
        assert!(service.get_session(&second.session_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_eviction_clears_history() {
        let mut config = ChatConfig::default();
        config.max_sessions = 1;

        let service = service_with(
            vec![
                ScriptedProvider::text_response("One"),
                ScriptedProvider::text_response("Two"),
                ScriptedProvider::text_response("Three"),
            ],
            config,
        );

        let first = service.send_message(None, "First").await.unwrap();
        service.send_message(None, "Second").await.unwrap();

        // Reusing the evicted id starts a clean conversation
        let revived = service
            .send_message(Some(first.session_id.clone()), "Third")
            .await
            .unwrap();
        assert_eq!(revived.session_id, first.session_id);

        let session = service.get_session(&first.session_id).await.unwrap();
        assert_eq!(session.message_count, 1);
        let history = service.messages.read().await;
        assert_eq!(history[&first.session_id].len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_session_id_is_recreated() {
        let service = service_with(
            vec![ScriptedProvider::text_response("Welcome back")],
            ChatConfig::default(),
        );

        let outcome = service
            .send_message(Some("client-kept-id".to_string()), "Hello again")
            .await
            .unwrap();
        assert_eq!(outcome.session_id, "client-kept-id");
        assert!(service.get_session("client-kept-id").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_session_is_idempotent() {
        let service = service_with(
            vec![ScriptedProvider::text_response("Hi")],
            ChatConfig::default(),
        );

        let outcome = service.send_message(None, "Hello").await.unwrap();
        assert!(service.delete_session(&outcome.session_id).await);
        assert!(!service.delete_session(&outcome.session_id).await);
        assert_eq!(service.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_system_instruction_and_tools_sent_each_round() {
        let provider = ScriptedProvider::new(vec![
            ScriptedProvider::tool_response("explain_gas_fees", json!({"chain": "polygon"})),
            ScriptedProvider::text_response("Polygon fees are pennies."),
        ]);
        let request_log = provider.request_log();

        let service = ChatService::new(
            Box::new(provider),
            Arc::new(Toolkit::new().unwrap()),
            ProviderConfig::default(),
            ChatConfig::default(),
        );

        service
            .send_message(None, "What do Polygon fees cost?")
            .await
            .unwrap();

        let requests = request_log.lock().unwrap();
        assert_eq!(requests.len(), 2);
        for request in requests.iter() {
            assert!(request
                .system_instruction
                .as_deref()
                .unwrap()
                .contains("BlockchainBuddy"));
            assert_eq!(request.tools.len(), 5);
        }
        // The second round carries the tool call and its result
        let follow_up = &requests[1];
        assert!(follow_up.messages.len() >= 3);
    }
}
