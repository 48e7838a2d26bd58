use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::{debug, warn};

use crate::app::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::models::circuit_breaker::CircuitBreaker;
use crate::models::provider::{
    FunctionCall, GenerateRequest, GenerateResponse, Message, MessagePart, MessageRole,
    ModelProvider, TokenUsage, ToolDeclaration,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    max_retries: u32,
    circuit_breaker: CircuitBreaker,
}

impl GeminiProvider {
    pub fn new(api_key: String, config: ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::model_provider(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: config
                .api_endpoint
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_retries: config.max_retries,
            circuit_breaker: CircuitBreaker::new("gemini", 5, Duration::from_secs(30)),
        })
    }

    fn convert_messages(messages: &[Message]) -> Vec<GeminiContent> {
        messages
            .iter()
            .map(|message| GeminiContent {
                // Gemini uses "model" instead of "assistant"
                role: match message.role {
                    MessageRole::User => "user".to_string(),
                    MessageRole::Assistant => "model".to_string(),
                },
                parts: message.parts.iter().map(GeminiPart::from_part).collect(),
            })
            .collect()
    }

    fn convert_tools(tools: &[ToolDeclaration]) -> Option<Vec<GeminiTool>> {
        if tools.is_empty() {
            return None;
        }
        Some(vec![GeminiTool {
            function_declarations: tools
                .iter()
                .map(|tool| GeminiFunctionDeclaration {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    parameters: tool.parameters.clone(),
                })
                .collect(),
        }])
    }

    fn parse_response(response: GeminiResponse) -> GenerateResponse {
        let candidate = response.candidates.into_iter().next();

        let mut text = String::new();
        let mut function_calls = Vec::new();
        let mut finish_reason = None;

        if let Some(candidate) = candidate {
            finish_reason = candidate.finish_reason;
            for part in candidate.content.parts {
                if let Some(chunk) = part.text {
                    text.push_str(&chunk);
                }
                if let Some(call) = part.function_call {
                    function_calls.push(FunctionCall {
                        name: call.name,
                        args: call.args,
                    });
                }
            }
        }

        let usage = response
            .usage_metadata
            .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count));

        GenerateResponse {
            text,
            function_calls,
            finish_reason,
            usage,
        }
    }

    async fn post_once(&self, url: &str, body: &GeminiRequest) -> std::result::Result<GeminiResponse, AttemptError> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| AttemptError {
                retryable: e.is_timeout() || e.is_connect(),
                error: Error::model_provider(format!("Request failed: {}", e)),
            })?;

        let status = response.status();
        if status.is_success() {
            let gemini_response: GeminiResponse = response.json().await.map_err(|e| AttemptError {
                retryable: false,
                error: Error::model_provider(format!("Failed to parse response: {}", e)),
            })?;

            debug!("Received successful response from Gemini API");
            Ok(gemini_response)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            warn!("Gemini API error: {} - {}", status, error_text);
            Err(AttemptError {
                retryable: status.as_u16() == 429 || status.is_server_error(),
                error: Error::model_provider(format!("API error {}: {}", status, error_text)),
            })
        }
    }
}

struct AttemptError {
    retryable: bool,
    error: Error,
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        let gemini_request = GeminiRequest {
            system_instruction: request.system_instruction.map(|text| GeminiSystemInstruction {
                parts: vec![GeminiPart::text(text)],
            }),
            contents: Self::convert_messages(&request.messages),
            tools: Self::convert_tools(&request.tools),
            generation_config: Some(GeminiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            }),
        };

        // The URL carries the API key as a query parameter, so it must never
        // be logged.
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, request.model, self.api_key
        );

        // 200ms, 400ms, 800ms, ... between retries
        let retry_strategy = ExponentialBackoff::from_millis(2)
            .factor(100)
            .map(jitter)
            .take(self.max_retries as usize);

        let response = self
            .circuit_breaker
            .call(|| async {
                RetryIf::spawn(
                    retry_strategy.clone(),
                    || self.post_once(&url, &gemini_request),
                    |e: &AttemptError| e.retryable,
                )
                .await
                .map_err(|e| e.error)
            })
            .await?;

        Ok(Self::parse_response(response))
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }
}

#[derive(Debug, Clone, Serialize)]
struct GeminiRequest {
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiTool>>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Clone, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize)]
struct GeminiTool {
    #[serde(rename = "functionDeclarations")]
    function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Debug, Clone, Serialize)]
struct GeminiFunctionDeclaration {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "functionCall", skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCall>,
    #[serde(rename = "functionResponse", skip_serializing_if = "Option::is_none")]
    function_response: Option<GeminiFunctionResponse>,
}

impl GeminiPart {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    fn from_part(part: &MessagePart) -> Self {
        match part {
            MessagePart::Text(text) => Self::text(text.clone()),
            MessagePart::FunctionCall(call) => Self {
                function_call: Some(GeminiFunctionCall {
                    name: call.name.clone(),
                    args: call.args.clone(),
                }),
                ..Self::default()
            },
            MessagePart::FunctionResponse { name, response } => Self {
                function_response: Some(GeminiFunctionResponse {
                    name: name.clone(),
                    response: response.clone(),
                }),
                ..Self::default()
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    name: String,
    response: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiUsage {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_provider() -> GeminiProvider {
        GeminiProvider::new("test-key".to_string(), ProviderConfig::default()).unwrap()
    }

    #[test]
    fn test_provider_creation() {
        let provider = test_provider();
        assert_eq!(provider.provider_name(), "gemini");
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_message_conversion_maps_roles() {
        let messages = vec![
            Message::user("Hello!"),
            Message::assistant("Hi there!"),
            Message::function_response("get_blockchain_info", json!({"status": "success"})),
        ];

        let converted = GeminiProvider::convert_messages(&messages);
        assert_eq!(converted.len(), 3);
        assert_eq!(converted[0].role, "user");
        assert_eq!(converted[1].role, "model");
        assert_eq!(converted[2].role, "user");
        assert!(converted[2].parts[0].function_response.is_some());
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = GeminiRequest {
            system_instruction: Some(GeminiSystemInstruction {
                parts: vec![GeminiPart::text("Be helpful.")],
            }),
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart::text("Hi")],
            }],
            tools: Some(vec![GeminiTool {
                function_declarations: vec![GeminiFunctionDeclaration {
                    name: "convert_crypto_units".to_string(),
                    description: "Convert units".to_string(),
                    parameters: json!({"type": "object"}),
                }],
            }]),
            generation_config: Some(GeminiGenerationConfig {
                temperature: Some(0.2),
                max_output_tokens: Some(64),
            }),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("systemInstruction").is_some());
        assert!(value["tools"][0].get("functionDeclarations").is_some());
        assert!(value["generationConfig"].get("maxOutputTokens").is_some());
    }

    #[test]
    fn test_parse_response_extracts_text_and_usage() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "Ethereum uses "}, {"text": "Proof of Stake."}]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {
                "promptTokenCount": 12,
                "candidatesTokenCount": 8,
                "totalTokenCount": 20
            }
        }))
        .unwrap();

        let parsed = GeminiProvider::parse_response(response);
        assert_eq!(parsed.text, "Ethereum uses Proof of Stake.");
        assert!(parsed.function_calls.is_empty());
        assert_eq!(parsed.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(parsed.usage.unwrap().total_tokens, 20);
    }

    #[test]
    fn test_parse_response_extracts_function_calls() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{
                        "functionCall": {
                            "name": "validate_wallet_address",
                            "args": {"address": "0xabc", "chain": "ethereum"}
                        }
                    }]
                },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        let parsed = GeminiProvider::parse_response(response);
        assert!(parsed.text.is_empty());
        assert_eq!(parsed.function_calls.len(), 1);
        assert_eq!(parsed.function_calls[0].name, "validate_wallet_address");
        assert_eq!(parsed.function_calls[0].args["chain"], "ethereum");
    }

    #[test]
    fn test_parse_empty_response() {
        let response: GeminiResponse = serde_json::from_value(json!({})).unwrap();
        let parsed = GeminiProvider::parse_response(response);
        assert!(parsed.text.is_empty());
        assert!(parsed.function_calls.is_empty());
        assert!(parsed.usage.is_none());
    }
}
