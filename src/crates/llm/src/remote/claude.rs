//! Anthropic Claude client implementation.
//!
//! Talks to the Messages API (`POST {base_url}/v1/messages`).
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::remote::ClaudeClient;
//! use llm::{ChatModel, Message, RemoteLlmConfig};
//!
//! let config = RemoteLlmConfig::from_env(
//!     "ANTHROPIC_API_KEY",
//!     "https://api.anthropic.com",
//!     "claude-3-5-sonnet-latest",
//! )?;
//! let client = ClaudeClient::new(config)?;
//!
//! let reply = client.complete(&[Message::user("Hello!")]).await?;
//! ```

use crate::config::RemoteLlmConfig;
use crate::error::{LlmError, Result};
use crate::messages::{Message, Role};
use crate::traits::ChatModel;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Claude API client.
#[derive(Clone)]
pub struct ClaudeClient {
    config: RemoteLlmConfig,
    client: Client,
}

impl ClaudeClient {
    /// Create a new Claude client with the given configuration.
    pub fn new(config: RemoteLlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Model this client sends requests to.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }

    fn build_request<'a>(&'a self, messages: &'a [Message]) -> ClaudeRequest<'a> {
        ClaudeRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: messages
                .iter()
                .map(|m| ClaudeMessage {
                    role: m.role,
                    content: &m.content,
                })
                .collect(),
        }
    }
}

/// Join the text blocks of a reply; a reply without text is unusable.
fn extract_text(resp: ClaudeResponse) -> Result<String> {
    let text = resp
        .content
        .into_iter()
        .filter(|c| c.content_type == "text")
        .filter_map(|c| c.text)
        .collect::<Vec<_>>()
        .join("");

    if text.is_empty() {
        return Err(LlmError::InvalidResponse(format!(
            "reply {} contained no text (stop_reason: {})",
            resp.id,
            resp.stop_reason.unwrap_or_default()
        )));
    }
    Ok(text)
}

#[async_trait]
impl ChatModel for ClaudeClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let req_body = self.build_request(messages);

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&req_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(e.to_string())
                } else {
                    LlmError::HttpError(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(status.as_u16(), error_text));
        }

        let claude_resp: ClaudeResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        debug!(
            model = %claude_resp.model,
            input_tokens = claude_resp.usage.input_tokens,
            output_tokens = claude_resp.usage.output_tokens,
            "Claude reply received"
        );

        extract_text(claude_resp)
    }

    fn name(&self) -> &str {
        "claude"
    }
}

// Claude API types
#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ClaudeMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    id: String,
    content: Vec<ClaudeContent>,
    model: String,
    stop_reason: Option<String>,
    usage: ClaudeUsage,
}

#[derive(Debug, Deserialize)]
struct ClaudeContent {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClaudeUsage {
    input_tokens: usize,
    output_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_BASE_URL, DEFAULT_MODEL};

    fn client() -> ClaudeClient {
        let config = RemoteLlmConfig::new("test-key", DEFAULT_BASE_URL, DEFAULT_MODEL);
        ClaudeClient::new(config).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = client();
        assert_eq!(client.model(), "claude-3-5-sonnet-latest");
        assert_eq!(client.name(), "claude");
    }

    #[test]
    fn test_messages_url_trims_trailing_slash() {
        let config = RemoteLlmConfig::new("k", "http://localhost:8080/", DEFAULT_MODEL);
        let client = ClaudeClient::new(config).unwrap();
        assert_eq!(client.messages_url(), "http://localhost:8080/v1/messages");
    }

    #[test]
    fn test_request_body() {
        let client = client();
        let messages = vec![
            Message::user("riddle"),
            Message::assistant("restated"),
            Message::user("Proceed."),
        ];

        let body = serde_json::to_value(client.build_request(&messages)).unwrap();

        assert_eq!(body["model"], "claude-3-5-sonnet-latest");
        assert_eq!(body["max_tokens"], 4096);
        let sent = body["messages"].as_array().unwrap();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0]["role"], "user");
        assert_eq!(sent[1]["role"], "assistant");
        assert_eq!(sent[1]["content"], "restated");
        assert_eq!(sent[2]["content"], "Proceed.");
    }

    #[test]
    fn test_extract_text_joins_text_blocks() {
        let resp: ClaudeResponse = serde_json::from_value(serde_json::json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-5-sonnet-latest",
            "content": [
                {"type": "text", "text": "Take the "},
                {"type": "tool_use", "id": "t", "name": "x", "input": {}},
                {"type": "text", "text": "goat first."}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }))
        .unwrap();

        assert_eq!(extract_text(resp).unwrap(), "Take the goat first.");
    }

    #[test]
    fn test_extract_text_rejects_empty_reply() {
        let resp: ClaudeResponse = serde_json::from_value(serde_json::json!({
            "id": "msg_2",
            "model": "claude-3-5-sonnet-latest",
            "content": [],
            "stop_reason": "max_tokens",
            "usage": {"input_tokens": 10, "output_tokens": 0}
        }))
        .unwrap();

        let err = extract_text(resp).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
        assert!(err.to_string().contains("msg_2"));
    }
}
