use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::message::{Message, ToolCall};
use crate::tool::ToolDefinition;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tools: Vec<ToolDefinition>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            model: None,
            temperature: None,
            max_tokens: None,
            tools: Vec::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The assistant's response message: either plain text content or one
    /// or more tool calls.
    pub message: Message,
    pub model: String,
    pub finish_reason: FinishReason,
}

impl CompletionResponse {
    /// The tool calls the model requested, empty for a plain-text turn.
    pub fn tool_calls(&self) -> &[ToolCall] {
        &self.message.tool_calls
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    Error,
}

/// A chat-completion endpoint. The pipeline is fully synchronous per
/// request; there is no streaming surface.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// The default model, if one is configured. None lets the API pick.
    fn default_model(&self) -> Option<&str>;

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_builder() {
        let request = CompletionRequest::new(vec![Message::user("Hello")])
            .with_model("qwen3:0.6b")
            .with_temperature(0.2)
            .with_max_tokens(1024);

        assert_eq!(request.model, Some("qwen3:0.6b".to_string()));
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(1024));
        assert!(request.tools.is_empty());
    }

    #[test]
    fn test_response_tool_calls_accessor() {
        let calls = vec![ToolCall::new("c1", "search_rag", serde_json::json!({"query": "q"}))];
        let response = CompletionResponse {
            message: Message::assistant_with_tool_calls("", calls),
            model: "test".to_string(),
            finish_reason: FinishReason::ToolCalls,
        };
        assert_eq!(response.tool_calls().len(), 1);
    }
}
