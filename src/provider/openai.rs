//! OpenAI-compatible Chat Completions responder.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::agent_loop::Responder;
use crate::config::{TaskLoopConfig, DEFAULT_BASE_URL};
use crate::error::{Result, TaskLoopError};
use crate::tools::ToolDefinition;
use crate::types::*;
use crate::util::retry::RetryPolicy;

use super::http::{bearer_headers, shared_client, status_to_error};

/// Sends the conversation to `{base_url}/chat/completions` and turns the
/// first choice into an [`AgentResponse`]. Retryable faults (rate limits,
/// network errors, 5xx) are retried per the configured [`RetryPolicy`].
pub struct OpenAiResponder {
    model: String,
    api_key: String,
    base_url: String,
    settings: GenerationSettings,
    tools: Vec<ToolDefinition>,
    retry: RetryPolicy,
}

impl OpenAiResponder {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>, base_url: Option<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            settings: GenerationSettings::default(),
            tools: Vec::new(),
            retry: RetryPolicy::default(),
        }
    }

    /// Build from config; requires an API key.
    pub fn from_config(config: &TaskLoopConfig, tools: Vec<ToolDefinition>) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            TaskLoopError::Configuration(
                "OPENAI_API_KEY is not set (environment or config file)".to_string(),
            )
        })?;
        let retry = RetryPolicy {
            max_attempts: config.request_attempts.max(1),
            ..RetryPolicy::default()
        };
        Ok(Self::new(config.model.clone(), api_key, config.base_url.clone())
            .with_settings(config.generation.clone())
            .with_tools(tools)
            .with_retry_policy(retry))
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request_body(&self, messages: &[ModelMessage]) -> serde_json::Value {
        let messages = messages.iter().map(message_to_openai).collect::<Vec<_>>();

        let mut obj = serde_json::Map::new();
        obj.insert("model".into(), self.model.clone().into());
        obj.insert("messages".into(), messages.into());

        if let Some(max) = self.settings.max_tokens {
            obj.insert("max_tokens".into(), max.into());
        }
        if let Some(temp) = self.settings.temperature {
            obj.insert("temperature".into(), temp.into());
        }
        if let Some(top_p) = self.settings.top_p {
            obj.insert("top_p".into(), top_p.into());
        }
        if let Some(ref stops) = self.settings.stop_sequences {
            obj.insert("stop".into(), serde_json::json!(stops));
        }
        if let Some(seed) = self.settings.seed {
            obj.insert("seed".into(), seed.into());
        }
        if let Some(ref user) = self.settings.user {
            obj.insert("user".into(), user.clone().into());
        }

        if !self.tools.is_empty() {
            let tool_defs: Vec<serde_json::Value> = self
                .tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        }
                    })
                })
                .collect();
            obj.insert("tools".into(), tool_defs.into());
        }

        serde_json::Value::Object(obj)
    }

    async fn send(&self, body: &serde_json::Value) -> Result<AgentResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %self.model, "chat completion request");

        let resp = shared_client()
            .post(&url)
            .headers(bearer_headers(&self.api_key))
            .json(body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let data: ChatResponse = resp.json().await?;
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TaskLoopError::api(200, "No choices in chat completion response"))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| AgentToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: serde_json::from_str(&tc.function.arguments)
                    .unwrap_or(serde_json::Value::String(tc.function.arguments)),
            })
            .collect();

        Ok(AgentResponse {
            content: choice.message.content.filter(|c| !c.is_empty()),
            tool_calls,
            finish_reason: choice.finish_reason.as_deref().and_then(|r| r.parse::<FinishReason>().ok()),
        })
    }
}

#[async_trait]
impl Responder for OpenAiResponder {
    async fn respond(&self, messages: &[ModelMessage]) -> Result<AgentResponse> {
        let body = self.build_request_body(messages);
        self.retry.execute(|| self.send(&body)).await
    }
}

fn message_to_openai(msg: &ModelMessage) -> serde_json::Value {
    let role = msg.role.to_string();

    if let [ContentPart::ToolResult(tr)] = msg.content.as_slice() {
        return serde_json::json!({
            "role": "tool",
            "tool_call_id": tr.tool_call_id,
            "content": tr.text(),
        });
    }

    let tool_calls = msg.tool_calls();
    if !tool_calls.is_empty() {
        let tc_json: Vec<serde_json::Value> = tool_calls
            .iter()
            .map(|tc| {
                serde_json::json!({
                    "id": tc.id,
                    "type": "function",
                    "function": {
                        "name": tc.name,
                        "arguments": tc.arguments.to_string(),
                    }
                })
            })
            .collect();
        let text = msg.text();
        return serde_json::json!({
            "role": role,
            "content": if text.is_empty() { serde_json::Value::Null } else { serde_json::Value::String(text) },
            "tool_calls": tc_json,
        });
    }

    if let [ContentPart::Text { text }] = msg.content.as_slice() {
        return serde_json::json!({ "role": role, "content": text });
    }

    let parts: Vec<serde_json::Value> = msg
        .content
        .iter()
        .filter_map(|part| match part {
            ContentPart::Text { text } => Some(serde_json::json!({ "type": "text", "text": text })),
            _ => None,
        })
        .collect();
    serde_json::json!({ "role": role, "content": parts })
}

// Chat Completions response types (internal)

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ChatToolCall>>,
}

#[derive(Deserialize)]
struct ChatToolCall {
    id: String,
    function: ChatFunction,
}

#[derive(Deserialize)]
struct ChatFunction {
    name: String,
    arguments: String,
}
