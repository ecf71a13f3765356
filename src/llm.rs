//! OpenAI-compatible chat-completions client with function calling.
//!
//! Works against anything that speaks `/v1/chat/completions`: a local
//! ollama, vLLM, llama.cpp server, or a hosted provider.

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("chem-agent/", env!("CARGO_PKG_VERSION"));

/// A tool the model may call, described by a JSON schema for its arguments.
#[derive(Debug, Clone)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// One tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Raw JSON argument string as sent by the model. Decoded by the dispatcher
    /// so malformed arguments surface as a tool error, not a transport error.
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversationMessage {
    System(String),
    User(String),
    Assistant {
        content: Option<String>,
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// One model reply.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub stop_reason: StopReason,
    pub usage: Usage,
}

pub struct LlmClient {
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: String,
    http: HttpClient,
}

// -- Wire format --

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'a str>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: WireFunction<'a>,
}

#[derive(Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: WireToolCallFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCallFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: WireMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

fn function_type() -> String {
    "function".into()
}

impl From<&ConversationMessage> for WireMessage {
    fn from(msg: &ConversationMessage) -> Self {
        match msg {
            ConversationMessage::System(text) => Self::plain("system", text),
            ConversationMessage::User(text) => Self::plain("user", text),
            ConversationMessage::Assistant {
                content,
                tool_calls,
            } => Self {
                role: "assistant".into(),
                content: content.clone(),
                tool_call_id: None,
                tool_calls: (!tool_calls.is_empty()).then(|| {
                    tool_calls
                        .iter()
                        .map(|tc| WireToolCall {
                            id: tc.id.clone(),
                            call_type: function_type(),
                            function: WireToolCallFunction {
                                name: tc.name.clone(),
                                arguments: tc.arguments.clone(),
                            },
                        })
                        .collect()
                }),
            },
            ConversationMessage::Tool {
                tool_call_id,
                content,
            } => Self {
                role: "tool".into(),
                content: Some(content.clone()),
                tool_call_id: Some(tool_call_id.clone()),
                tool_calls: None,
            },
        }
    }
}

impl WireMessage {
    fn plain(role: &str, text: &str) -> Self {
        Self {
            role: role.into(),
            content: Some(text.into()),
            tool_call_id: None,
            tool_calls: None,
        }
    }
}

impl LlmClient {
    pub fn new(
        api_key: String,
        model: String,
        max_tokens: u32,
        base_url: String,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self> {
        let http = HttpClient::new(USER_AGENT, timeout, max_retries)?;
        Ok(Self::with_http(api_key, model, max_tokens, base_url, http))
    }

    pub fn with_http(
        api_key: String,
        model: String,
        max_tokens: u32,
        base_url: String,
        http: HttpClient,
    ) -> Self {
        Self {
            api_key,
            model,
            max_tokens,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Build from config. See [`LlmConfig::resolve_api_key`] for key lookup.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config.resolve_api_key();
        if config.base_url.is_empty() {
            return Err(Error::config("llm.base_url must not be empty"));
        }
        if config.model.is_empty() {
            return Err(Error::config("llm.model must not be empty"));
        }
        Self::new(
            api_key,
            config.model.clone(),
            config.max_tokens,
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
            config.max_retries,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send the conversation plus tool schemas and return the model's reply.
    pub async fn converse(
        &self,
        messages: &[ConversationMessage],
        tools: &[ToolDef],
    ) -> Result<LlmResponse> {
        debug!(model = %self.model, messages = messages.len(), "sending chat request");

        let request = ChatRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: messages.iter().map(WireMessage::from).collect(),
            tools: tools
                .iter()
                .map(|t| WireTool {
                    tool_type: "function",
                    function: WireFunction {
                        name: &t.name,
                        description: &t.description,
                        parameters: &t.input_schema,
                    },
                })
                .collect(),
            tool_choice: (!tools.is_empty()).then_some("auto"),
        };

        let body = serde_json::to_string(&request)
            .map_err(|e| Error::parse(format!("serialize request: {e}")))?;

        let url = format!("{}/chat/completions", self.base_url);
        let response_text = self
            .http
            .post_json_raw(
                &url,
                &body,
                &[("Authorization", &format!("Bearer {}", self.api_key))],
            )
            .await
            .map_err(|e| {
                warn!("LLM API error: {e}");
                self.classify_error(e)
            })?;

        parse_chat_response(&response_text)
    }

    /// List model ids served by the endpoint.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/models", self.base_url);
        let list: ModelList = self.http.get_json_authed(&url, &self.api_key).await?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }

    /// Fail with `ModelNotFound` if the endpoint lists models and ours is not
    /// among them. Endpoints without a `/models` route are given the benefit
    /// of the doubt.
    pub async fn ensure_model_available(&self) -> Result<()> {
        match self.list_models().await {
            Ok(ids) if ids.iter().any(|id| id == &self.model) => Ok(()),
            Ok(ids) => {
                debug!(available = ?ids, "model missing from listing");
                Err(Error::model_not_found(&self.model, &self.base_url))
            }
            Err(e) if e.status_code() == Some(404) || matches!(e, Error::Parse(_)) => {
                warn!(error = %e, "endpoint does not list models, skipping check");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// A 404 that mentions the model name means the endpoint is up but the
    /// model is not served there.
    fn classify_error(&self, e: Error) -> Error {
        match &e {
            Error::Api {
                status_code: Some(404),
                message,
                ..
            } if message.contains(&self.model) || message.contains("model") => {
                Error::model_not_found(&self.model, &self.base_url)
            }
            _ => e,
        }
    }
}

fn parse_chat_response(text: &str) -> Result<LlmResponse> {
    let resp: ChatResponse = serde_json::from_str(text)
        .map_err(|e| Error::parse(format!("parse LLM response: {e}")))?;

    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::parse("empty response from LLM"))?;

    let tool_calls: Vec<ToolCall> = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| ToolCall {
            id: tc.id,
            name: tc.function.name,
            arguments: tc.function.arguments,
        })
        .collect();

    let stop_reason = match choice.finish_reason.as_deref() {
        _ if !tool_calls.is_empty() => StopReason::ToolUse,
        Some("stop") => StopReason::EndTurn,
        Some("tool_calls") | Some("function_call") => StopReason::ToolUse,
        Some("length") => StopReason::MaxTokens,
        None => StopReason::EndTurn,
        Some(_) => StopReason::Other,
    };

    let usage = resp
        .usage
        .map(|u| Usage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        })
        .unwrap_or_default();

    Ok(LlmResponse {
        content: choice.message.content.filter(|c| !c.is_empty()),
        tool_calls,
        stop_reason,
        usage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_tool_call_reply() {
        let body = json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "calculate_logp",
                            "arguments": "{\"smiles\":\"CCO\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 120, "completion_tokens": 18, "total_tokens": 138}
        });
        let resp = parse_chat_response(&body.to_string()).unwrap();
        assert_eq!(resp.stop_reason, StopReason::ToolUse);
        assert!(resp.content.is_none());
        assert_eq!(resp.tool_calls.len(), 1);
        assert_eq!(resp.tool_calls[0].name, "calculate_logp");
        assert_eq!(resp.tool_calls[0].arguments, r#"{"smiles":"CCO"}"#);
        assert_eq!(resp.usage.input_tokens, 120);
        assert_eq!(resp.usage.output_tokens, 18);
    }

    #[test]
    fn parses_final_text_reply_without_usage() {
        let body = json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Ethanol has a logP near zero."},
                "finish_reason": "stop"
            }]
        });
        let resp = parse_chat_response(&body.to_string()).unwrap();
        assert_eq!(resp.stop_reason, StopReason::EndTurn);
        assert!(resp.tool_calls.is_empty());
        assert_eq!(
            resp.content.as_deref(),
            Some("Ethanol has a logP near zero.")
        );
        assert_eq!(resp.usage, Usage::default());
    }

    #[test]
    fn empty_choices_is_parse_error() {
        let err = parse_chat_response(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn assistant_tool_calls_serialize_in_openai_shape() {
        let msg = ConversationMessage::Assistant {
            content: None,
            tool_calls: vec![ToolCall {
                id: "call_9".into(),
                name: "validate_smiles".into(),
                arguments: r#"{"smiles":"C1CCCCC1"}"#.into(),
            }],
        };
        let wire = serde_json::to_value(WireMessage::from(&msg)).unwrap();
        assert_eq!(wire["role"], "assistant");
        assert_eq!(wire["tool_calls"][0]["type"], "function");
        assert_eq!(wire["tool_calls"][0]["function"]["name"], "validate_smiles");
        assert!(wire.get("tool_call_id").is_none());
    }

    #[test]
    fn tool_result_carries_call_id() {
        let msg = ConversationMessage::Tool {
            tool_call_id: "call_9".into(),
            content: "The SMILES string C1CCCCC1 is valid.".into(),
        };
        let wire = serde_json::to_value(WireMessage::from(&msg)).unwrap();
        assert_eq!(wire["role"], "tool");
        assert_eq!(wire["tool_call_id"], "call_9");
        assert!(wire.get("tool_calls").is_none());
    }

    #[test]
    fn not_found_mentioning_model_becomes_model_not_found() {
        let client = LlmClient::new(
            "key".into(),
            "missing-model".into(),
            100,
            "http://localhost:1/v1/".into(),
            Duration::from_secs(1),
            0,
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:1/v1");
        let err = client.classify_error(Error::api_with_status(
            "localhost:1",
            r#"{"error":"model 'missing-model' not found"}"#,
            404,
        ));
        assert!(matches!(err, Error::ModelNotFound { .. }));

        let other = client.classify_error(Error::api_with_status("localhost:1", "boom", 500));
        assert!(matches!(other, Error::Api { .. }));
    }
}
