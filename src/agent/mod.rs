//! Agent definition and the bounded tool-calling loop.

pub mod tools;

use crate::config::AgentConfig;
use crate::error::{Error, Result};
use crate::llm::{ConversationMessage, LlmClient, StopReason, ToolDef, Usage};
use tracing::{debug, info, warn};

/// A named model configuration: instructions, client, and the tools it may call.
pub struct Agent {
    pub name: String,
    pub instructions: String,
    pub client: LlmClient,
    pub tools: Vec<ToolDef>,
}

impl Agent {
    /// Agent with the three cheminformatics tools attached.
    pub fn new(name: impl Into<String>, instructions: impl Into<String>, client: LlmClient) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            client,
            tools: tools::tool_definitions(),
        }
    }

    pub fn from_config(config: &AgentConfig, client: LlmClient) -> Self {
        Self::new(&config.name, &config.instructions, client)
    }
}

/// Outcome of one [`Runner::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub final_output: String,
    pub turns: u32,
    pub tool_calls: u32,
    pub usage: Usage,
}

pub struct Runner;

impl Runner {
    /// Drive `agent` through the request → tool → request loop until the
    /// model answers without tool calls, or `max_turns` model calls were made.
    pub async fn run(agent: &Agent, query: &str, max_turns: u32) -> Result<RunResult> {
        let mut messages = vec![
            ConversationMessage::System(agent.instructions.clone()),
            ConversationMessage::User(query.to_string()),
        ];
        let mut turns = 0u32;
        let mut tool_calls = 0u32;
        let mut usage = Usage::default();

        info!(agent = %agent.name, model = %agent.client.model(), max_turns, "starting run");

        loop {
            if turns >= max_turns {
                warn!(turns, "hit max turns without a final answer");
                return Err(Error::MaxTurnsExceeded(max_turns));
            }

            let response = agent.client.converse(&messages, &agent.tools).await?;
            turns += 1;
            usage.input_tokens += response.usage.input_tokens;
            usage.output_tokens += response.usage.output_tokens;

            debug!(
                turn = turns,
                stop = ?response.stop_reason,
                calls = response.tool_calls.len(),
                "agent turn"
            );

            if response.tool_calls.is_empty() {
                if response.stop_reason == StopReason::MaxTokens {
                    warn!("reply was truncated at max_tokens");
                }
                let final_output = response.content.unwrap_or_default();
                info!(turns, tool_calls, "run finished");
                return Ok(RunResult {
                    final_output,
                    turns,
                    tool_calls,
                    usage,
                });
            }

            let calls = response.tool_calls;
            messages.push(ConversationMessage::Assistant {
                content: response.content,
                tool_calls: calls.clone(),
            });

            for call in &calls {
                let outcome = tools::dispatch(&call.name, &call.arguments);
                tool_calls += 1;
                if outcome.is_error {
                    debug!(tool = %call.name, result = %outcome.content, "tool returned an error");
                }
                messages.push(ConversationMessage::Tool {
                    tool_call_id: call.id.clone(),
                    content: outcome.content,
                });
            }
        }
    }
}
