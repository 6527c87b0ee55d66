//! # Bridge Facade
//!
//! [`ToolBridge`] ties the components together for one request/response
//! cycle:
//!
//! ```text
//! request ─► pipeline (execute tool_calls) ─► normalize tools ─► inject context ─► to_prompt ─► upstream
//! upstream text ─► parse_reply / collect_reply ─► AssistantReply ─► apply_reply ─► next turn
//! ```

mod builder;

pub use builder::ToolBridgeBuilder;

use std::sync::Arc;

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::{render_tool_results_context, render_tools_context};
use crate::error::{Error, ErrorContext};
use crate::mcp::ToolNormalizer;
use crate::pipeline::{has_tool_calls, MessagePipeline, ProcessedMessages};
use crate::prompt::to_prompt;
use crate::telemetry::LogSink;
use crate::tool_call::{strip_tool_call_tags, StreamingToolCallDetector, ToolCallParser};
use crate::tools::ToolExecutor;
use crate::types::message::Message;
use crate::types::tool::{Tool, ToolCall, ToolResult};
use crate::Result;

const COMPONENT: &str = "tool_bridge";

/// Inbound request body as forwarded by the HTTP layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeRequest {
    pub messages: Vec<Message>,
    /// Tool definitions in MCP or OpenAI shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
    /// Results of tool calls executed before this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_results: Option<Vec<ToolResult>>,
}

impl BridgeRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            tools: None,
            tool_results: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_tool_results(mut self, results: Vec<ToolResult>) -> Self {
        self.tool_results = Some(results);
        self
    }

    /// Decode a JSON request body. `messages` must be an array.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        if !value.get("messages").is_some_and(Value::is_array) {
            return Err(Error::validation_with_context(
                "messages must be an array",
                ErrorContext::new()
                    .with_field_path("messages")
                    .with_source("request_decoder"),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// A prompt ready for the upstream model.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPrompt {
    pub prompt: String,
    /// Conversation after tool execution, without injected context.
    pub messages: Vec<Message>,
    /// Canonical tools advertised in the prompt.
    pub tools: Vec<Tool>,
    /// Results produced by executing tool calls found in the request.
    pub tool_results: Vec<ToolResult>,
}

/// Model output split into visible text and requested tool calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl AssistantReply {
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Assistant message carrying the tool calls (if any) in structured form.
    pub fn into_message(self) -> Message {
        Message::assistant_with_tool_calls(self.content, self.tool_calls)
    }
}

pub struct ToolBridge {
    normalizer: ToolNormalizer,
    parser: ToolCallParser,
    pipeline: MessagePipeline,
    advertise_registered_tools: bool,
    log: Arc<dyn LogSink>,
}

impl ToolBridge {
    pub fn builder() -> ToolBridgeBuilder {
        ToolBridgeBuilder::new()
    }

    pub fn executor(&self) -> &ToolExecutor {
        self.pipeline.executor()
    }

    /// Build the upstream prompt for a request.
    ///
    /// Tool calls already present in `messages` are executed first. The tools
    /// context becomes a leading system message and the caller's prior tool
    /// results a trailing user message; both merge with adjacent same-role
    /// messages during rendering.
    pub async fn prepare(&self, request: BridgeRequest) -> PreparedPrompt {
        let BridgeRequest {
            messages,
            tools,
            tool_results,
        } = request;

        let ProcessedMessages {
            messages,
            tool_results: produced,
        } = if has_tool_calls(&messages) {
            self.pipeline.process_messages(messages).await
        } else {
            ProcessedMessages {
                messages,
                tool_results: Vec::new(),
            }
        };

        let mut advertised = self
            .normalizer
            .normalize(tools.as_deref().unwrap_or_default());
        if self.advertise_registered_tools {
            advertised.extend(self.executor().definitions());
        }

        let mut conversation = Vec::with_capacity(messages.len() + 2);
        let tools_context = render_tools_context(&advertised);
        if !tools_context.is_empty() {
            conversation.push(Message::system(tools_context));
        }
        conversation.extend(messages.iter().cloned());
        let results_context =
            render_tool_results_context(tool_results.as_deref().unwrap_or_default());
        if !results_context.is_empty() {
            conversation.push(Message::user(results_context));
        }

        let prompt = to_prompt(&conversation);
        self.log.debug(
            COMPONENT,
            &format!(
                "prepared prompt: {} messages, {} tools, {} executed calls, {} chars",
                messages.len(),
                advertised.len(),
                produced.len(),
                prompt.chars().count()
            ),
        );

        PreparedPrompt {
            prompt,
            messages,
            tools: advertised,
            tool_results: produced,
        }
    }

    /// Split complete model text into visible content and tool calls.
    pub fn parse_reply(&self, text: &str) -> AssistantReply {
        AssistantReply {
            content: strip_tool_call_tags(text),
            tool_calls: self.parser.extract(text),
        }
    }

    /// A detector for incremental model output sharing this bridge's parser.
    pub fn stream_detector(&self) -> StreamingToolCallDetector {
        StreamingToolCallDetector::new(self.parser.clone())
    }

    /// Consume a stream of text deltas into a reply.
    pub async fn collect_reply<S>(&self, mut deltas: S) -> AssistantReply
    where
        S: Stream<Item = String> + Unpin,
    {
        let mut detector = self.stream_detector();
        let mut reply = AssistantReply::default();
        while let Some(delta) = deltas.next().await {
            let chunk = detector.push(&delta);
            reply.content.push_str(&chunk.text);
            reply.tool_calls.extend(chunk.tool_calls);
        }
        reply.content.push_str(&detector.finish().text);
        reply
    }

    /// Fold a reply into the conversation for the next turn.
    ///
    /// Only the reply's own tool calls are executed; earlier calls in
    /// `history` are assumed to be answered already.
    pub async fn apply_reply(
        &self,
        mut history: Vec<Message>,
        reply: AssistantReply,
    ) -> ProcessedMessages {
        let turn = self
            .pipeline
            .process_messages(vec![reply.into_message()])
            .await;
        history.extend(turn.messages);
        ProcessedMessages {
            messages: history,
            tool_results: turn.tool_results,
        }
    }
}
