//! # Message Pipeline
//!
//! Detects structured tool calls in a conversation, executes them, and folds
//! the results back in as tool-role messages.
//!
//! ```text
//! [user, assistant{tool_calls: [A, B]}, user]
//!        │
//!        ▼
//! [user, assistant{tool_calls: [A, B]}, tool(A), tool(B), user]
//! ```
//!
//! Calls run strictly one after another: call *i+1* starts only after the
//! result of call *i* has been recorded, so result messages always follow
//! call order.

use std::sync::Arc;

use crate::tools::ToolExecutor;
use crate::types::message::Message;
use crate::types::tool::ToolResult;

/// Output of [`MessagePipeline::process_messages`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedMessages {
    pub messages: Vec<Message>,
    pub tool_results: Vec<ToolResult>,
}

/// True iff any message carries a non-empty `tool_calls` array.
pub fn has_tool_calls(messages: &[Message]) -> bool {
    messages.iter().any(Message::has_tool_calls)
}

/// Synthetic tool-role message for a result. Errors render as `Error: <error>`.
pub fn tool_result_message(result: &ToolResult) -> Message {
    let text = match &result.error {
        Some(error) => format!("Error: {}", error),
        None => result.content.clone(),
    };
    Message::tool(&result.tool_call_id, text)
}

#[derive(Clone)]
pub struct MessagePipeline {
    executor: Arc<ToolExecutor>,
}

impl Default for MessagePipeline {
    fn default() -> Self {
        Self::new(Arc::new(ToolExecutor::default()))
    }
}

impl MessagePipeline {
    pub fn new(executor: Arc<ToolExecutor>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &ToolExecutor {
        &self.executor
    }

    /// Copy every message through, inserting a tool message after each
    /// executed call, directly behind the message that requested it.
    pub async fn process_messages(&self, messages: Vec<Message>) -> ProcessedMessages {
        let mut out = ProcessedMessages {
            messages: Vec::with_capacity(messages.len()),
            tool_results: Vec::new(),
        };

        for message in messages {
            let calls = message.tool_calls.clone().unwrap_or_default();
            out.messages.push(message);

            for call in &calls {
                let result = self.executor.execute(call).await;
                out.messages.push(tool_result_message(&result));
                out.tool_results.push(result);
            }
        }

        out
    }
}
