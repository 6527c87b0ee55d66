//! # Types Module
//!
//! Core data types shared by every stage of the bridge.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Chat message with role, content and optional tool calls |
//! | [`MessageContent`] | String content or an array of content parts |
//! | [`Tool`] | Canonical (MCP-shaped) tool definition |
//! | [`ToolDefinition`] | OpenAI function descriptor |
//! | [`ToolCall`] | Tool invocation requested by the model |
//! | [`ToolResult`] | Outcome of executing a tool call |
//!
//! ## Example
//!
//! ```rust
//! use toolcall_bridge::types::{InputSchema, Message, Tool};
//!
//! let user = Message::user("What's the weather?");
//! let tool = Tool::new(
//!     "get_weather",
//!     "Get current weather for a location",
//!     InputSchema::default()
//!         .property("location", serde_json::json!({"type": "string"}))
//!         .require("location"),
//! );
//! assert_eq!(tool.to_openai().function.name, "get_weather");
//! ```

pub mod message;
pub mod tool;

pub use message::{ContentPart, Message, MessageContent, MessageRole};
pub use tool::{
    FunctionCall, FunctionDefinition, InputSchema, Tool, ToolCall, ToolDefinition, ToolResult,
};
