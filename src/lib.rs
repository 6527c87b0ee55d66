//! # toolcall-bridge
//!
//! Translates between structured function calling (tools and tool calls as
//! typed JSON attached to messages) and the in-band sentinel-tag convention
//! where a model writes `<tool_call>{json}</tool_call>` directly into its
//! text.
//!
//! ## Overview
//!
//! The bridge sits between an OpenAI-style API consumer and an upstream model
//! that only understands a linear prompt with role sentinel tokens. It:
//!
//! - accepts tool definitions in MCP or OpenAI shape and normalizes them,
//! - executes tool calls already present in the conversation,
//! - injects tool definitions and prior results into the prompt,
//! - renders the conversation with the upstream model's sentinel tokens,
//! - recovers tool calls the model writes in-line, from full text or deltas.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use toolcall_bridge::{BridgeRequest, Message, ToolBridge};
//!
//! #[tokio::main]
//! async fn main() -> toolcall_bridge::Result<()> {
//!     let bridge = ToolBridge::builder()
//!         .advertise_registered_tools(true)
//!         .build()?;
//!
//!     let prepared = bridge
//!         .prepare(BridgeRequest::new(vec![Message::user("What is (2+3)*4?")]))
//!         .await;
//!     // Send prepared.prompt upstream, then:
//!     let reply = bridge.parse_reply("<tool_call>...</tool_call>");
//!     let next_turn = bridge.apply_reply(prepared.messages, reply).await;
//!     # let _ = next_turn;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Messages, tools, tool calls, tool results |
//! | [`mcp`] | Tool normalization (MCP / OpenAI / fallback) |
//! | [`context`] | Tool and tool-result context rendering |
//! | [`tool_call`] | `<tool_call>` parsing and streaming detection |
//! | [`tools`] | Tool executor, handler registry, built-in tools |
//! | [`pipeline`] | Execute tool calls and fold results into the conversation |
//! | [`prompt`] | Sentinel-token prompt rendering |
//! | [`bridge`] | [`ToolBridge`] facade |
//! | [`config`] | YAML / environment configuration |
//! | [`telemetry`] | Injected log sinks |

pub mod bridge;
pub mod config;
pub mod context;
pub mod mcp;
pub mod pipeline;
pub mod prompt;
pub mod telemetry;
pub mod tool_call;
pub mod tools;
pub mod types;

// Re-export main types for convenience
pub use bridge::{AssistantReply, BridgeRequest, PreparedPrompt, ToolBridge, ToolBridgeBuilder};
pub use config::BridgeConfig;
pub use telemetry::LogSink;
pub use tools::{ToolError, ToolExecutor, ToolHandler};
pub use types::{
    message::{Message, MessageContent, MessageRole},
    tool::{Tool, ToolCall, ToolResult},
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
