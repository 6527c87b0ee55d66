//! Renders tool definitions and tool results into prompt text.
//!
//! Both renderers return an empty string for empty input, so callers can
//! splice the output into a prompt unconditionally.

use crate::tool_call::{TOOL_CALL_CLOSE, TOOL_CALL_OPEN};
use crate::types::tool::{Tool, ToolResult};

const TOOLS_LEAD_IN: &str = "You have access to the following tools that can be executed by the client. When you need to use a tool, format your response with the tool call in the following JSON format:";

// Literal key order: id, type, function.name, function.arguments.
const WIRE_FORMAT_EXAMPLE: &str = r#"{
  "id": "call_<unique_id>",
  "type": "function",
  "function": {
    "name": "<tool_name>",
    "arguments": "<json_string_of_arguments>"
  }
}"#;

const TOOLS_GUIDANCE: &str = "When using tools:
1. Always provide a unique ID for each tool call
2. Ensure arguments match the tool's input schema
3. Wait for tool execution results before proceeding
4. You can use multiple tools in sequence if needed";

const RESULTS_LEAD_IN: &str = "Previous tool execution results:";

const RESULTS_LEAD_OUT: &str = "Please continue the conversation considering these tool results.";

/// Instructional block describing the wire format and every available tool.
pub fn render_tools_context(tools: &[Tool]) -> String {
    if tools.is_empty() {
        return String::new();
    }

    let blocks = tools
        .iter()
        .map(render_tool)
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "{lead_in}\n\n{open}\n{example}\n{close}\n\nAvailable tools:\n{blocks}\n\n{guidance}",
        lead_in = TOOLS_LEAD_IN,
        open = TOOL_CALL_OPEN,
        example = WIRE_FORMAT_EXAMPLE,
        close = TOOL_CALL_CLOSE,
        blocks = blocks,
        guidance = TOOLS_GUIDANCE,
    )
}

/// One `Tool Result (ID: ...)` entry per result. A failed result renders as
/// `Error: <error>` in place of its content.
pub fn render_tool_results_context(results: &[ToolResult]) -> String {
    if results.is_empty() {
        return String::new();
    }

    let entries = results
        .iter()
        .map(|r| format!("Tool Result (ID: {}):\n{}", r.tool_call_id, result_text(r)))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{}\n\n{}\n\n{}", RESULTS_LEAD_IN, entries, RESULTS_LEAD_OUT)
}

fn render_tool(tool: &Tool) -> String {
    let schema = serde_json::to_string_pretty(&tool.input_schema).unwrap_or_else(|_| "{}".into());
    format!(
        "Tool: {}\nDescription: {}\nInput Schema: {}",
        tool.name, tool.description, schema
    )
}

fn result_text(result: &ToolResult) -> String {
    match &result.error {
        Some(error) => format!("Error: {}", error),
        None => result.content.clone(),
    }
}
