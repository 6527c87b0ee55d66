//! Sentinel-tag tool call parsing.
//!
//! Models without native function calling emit tool invocations in-band:
//!
//! ```text
//! <tool_call>{"id": "call_1", "type": "function", "function": {"name": "calculate", "arguments": "{\"expression\":\"1+1\"}"}}</tool_call>
//! ```
//!
//! [`ToolCallParser`] recovers those blocks from complete text and
//! [`StreamingToolCallDetector`] does the same for text arriving in deltas.

mod stream;

pub use stream::{StreamChunk, StreamingToolCallDetector};

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::telemetry::{tracing_sink, LogSink};
use crate::types::tool::ToolCall;

pub const TOOL_CALL_OPEN: &str = "<tool_call>";
pub const TOOL_CALL_CLOSE: &str = "</tool_call>";

const COMPONENT: &str = "tool_call_parser";

static TOOL_CALL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<tool_call>(.*?)</tool_call>").expect("tool call pattern is valid")
});

/// Fresh tool call id following the `call_<unique>` convention.
pub fn new_call_id() -> String {
    format!("call_{}", uuid::Uuid::new_v4().simple())
}

/// Serialize a call back into its sentinel-tag form.
pub fn render_tool_call(call: &ToolCall) -> String {
    let body = serde_json::to_string(call).unwrap_or_else(|_| "{}".into());
    format!("{}{}{}", TOOL_CALL_OPEN, body, TOOL_CALL_CLOSE)
}

/// True when `text` contains at least one complete tool call tag pair.
pub fn contains_tool_call(text: &str) -> bool {
    TOOL_CALL_PATTERN.is_match(text)
}

/// Remove every tag pair verbatim. Surrounding whitespace is left untouched
/// so that streamed fragments still concatenate correctly.
pub fn strip_tool_call_tags(text: &str) -> String {
    TOOL_CALL_PATTERN.replace_all(text, "").into_owned()
}

/// Extract tool calls with the default `tracing` sink.
pub fn extract_tool_calls(text: &str) -> Vec<ToolCall> {
    ToolCallParser::default().extract(text)
}

/// Extracts and validates tool call blocks from model text.
#[derive(Clone)]
pub struct ToolCallParser {
    log: Arc<dyn LogSink>,
}

impl Default for ToolCallParser {
    fn default() -> Self {
        Self::new(tracing_sink())
    }
}

impl ToolCallParser {
    pub fn new(log: Arc<dyn LogSink>) -> Self {
        Self { log }
    }

    /// All valid tool calls in order of appearance.
    ///
    /// A block that is not JSON, or is JSON without the required fields, is
    /// logged and skipped; later blocks are still returned.
    pub fn extract(&self, text: &str) -> Vec<ToolCall> {
        TOOL_CALL_PATTERN
            .captures_iter(text)
            .filter_map(|caps| {
                let body = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                self.parse_block(body)
            })
            .collect()
    }

    fn parse_block(&self, body: &str) -> Option<ToolCall> {
        let value: Value = match serde_json::from_str(body) {
            Ok(v) => v,
            Err(e) => {
                self.log.warn(
                    COMPONENT,
                    &format!("skipping tool call block with invalid JSON: {}", e),
                );
                return None;
            }
        };

        let call = validate(&value);
        if call.is_none() {
            self.log.warn(
                COMPONENT,
                &format!("skipping structurally invalid tool call: {}", value),
            );
        }
        call
    }
}

fn validate(value: &Value) -> Option<ToolCall> {
    let id = value.get("id")?.as_str()?;
    if value.get("type")?.as_str()? != "function" {
        return None;
    }
    let function = value.get("function")?;
    let name = function.get("name")?.as_str()?;
    let arguments = function.get("arguments")?.as_str()?;
    Some(ToolCall::new(id, name, arguments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{InMemoryLogSink, LogLevel};

    const WEATHER: &str = r#"<tool_call>{"id": "call_1", "type": "function", "function": {"name": "get_weather", "arguments": "{\"location\": \"Paris\"}"}}</tool_call>"#;

    #[test]
    fn test_no_tags_yields_nothing() {
        assert!(extract_tool_calls("just some prose").is_empty());
        assert!(!contains_tool_call("just some prose"));
    }

    #[test]
    fn test_single_well_formed_block() {
        let calls = extract_tool_calls(&format!("Let me check.\n{}", WEATHER));
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(calls[0].name(), "get_weather");
        assert_eq!(calls[0].arguments(), r#"{"location": "Paris"}"#);
    }

    #[test]
    fn test_multiline_body_and_order() {
        let text = format!(
            "<tool_call>\n{}\n</tool_call> and {}",
            r#"{"id": "call_0", "type": "function", "function": {"name": "calculate", "arguments": "{}"}}"#,
            WEATHER
        );
        let ids: Vec<_> = extract_tool_calls(&text).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["call_0", "call_1"]);
    }

    #[test]
    fn test_bad_blocks_are_isolated() {
        let sink = Arc::new(InMemoryLogSink::new());
        let parser = ToolCallParser::new(sink.clone());
        let text = format!(
            "<tool_call>{{not json</tool_call>{}<tool_call>{}</tool_call><tool_call>{}</tool_call>",
            WEATHER,
            r#"{"id": "call_2", "type": "tool", "function": {"name": "x", "arguments": "{}"}}"#,
            r#"{"id": "call_3", "type": "function", "function": {"name": "x", "arguments": {}}}"#,
        );

        let calls = parser.extract(&text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(sink.records_at(LogLevel::Warn).len(), 3);
    }

    #[test]
    fn test_strip_preserves_surrounding_whitespace() {
        let text = format!("a\n{}\nb", WEATHER);
        assert_eq!(strip_tool_call_tags(&text), "a\n\nb");
        assert_eq!(strip_tool_call_tags("  keep  "), "  keep  ");
    }

    #[test]
    fn test_unterminated_tag_is_not_a_call() {
        let text = r#"<tool_call>{"id": "call_1""#;
        assert!(!contains_tool_call(text));
        assert_eq!(strip_tool_call_tags(text), text);
    }

    #[test]
    fn test_render_round_trips_through_extract() {
        let call = ToolCall::new(new_call_id(), "calculate", r#"{"expression":"1+1"}"#);
        assert!(call.id.starts_with("call_"));
        let rendered = render_tool_call(&call);
        assert_eq!(extract_tool_calls(&rendered), vec![call]);
    }
}
