//! MCP tool normalization: unifies the tool shapes callers send into [`Tool`].
//!
//! Two external schemas are accepted:
//! - MCP: `{name, description, inputSchema}`
//! - OpenAI: `{type: "function", function: {name, description, parameters}}`
//!
//! Each element is classified by an ordered list of structural predicates
//! (MCP first, then OpenAI, then best-effort fallback) and converted by one
//! normalization function. Normalization never fails for the whole batch:
//! an element that cannot be converted becomes the `invalid_tool` placeholder.

use std::sync::Arc;

use serde_json::Value;

use crate::telemetry::{tracing_sink, LogSink};
use crate::types::tool::{InputSchema, Tool};

const COMPONENT: &str = "tool_normalizer";

/// Name used when a fallback extraction finds no tool name.
pub const UNKNOWN_TOOL_NAME: &str = "unknown_tool";
/// Description used when a fallback extraction finds no description.
pub const PLACEHOLDER_DESCRIPTION: &str = "No description provided";
/// Name of the placeholder substituted for unconvertible elements.
pub const INVALID_TOOL_NAME: &str = "invalid_tool";
const INVALID_TOOL_DESCRIPTION: &str = "Invalid tool definition";

/// Detected shape of one tool element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolShape {
    Mcp,
    OpenAi,
    Unknown,
}

/// `name`, `description` and `inputSchema` present with the right types.
pub fn is_mcp_tool(value: &Value) -> bool {
    non_empty_str(value.get("name")).is_some()
        && value.get("description").is_some_and(Value::is_string)
        && value.get("inputSchema").is_some_and(Value::is_object)
}

/// `type == "function"` with a complete nested `function` object.
pub fn is_openai_tool(value: &Value) -> bool {
    let Some(function) = value.get("function") else {
        return false;
    };
    value.get("type").and_then(Value::as_str) == Some("function")
        && non_empty_str(function.get("name")).is_some()
        && function.get("description").is_some_and(Value::is_string)
        && function.get("parameters").is_some_and(Value::is_object)
}

/// Classify a tool element, MCP shape taking priority.
pub fn classify(value: &Value) -> ToolShape {
    if is_mcp_tool(value) {
        ToolShape::Mcp
    } else if is_openai_tool(value) {
        ToolShape::OpenAi
    } else {
        ToolShape::Unknown
    }
}

/// The placeholder that replaces an element that could not be converted.
pub fn invalid_tool() -> Tool {
    Tool::new(
        INVALID_TOOL_NAME,
        INVALID_TOOL_DESCRIPTION,
        InputSchema::default(),
    )
}

/// Converts caller-supplied tool lists into canonical tools.
#[derive(Clone)]
pub struct ToolNormalizer {
    log: Arc<dyn LogSink>,
}

impl Default for ToolNormalizer {
    fn default() -> Self {
        Self::new(tracing_sink())
    }
}

impl ToolNormalizer {
    pub fn new(log: Arc<dyn LogSink>) -> Self {
        Self { log }
    }

    /// Normalize every element, preserving order. No deduplication by name.
    pub fn normalize(&self, tools: &[Value]) -> Vec<Tool> {
        tools
            .iter()
            .enumerate()
            .map(|(idx, value)| match self.normalize_one(value) {
                Ok(tool) => tool,
                Err(reason) => {
                    self.log.warn(
                        COMPONENT,
                        &format!("tool #{} replaced with placeholder: {}", idx, reason),
                    );
                    invalid_tool()
                }
            })
            .collect()
    }

    fn normalize_one(&self, value: &Value) -> Result<Tool, String> {
        match classify(value) {
            ToolShape::Mcp => serde_json::from_value(value.clone()).map_err(|e| e.to_string()),
            ToolShape::OpenAi => {
                let function = &value["function"];
                Ok(Tool {
                    name: str_field(function, "name").unwrap_or_default(),
                    description: str_field(function, "description").unwrap_or_default(),
                    input_schema: parse_schema(&function["parameters"])?,
                })
            }
            ToolShape::Unknown => self.fallback(value),
        }
    }

    fn fallback(&self, value: &Value) -> Result<Tool, String> {
        if !value.is_object() {
            return Err(format!("expected an object, got {}", kind(value)));
        }
        let function = value.get("function").unwrap_or(&Value::Null);

        let name = non_empty_str(value.get("name"))
            .or_else(|| non_empty_str(function.get("name")))
            .unwrap_or(UNKNOWN_TOOL_NAME)
            .to_string();
        let description = value
            .get("description")
            .and_then(Value::as_str)
            .or_else(|| function.get("description").and_then(Value::as_str))
            .unwrap_or(PLACEHOLDER_DESCRIPTION)
            .to_string();
        let input_schema = match value
            .get("inputSchema")
            .filter(|v| v.is_object())
            .or_else(|| function.get("parameters").filter(|v| v.is_object()))
        {
            Some(schema) => parse_schema(schema)?,
            None => InputSchema::default(),
        };

        self.log.warn(
            COMPONENT,
            &format!("unrecognized tool shape, extracted '{}' best-effort", name),
        );
        Ok(Tool {
            name,
            description,
            input_schema,
        })
    }
}

/// Normalize with the default `tracing` sink.
pub fn normalize_tools(tools: &[Value]) -> Vec<Tool> {
    ToolNormalizer::default().normalize(tools)
}

fn parse_schema(value: &Value) -> Result<InputSchema, String> {
    serde_json::from_value(value.clone()).map_err(|e| format!("invalid input schema: {}", e))
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(String::from)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{InMemoryLogSink, LogLevel};
    use serde_json::json;

    fn weather_tool() -> Tool {
        Tool::new(
            "get_weather",
            "Get the weather",
            InputSchema::default()
                .property("location", json!({"type": "string"}))
                .require("location"),
        )
    }

    #[test]
    fn test_canonical_tool_is_noop() {
        let tool = weather_tool();
        let value = serde_json::to_value(&tool).unwrap();
        assert!(is_mcp_tool(&value));
        assert_eq!(normalize_tools(&[value]), vec![tool]);
    }

    #[test]
    fn test_openai_tool_conversion() {
        let params = json!({
            "type": "object",
            "properties": {"query": {"type": "string"}},
            "required": ["query"]
        });
        let openai = json!({
            "type": "function",
            "function": {"name": "search_web", "description": "Search", "parameters": params}
        });
        assert_eq!(classify(&openai), ToolShape::OpenAi);

        let tools = normalize_tools(&[openai]);
        assert_eq!(tools[0].name, "search_web");
        assert_eq!(
            serde_json::to_value(&tools[0].input_schema).unwrap(),
            params
        );
    }

    #[test]
    fn test_openai_parameters_without_properties_unchanged() {
        let params = json!({"type": "object"});
        let openai = json!({
            "type": "function",
            "function": {"name": "ping", "description": "No arguments", "parameters": params}
        });
        let tools = normalize_tools(&[openai]);
        assert_eq!(
            serde_json::to_value(&tools[0].input_schema).unwrap(),
            params
        );
    }

    #[test]
    fn test_to_openai_then_normalize_restores_tool() {
        let tool = weather_tool();
        let openai = serde_json::to_value(tool.to_openai()).unwrap();
        assert_eq!(normalize_tools(&[openai]), vec![tool]);
    }

    #[test]
    fn test_fallback_fills_missing_fields() {
        let sink = Arc::new(InMemoryLogSink::new());
        let normalizer = ToolNormalizer::new(sink.clone());

        let tools = normalizer.normalize(&[
            json!({"name": "partial"}),
            json!({"function": {"description": "only a description"}}),
        ]);

        assert_eq!(tools[0].name, "partial");
        assert_eq!(tools[0].description, PLACEHOLDER_DESCRIPTION);
        assert_eq!(tools[0].input_schema.properties, Some(Default::default()));
        assert_eq!(tools[1].name, UNKNOWN_TOOL_NAME);
        assert_eq!(tools[1].description, "only a description");
        assert_eq!(sink.records_at(LogLevel::Warn).len(), 2);
    }

    #[test]
    fn test_unconvertible_elements_become_invalid_tool() {
        let good = serde_json::to_value(weather_tool()).unwrap();
        let tools = normalize_tools(&[
            json!(42),
            good,
            json!({"name": "broken", "inputSchema": {"properties": "not a map"}}),
        ]);
        assert_eq!(tools.len(), 3);
        assert_eq!(tools[0], invalid_tool());
        assert_eq!(tools[1].name, "get_weather");
        assert_eq!(tools[2].name, INVALID_TOOL_NAME);
    }

    #[test]
    fn test_order_preserved_without_dedup() {
        let value = serde_json::to_value(weather_tool()).unwrap();
        let tools = normalize_tools(&[value.clone(), value]);
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0], tools[1]);
    }

    #[test]
    fn test_mcp_shape_wins_over_openai() {
        let both = json!({
            "name": "a",
            "description": "mcp",
            "inputSchema": {"type": "object", "properties": {}},
            "type": "function",
            "function": {"name": "b", "description": "openai", "parameters": {"type": "object"}}
        });
        assert_eq!(classify(&both), ToolShape::Mcp);
        assert_eq!(normalize_tools(&[both])[0].name, "a");
    }
}
