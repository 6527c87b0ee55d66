//! # Tools Module
//!
//! Executes validated tool calls against a registry of named handlers.
//!
//! [`ToolExecutor::execute`] never fails: every failure mode, from malformed
//! JSON arguments to a panicking handler, is encoded in
//! [`ToolResult::error`].
//!
//! | Failure | `error` text |
//! |---------|--------------|
//! | arguments are not JSON | `Invalid JSON arguments: <raw>` |
//! | no handler registered | `Unknown tool: <name>` |
//! | argument absent, `null` or `""` | `Missing required parameter: <field>` |
//! | argument present but not a string (`0`, `false`, ...) | `Invalid parameter <field>: expected a string, got <json>` |
//! | calculator refusal | `Calculation failed: <reason>` |
//! | anything else | `Tool execution failed: <message>` |

pub mod builtin;
pub mod calculator;

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;

use crate::config::ToolsConfig;
use crate::telemetry::{tracing_sink, LogSink};
use crate::types::tool::{Tool, ToolCall, ToolResult};
use builtin::{CalculatorTool, SearchTool, WeatherTool, CALCULATE, GET_WEATHER, SEARCH_WEB};

const COMPONENT: &str = "tool_executor";

/// Handler-level failure, folded into `ToolResult::error` by the executor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Calculation failed: {0}")]
    CalculationFailed(String),

    #[error("Tool execution failed: {0}")]
    Internal(String),
}

/// A named tool implementation.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn name(&self) -> &str;

    /// Canonical definition advertised to the model.
    fn definition(&self) -> Tool;

    /// Run the tool on already-parsed arguments.
    async fn call(&self, args: &Value) -> Result<String, ToolError>;
}

/// Fetch a required string argument.
pub fn required_str<'a>(args: &'a Value, field: &str) -> Result<&'a str, ToolError> {
    match args.get(field) {
        None | Some(Value::Null) => Err(ToolError::MissingParameter(field.to_string())),
        Some(Value::String(s)) if s.is_empty() => {
            Err(ToolError::MissingParameter(field.to_string()))
        }
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(ToolError::InvalidParameter {
            name: field.to_string(),
            reason: format!("expected a string, got {}", other),
        }),
    }
}

/// Registry of tool handlers keyed by name.
#[derive(Clone)]
pub struct ToolExecutor {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
    order: Vec<String>,
    log: Arc<dyn LogSink>,
}

impl Default for ToolExecutor {
    fn default() -> Self {
        Self::with_builtins(&ToolsConfig::default(), tracing_sink())
    }
}

impl ToolExecutor {
    /// An executor with no handlers.
    pub fn new(log: Arc<dyn LogSink>) -> Self {
        Self {
            handlers: HashMap::new(),
            order: Vec::new(),
            log,
        }
    }

    /// An executor with the built-ins enabled by `config`.
    ///
    /// Names are expected to be validated already (see
    /// [`BridgeConfig::validate`](crate::config::BridgeConfig::validate));
    /// unknown ones are skipped with a warning.
    pub fn with_builtins(config: &ToolsConfig, log: Arc<dyn LogSink>) -> Self {
        let mut executor = Self::new(log);
        for name in &config.builtin {
            let handler: Arc<dyn ToolHandler> = match name.as_str() {
                GET_WEATHER => Arc::new(WeatherTool::new(config.weather_unit)),
                SEARCH_WEB => Arc::new(SearchTool::new(config.search_max_results)),
                CALCULATE => Arc::new(CalculatorTool),
                other => {
                    executor
                        .log
                        .warn(COMPONENT, &format!("skipping unknown built-in tool '{}'", other));
                    continue;
                }
            };
            executor.register(handler);
        }
        executor
    }

    /// Register a handler. A handler with the same name is replaced in place.
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        let name = handler.name().to_string();
        if self.handlers.insert(name.clone(), handler).is_none() {
            self.order.push(name);
        }
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered tool names in registration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Definitions of every registered handler, in registration order.
    pub fn definitions(&self) -> Vec<Tool> {
        self.order
            .iter()
            .filter_map(|name| self.handlers.get(name))
            .map(|h| h.definition())
            .collect()
    }

    /// Execute one call. Never fails; see the module docs for error texts.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        let result = self.dispatch(call).await;
        match &result.error {
            Some(error) => self.log.error(
                COMPONENT,
                &format!("tool call {} ({}) failed: {}", call.id, call.name(), error),
            ),
            None => self.log.debug(
                COMPONENT,
                &format!("tool call {} ({}) succeeded", call.id, call.name()),
            ),
        }
        result
    }

    async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        let args: Value = match serde_json::from_str(call.arguments()) {
            Ok(v) => v,
            Err(_) => {
                return ToolResult::failure(
                    &call.id,
                    format!("Invalid JSON arguments: {}", call.arguments()),
                )
            }
        };

        let Some(handler) = self.handlers.get(call.name()) else {
            return ToolResult::failure(&call.id, format!("Unknown tool: {}", call.name()));
        };

        self.log
            .debug(COMPONENT, &format!("dispatching {} to {}", call.id, call.name()));
        match AssertUnwindSafe(handler.call(&args)).catch_unwind().await {
            Ok(Ok(content)) => ToolResult::success(&call.id, content),
            Ok(Err(e)) => ToolResult::failure(&call.id, e.to_string()),
            Err(panic) => ToolResult::failure(
                &call.id,
                ToolError::Internal(panic_message(panic.as_ref())).to_string(),
            ),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Unknown error".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{InMemoryLogSink, LogLevel};
    use serde_json::json;

    struct Exploding;

    #[async_trait]
    impl ToolHandler for Exploding {
        fn name(&self) -> &str {
            "explode"
        }
        fn definition(&self) -> Tool {
            Tool::new("explode", "Always panics", Default::default())
        }
        async fn call(&self, _args: &Value) -> Result<String, ToolError> {
            panic!("kaboom")
        }
    }

    struct Failing;

    #[async_trait]
    impl ToolHandler for Failing {
        fn name(&self) -> &str {
            "fail"
        }
        fn definition(&self) -> Tool {
            Tool::new("fail", "Always fails", Default::default())
        }
        async fn call(&self, _args: &Value) -> Result<String, ToolError> {
            Err(ToolError::Internal("backend unavailable".into()))
        }
    }

    fn call(name: &str, args: &str) -> ToolCall {
        ToolCall::new("call_t", name, args)
    }

    #[tokio::test]
    async fn test_invalid_json_arguments() {
        let result = ToolExecutor::default().execute(&call("calculate", "{oops")).await;
        assert_eq!(result.error.as_deref(), Some("Invalid JSON arguments: {oops"));
        assert_eq!(result.tool_call_id, "call_t");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let result = ToolExecutor::default().execute(&call("teleport", "{}")).await;
        assert_eq!(result.error.as_deref(), Some("Unknown tool: teleport"));
    }

    #[tokio::test]
    async fn test_missing_parameter_contract() {
        let result = ToolExecutor::default().execute(&call("get_weather", "{}")).await;
        assert_eq!(
            result.error.as_deref(),
            Some("Missing required parameter: location")
        );
    }

    #[tokio::test]
    async fn test_falsy_non_string_argument_is_invalid_not_missing() {
        let executor = ToolExecutor::default();
        let zero = executor.execute(&call("get_weather", r#"{"location":0}"#)).await;
        assert_eq!(
            zero.error.as_deref(),
            Some("Invalid parameter location: expected a string, got 0")
        );
        let no = executor.execute(&call("search_web", r#"{"query":false}"#)).await;
        assert_eq!(
            no.error.as_deref(),
            Some("Invalid parameter query: expected a string, got false")
        );
        let empty = executor.execute(&call("calculate", r#"{"expression":""}"#)).await;
        assert_eq!(
            empty.error.as_deref(),
            Some("Missing required parameter: expression")
        );
    }

    #[tokio::test]
    async fn test_calculator_safety_and_correctness() {
        let executor = ToolExecutor::default();

        let unsafe_result = executor
            .execute(&call(
                "calculate",
                r#"{"expression":"2+2; process.exit(1)"}"#,
            ))
            .await;
        assert!(unsafe_result.is_error());
        assert!(unsafe_result.content.is_empty());
        assert!(unsafe_result
            .error
            .unwrap()
            .starts_with("Calculation failed:"));

        let ok = executor
            .execute(&call("calculate", r#"{"expression":"(2+3)*4"}"#))
            .await;
        assert!(!ok.is_error());
        let parsed: Value = serde_json::from_str(&ok.content).unwrap();
        assert_eq!(parsed["result"], json!(20));
    }

    #[tokio::test]
    async fn test_panicking_handler_is_contained() {
        let sink = Arc::new(InMemoryLogSink::new());
        let mut executor = ToolExecutor::new(sink.clone());
        executor.register(Arc::new(Exploding));

        let result = executor.execute(&call("explode", "{}")).await;
        assert_eq!(result.error.as_deref(), Some("Tool execution failed: kaboom"));
        assert_eq!(sink.records_at(LogLevel::Error).len(), 1);
    }

    #[tokio::test]
    async fn test_internal_error_prefixed() {
        let mut executor = ToolExecutor::new(crate::telemetry::noop_sink());
        executor.register(Arc::new(Failing));
        let result = executor.execute(&call("fail", "{}")).await;
        assert_eq!(
            result.error.as_deref(),
            Some("Tool execution failed: backend unavailable")
        );
    }

    #[test]
    fn test_builtins_follow_config() {
        let config = ToolsConfig {
            builtin: vec!["calculate".into(), "get_weather".into()],
            ..ToolsConfig::default()
        };
        let executor = ToolExecutor::with_builtins(&config, crate::telemetry::noop_sink());
        assert_eq!(executor.names(), &["calculate".to_string(), "get_weather".to_string()]);
        assert!(!executor.has_tool("search_web"));
        let names: Vec<_> = executor.definitions().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["calculate", "get_weather"]);
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut executor = ToolExecutor::default();
        executor.register(Arc::new(SearchTool::new(10)));
        assert_eq!(executor.names().len(), 3);
        assert_eq!(executor.names()[1], "search_web");
    }
}
