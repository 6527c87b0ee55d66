use std::sync::Arc;

use super::ToolBridge;
use crate::config::BridgeConfig;
use crate::mcp::ToolNormalizer;
use crate::pipeline::MessagePipeline;
use crate::telemetry::{tracing_sink, LogSink};
use crate::tool_call::ToolCallParser;
use crate::tools::{ToolExecutor, ToolHandler};
use crate::Result;

/// Builder for [`ToolBridge`].
///
/// ```rust
/// use toolcall_bridge::{BridgeConfig, ToolBridge};
///
/// let bridge = ToolBridge::builder()
///     .with_config(BridgeConfig::default())
///     .advertise_registered_tools(true)
///     .build()
///     .unwrap();
/// assert!(bridge.executor().has_tool("calculate"));
/// ```
pub struct ToolBridgeBuilder {
    config: BridgeConfig,
    log: Option<Arc<dyn LogSink>>,
    handlers: Vec<Arc<dyn ToolHandler>>,
    advertise_registered_tools: bool,
}

impl ToolBridgeBuilder {
    pub fn new() -> Self {
        Self {
            config: BridgeConfig::default(),
            log: None,
            handlers: Vec::new(),
            advertise_registered_tools: false,
        }
    }

    pub fn with_config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Sink shared by every component. Defaults to the `tracing` sink.
    pub fn with_log_sink(mut self, log: Arc<dyn LogSink>) -> Self {
        self.log = Some(log);
        self
    }

    /// Register an extra handler after the configured built-ins.
    pub fn with_handler(mut self, handler: Arc<dyn ToolHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Also advertise every registered handler's definition in prompts.
    pub fn advertise_registered_tools(mut self, enabled: bool) -> Self {
        self.advertise_registered_tools = enabled;
        self
    }

    pub fn build(self) -> Result<ToolBridge> {
        self.config.validate()?;
        let log = self.log.unwrap_or_else(tracing_sink);

        let mut executor = ToolExecutor::with_builtins(&self.config.tools, log.clone());
        for handler in self.handlers {
            executor.register(handler);
        }

        Ok(ToolBridge {
            normalizer: ToolNormalizer::new(log.clone()),
            parser: ToolCallParser::new(log.clone()),
            pipeline: MessagePipeline::new(Arc::new(executor)),
            advertise_registered_tools: self.advertise_registered_tools,
            log,
        })
    }
}

impl Default for ToolBridgeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolsConfig;
    use crate::error::Error;
    use crate::tools::ToolError;
    use crate::types::tool::Tool;
    use async_trait::async_trait;
    use serde_json::Value;

    struct Echo;

    #[async_trait]
    impl ToolHandler for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn definition(&self) -> Tool {
            Tool::new("echo", "Echo the arguments back", Default::default())
        }
        async fn call(&self, args: &Value) -> std::result::Result<String, ToolError> {
            Ok(args.to_string())
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = BridgeConfig {
            tools: ToolsConfig {
                builtin: vec!["teleport".into()],
                ..ToolsConfig::default()
            },
            ..BridgeConfig::default()
        };
        let err = ToolBridgeBuilder::new().with_config(config).build().err();
        assert!(matches!(err, Some(Error::Configuration { .. })));
    }

    #[test]
    fn test_custom_handler_registered_after_builtins() {
        let bridge = ToolBridgeBuilder::new()
            .with_handler(Arc::new(Echo))
            .build()
            .unwrap();
        assert_eq!(bridge.executor().names().last().map(String::as_str), Some("echo"));
    }
}
