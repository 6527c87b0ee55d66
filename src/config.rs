//! Bridge configuration.
//!
//! ```yaml
//! log_filter: "toolcall_bridge=debug"
//! tools:
//!   builtin: [get_weather, search_web, calculate]
//!   weather_unit: fahrenheit
//!   search_max_results: 5
//! ```
//!
//! Every field is optional. [`BridgeConfig::from_env`] loads the file named by
//! `TOOLCALL_BRIDGE_CONFIG` and falls back to defaults when it is unset.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorContext};
use crate::tools::builtin::BUILTIN_TOOLS;
use crate::Result;

/// Environment variable holding the path of a YAML config file.
pub const CONFIG_ENV: &str = "TOOLCALL_BRIDGE_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
    pub tools: ToolsConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            tools: ToolsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Built-in handlers to register.
    pub builtin: Vec<String>,
    pub weather_unit: TemperatureUnit,
    pub search_max_results: usize,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            builtin: BUILTIN_TOOLS.iter().map(|s| s.to_string()).collect(),
            weather_unit: TemperatureUnit::default(),
            search_max_results: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        }
    }
}

impl BridgeConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: BridgeConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("cannot read config file: {}", e),
                ErrorContext::new()
                    .with_details(path.display().to_string())
                    .with_source("config_loader"),
            )
        })?;
        Self::from_yaml_str(&text)
    }

    /// Load from the file named by [`CONFIG_ENV`], or defaults when unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (idx, name) in self.tools.builtin.iter().enumerate() {
            if !BUILTIN_TOOLS.contains(&name.as_str()) {
                return Err(Error::configuration_with_context(
                    format!("unknown built-in tool '{}'", name),
                    ErrorContext::new()
                        .with_field_path(format!("tools.builtin[{}]", idx))
                        .with_details(format!("expected one of {:?}", BUILTIN_TOOLS))
                        .with_source("config_loader"),
                ));
            }
        }
        if self.tools.search_max_results == 0 {
            return Err(Error::configuration_with_context(
                "search_max_results must be at least 1",
                ErrorContext::new()
                    .with_field_path("tools.search_max_results")
                    .with_source("config_loader"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_all_builtins() {
        let config = BridgeConfig::default();
        assert_eq!(config.tools.builtin.len(), 3);
        assert_eq!(config.tools.weather_unit, TemperatureUnit::Celsius);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = BridgeConfig::from_yaml_str("tools:\n  weather_unit: fahrenheit\n").unwrap();
        assert_eq!(config.tools.weather_unit, TemperatureUnit::Fahrenheit);
        assert_eq!(config.tools.search_max_results, 3);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_unknown_builtin_rejected() {
        let err = BridgeConfig::from_yaml_str("tools:\n  builtin: [calculate, teleport]\n")
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("tools.builtin[1]")
        );
    }

    #[test]
    fn test_zero_search_results_rejected() {
        assert!(BridgeConfig::from_yaml_str("tools:\n  search_max_results: 0\n").is_err());
    }

    #[test]
    fn test_malformed_yaml_is_yaml_error() {
        let err = BridgeConfig::from_yaml_str("tools: [unclosed").unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = BridgeConfig::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        let context = err.context().unwrap();
        assert_eq!(context.details.as_deref(), Some("/definitely/not/here.yaml"));
        assert_eq!(context.source.as_deref(), Some("config_loader"));
    }
}
