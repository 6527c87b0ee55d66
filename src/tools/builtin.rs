//! Built-in demo handlers: `get_weather`, `search_web`, `calculate`.
//!
//! Weather and search return canned payloads with no side effects. They are
//! placeholders for real integrations registered the same way.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::calculator;
use super::{required_str, ToolError, ToolHandler};
use crate::config::TemperatureUnit;
use crate::types::tool::{InputSchema, Tool};

pub const GET_WEATHER: &str = "get_weather";
pub const SEARCH_WEB: &str = "search_web";
pub const CALCULATE: &str = "calculate";

/// Names of every built-in handler, in registration order.
pub const BUILTIN_TOOLS: [&str; 3] = [GET_WEATHER, SEARCH_WEB, CALCULATE];

const CONDITIONS: [&str; 5] = ["Sunny", "Partly cloudy", "Overcast", "Light rain", "Windy"];

/// Canned weather report for a location.
#[derive(Debug, Clone, Default)]
pub struct WeatherTool {
    unit: TemperatureUnit,
}

impl WeatherTool {
    pub fn new(unit: TemperatureUnit) -> Self {
        Self { unit }
    }
}

#[async_trait]
impl ToolHandler for WeatherTool {
    fn name(&self) -> &str {
        GET_WEATHER
    }

    fn definition(&self) -> Tool {
        Tool::new(
            GET_WEATHER,
            "Get the current weather for a location",
            InputSchema::default()
                .property(
                    "location",
                    json!({"type": "string", "description": "City name, e.g. \"Paris\""}),
                )
                .require("location"),
        )
    }

    async fn call(&self, args: &Value) -> Result<String, ToolError> {
        let location = required_str(args, "location")?;

        // Stable per location so repeated calls agree with each other.
        let seed = location
            .bytes()
            .fold(17u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
        let celsius = (seed % 36) as i64 - 5;
        let temperature = match self.unit {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => celsius * 9 / 5 + 32,
        };

        let report = json!({
            "location": location,
            "temperature": temperature,
            "unit": self.unit.as_str(),
            "condition": CONDITIONS[(seed as usize / 36) % CONDITIONS.len()],
            "humidity": 30 + (seed / 7) % 60,
        });
        Ok(report.to_string())
    }
}

/// Canned web search results.
#[derive(Debug, Clone)]
pub struct SearchTool {
    max_results: usize,
}

impl SearchTool {
    pub fn new(max_results: usize) -> Self {
        Self {
            max_results: max_results.max(1),
        }
    }
}

impl Default for SearchTool {
    fn default() -> Self {
        Self::new(3)
    }
}

#[async_trait]
impl ToolHandler for SearchTool {
    fn name(&self) -> &str {
        SEARCH_WEB
    }

    fn definition(&self) -> Tool {
        Tool::new(
            SEARCH_WEB,
            "Search the web and return the most relevant results",
            InputSchema::default()
                .property(
                    "query",
                    json!({"type": "string", "description": "Search query"}),
                )
                .require("query"),
        )
    }

    async fn call(&self, args: &Value) -> Result<String, ToolError> {
        let query = required_str(args, "query")?;
        let results: Vec<Value> = (1..=self.max_results)
            .map(|rank| {
                json!({
                    "rank": rank,
                    "title": format!("Result {} for \"{}\"", rank, query),
                    "url": format!("https://example.com/search/{}", rank),
                    "snippet": format!("Summary of a page matching \"{}\".", query),
                })
            })
            .collect();
        Ok(json!({ "query": query, "results": results }).to_string())
    }
}

/// Arithmetic over `+ - * / ( )` and decimal literals.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalculatorTool;

#[async_trait]
impl ToolHandler for CalculatorTool {
    fn name(&self) -> &str {
        CALCULATE
    }

    fn definition(&self) -> Tool {
        Tool::new(
            CALCULATE,
            "Evaluate an arithmetic expression using + - * / and parentheses",
            InputSchema::default()
                .property(
                    "expression",
                    json!({"type": "string", "description": "Expression such as \"(2+3)*4\""}),
                )
                .require("expression"),
        )
    }

    async fn call(&self, args: &Value) -> Result<String, ToolError> {
        let expression = required_str(args, "expression")?;
        let value = calculator::evaluate(expression)
            .map_err(|e| ToolError::CalculationFailed(e.to_string()))?;
        Ok(json!({ "expression": expression, "result": number(value) }).to_string())
    }
}

// Integral results print without a trailing ".0".
fn number(value: f64) -> Value {
    const EXACT: f64 = 9_007_199_254_740_992.0; // 2^53
    if value.fract() == 0.0 && value.abs() < EXACT {
        json!(value as i64)
    } else {
        json!(value)
    }
}
