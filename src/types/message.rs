//! Chat message format shared by the request and response paths

use serde::{Deserialize, Serialize};

use super::tool::ToolCall;

/// A single chat message in OpenAI wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    #[serde(default)]
    pub content: MessageContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Only meaningful on `role = tool`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self::with_content(MessageRole::System, MessageContent::Text(text.into()))
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::with_content(MessageRole::User, MessageContent::Text(text.into()))
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::with_content(MessageRole::Assistant, MessageContent::Text(text.into()))
    }

    /// Assistant turn that requests one or more tool invocations.
    pub fn assistant_with_tool_calls(text: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::Text(text.into()),
            tool_calls: if calls.is_empty() { None } else { Some(calls) },
            tool_call_id: None,
        }
    }

    /// Tool-role message answering the call identified by `tool_call_id`.
    pub fn tool(tool_call_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: MessageContent::Text(text.into()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    pub fn with_content(role: MessageRole, content: MessageContent) -> Self {
        Self {
            role,
            content,
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// True when the message carries a non-empty `tool_calls` array.
    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls.as_ref().is_some_and(|calls| !calls.is_empty())
    }

    /// Text projection of the content (see [`MessageContent::as_text`]).
    pub fn text(&self) -> String {
        self.content.as_text()
    }
}

/// Message role. Roles this crate does not know deserialize to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
    #[serde(other)]
    Other,
}

/// Message content: a plain string, an array of parts, or anything else the
/// caller sent (null, numbers, objects), which projects to empty text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
    Opaque(serde_json::Value),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Opaque(serde_json::Value::Null)
    }
}

impl MessageContent {
    pub fn text(text: impl Into<String>) -> Self {
        MessageContent::Text(text.into())
    }

    pub fn parts(parts: Vec<ContentPart>) -> Self {
        MessageContent::Parts(parts)
    }

    /// Project the content to prompt text.
    ///
    /// Strings pass through unchanged. Part arrays keep only `type == "text"`
    /// parts, joined with `\n`. Anything else is the empty string.
    pub fn as_text(&self) -> String {
        match self {
            MessageContent::Text(s) => s.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(ContentPart::as_text)
                .collect::<Vec<_>>()
                .join("\n"),
            MessageContent::Opaque(_) => String::new(),
        }
    }
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        MessageContent::Text(s)
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        MessageContent::Text(s.to_string())
    }
}

/// One element of a parted content array.
///
/// Kept as an open struct so unknown part kinds (images, audio, files)
/// round-trip untouched; only text parts contribute to prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type", default)]
    pub part_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            part_type: "text".to_string(),
            text: Some(text.into()),
            extra: serde_json::Map::new(),
        }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        let mut extra = serde_json::Map::new();
        extra.insert(
            "image_url".to_string(),
            serde_json::json!({ "url": url.into() }),
        );
        Self {
            part_type: "image_url".to_string(),
            text: None,
            extra,
        }
    }

    pub fn is_text(&self) -> bool {
        self.part_type == "text"
    }

    fn as_text(&self) -> Option<&str> {
        if self.is_text() {
            self.text.as_deref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_content_projection() {
        let msg = Message::user("hello");
        assert_eq!(msg.text(), "hello");
    }

    #[test]
    fn test_parts_projection_drops_non_text() {
        let msg: Message = serde_json::from_value(json!({
            "role": "user",
            "content": [
                {"type": "text", "text": "look at"},
                {"type": "image_url", "image_url": {"url": "https://x/y.png"}},
                {"type": "text", "text": "this"}
            ]
        }))
        .unwrap();
        assert!(matches!(msg.content, MessageContent::Parts(_)));
        assert_eq!(msg.text(), "look at\nthis");
    }

    #[test]
    fn test_absent_and_null_content_project_to_empty() {
        let absent: Message = serde_json::from_value(json!({"role": "assistant"})).unwrap();
        let null: Message =
            serde_json::from_value(json!({"role": "assistant", "content": null})).unwrap();
        let number: Message =
            serde_json::from_value(json!({"role": "assistant", "content": 42})).unwrap();
        assert_eq!(absent.text(), "");
        assert_eq!(null.text(), "");
        assert_eq!(number.text(), "");
    }

    #[test]
    fn test_unknown_role_maps_to_other() {
        let msg: Message =
            serde_json::from_value(json!({"role": "developer", "content": "x"})).unwrap();
        assert_eq!(msg.role, MessageRole::Other);
    }

    #[test]
    fn test_has_tool_calls_requires_non_empty() {
        let mut msg = Message::assistant("");
        assert!(!msg.has_tool_calls());
        msg.tool_calls = Some(vec![]);
        assert!(!msg.has_tool_calls());
        msg.tool_calls = Some(vec![ToolCall::new("call_1", "calculate", "{}")]);
        assert!(msg.has_tool_calls());
    }

    #[test]
    fn test_unknown_part_round_trips() {
        let raw = json!({"type": "input_audio", "input_audio": {"data": "AAA", "format": "wav"}});
        let part: ContentPart = serde_json::from_value(raw.clone()).unwrap();
        assert!(!part.is_text());
        assert_eq!(serde_json::to_value(&part).unwrap(), raw);
    }
}
