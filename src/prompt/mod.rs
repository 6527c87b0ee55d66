//! # Prompt Converter
//!
//! Serializes a role-tagged conversation into the single linear prompt the
//! upstream model consumes.
//!
//! Rendering runs in three stages:
//!
//! 1. **Projection**: each message becomes text. Tool messages render as
//!    `Tool Result (<id>): <content>`; messages with tool calls get one
//!    `Tool Call: <name>(<arguments>)` line per call.
//! 2. **Merge**: adjacent blocks with the same role are joined by `\n\n`.
//! 3. **Wrap**: each block is wrapped in the sentinel tokens for its role and
//!    the blocks are concatenated. Markdown images are stripped last.
//!
//! | role | rendering |
//! |------|-----------|
//! | assistant | `<｜Assistant｜>text<｜end of sentence｜>` |
//! | user, system | `<｜User｜>text` (bare when first) |
//! | tool | `<｜Tool｜>text<｜end of tool｜>` |
//! | other | `text` |

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::message::{Message, MessageRole};

// Bit-exact tokens the upstream model was trained on.
pub const ASSISTANT_START: &str = "<｜Assistant｜>";
pub const ASSISTANT_END: &str = "<｜end of sentence｜>";
pub const USER_START: &str = "<｜User｜>";
pub const TOOL_START: &str = "<｜Tool｜>";
pub const TOOL_END: &str = "<｜end of tool｜>";

static MARKDOWN_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[.*?\]\(.*?\)").expect("markdown image pattern is valid"));

/// A merged run of same-role text, before sentinel wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBlock {
    pub role: MessageRole,
    pub text: String,
}

/// Stage 1: text of a single message.
pub fn project(message: &Message) -> String {
    if message.role == MessageRole::Tool {
        return format!(
            "Tool Result ({}): {}",
            message.tool_call_id.as_deref().unwrap_or_default(),
            message.text()
        );
    }

    let content = message.text();
    let calls = match &message.tool_calls {
        Some(calls) if !calls.is_empty() => calls,
        _ => return content,
    };

    let call_lines = calls
        .iter()
        .map(|c| format!("Tool Call: {}({})", c.name(), c.arguments()))
        .collect::<Vec<_>>()
        .join("\n");
    if content.is_empty() {
        call_lines
    } else {
        format!("{}\n{}", content, call_lines)
    }
}

/// Stages 1 and 2: project every message and merge adjacent same-role blocks.
pub fn merge_blocks(messages: &[Message]) -> Vec<PromptBlock> {
    let mut blocks: Vec<PromptBlock> = Vec::new();
    for message in messages {
        let text = project(message);
        match blocks.last_mut() {
            Some(last) if last.role == message.role => {
                last.text.push_str("\n\n");
                last.text.push_str(&text);
            }
            _ => blocks.push(PromptBlock {
                role: message.role,
                text,
            }),
        }
    }
    blocks
}

/// Render the whole conversation. Empty input renders as the empty string.
pub fn to_prompt(messages: &[Message]) -> String {
    let rendered: String = merge_blocks(messages)
        .iter()
        .enumerate()
        .map(|(idx, block)| wrap(idx, block))
        .collect();
    strip_markdown_images(&rendered)
}

/// Remove every `![alt](url)` token.
pub fn strip_markdown_images(text: &str) -> String {
    MARKDOWN_IMAGE.replace_all(text, "").into_owned()
}

fn wrap(idx: usize, block: &PromptBlock) -> String {
    match block.role {
        MessageRole::Assistant => format!("{}{}{}", ASSISTANT_START, block.text, ASSISTANT_END),
        MessageRole::User | MessageRole::System if idx > 0 => {
            format!("{}{}", USER_START, block.text)
        }
        MessageRole::Tool => format!("{}{}{}", TOOL_START, block.text, TOOL_END),
        _ => block.text.clone(),
    }
}
