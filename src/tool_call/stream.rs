use super::{ToolCallParser, TOOL_CALL_CLOSE, TOOL_CALL_OPEN};
use crate::types::tool::ToolCall;

/// Output of one [`StreamingToolCallDetector`] step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamChunk {
    /// Text that can no longer be part of a tool call tag.
    pub text: String,
    /// Tool calls completed by this step, in order.
    pub tool_calls: Vec<ToolCall>,
}

impl StreamChunk {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.tool_calls.is_empty()
    }
}

/// Splits a stream of text deltas into plain text and tool calls.
///
/// Text is released as soon as it cannot belong to a `<tool_call>` tag. A
/// possible partial opening tag, or an opened tag still waiting for its
/// closer, is held back. Released text concatenates to the same string
/// `strip_tool_call_tags` produces for the full text.
pub struct StreamingToolCallDetector {
    parser: ToolCallParser,
    buffer: String,
}

impl Default for StreamingToolCallDetector {
    fn default() -> Self {
        Self::new(ToolCallParser::default())
    }
}

impl StreamingToolCallDetector {
    pub fn new(parser: ToolCallParser) -> Self {
        Self {
            parser,
            buffer: String::new(),
        }
    }

    /// True while text is being held back.
    pub fn is_buffering(&self) -> bool {
        !self.buffer.is_empty()
    }

    pub fn push(&mut self, delta: &str) -> StreamChunk {
        self.buffer.push_str(delta);
        let mut chunk = StreamChunk::default();

        loop {
            let Some(open) = self.buffer.find(TOOL_CALL_OPEN) else {
                let keep = partial_open_len(&self.buffer);
                let release = self.buffer.len() - keep;
                chunk.text.extend(self.buffer.drain(..release));
                break;
            };

            chunk.text.push_str(&self.buffer[..open]);
            let body_start = open + TOOL_CALL_OPEN.len();
            match self.buffer[body_start..].find(TOOL_CALL_CLOSE) {
                Some(rel) => {
                    let end = body_start + rel + TOOL_CALL_CLOSE.len();
                    chunk
                        .tool_calls
                        .extend(self.parser.extract(&self.buffer[open..end]));
                    self.buffer.drain(..end);
                }
                None => {
                    self.buffer.drain(..open);
                    break;
                }
            }
        }

        chunk
    }

    /// Flush whatever is still held. An unterminated tag is released as text.
    pub fn finish(self) -> StreamChunk {
        StreamChunk {
            text: self.buffer,
            tool_calls: Vec::new(),
        }
    }
}

// Length of the longest suffix of `buffer` that is a proper prefix of the
// opening tag. The tag is ASCII, so the split point is a char boundary.
fn partial_open_len(buffer: &str) -> usize {
    let max = (TOOL_CALL_OPEN.len() - 1).min(buffer.len());
    (1..=max)
        .rev()
        .find(|&k| buffer.ends_with(&TOOL_CALL_OPEN[..k]))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool_call::{render_tool_call, strip_tool_call_tags};

    fn run(deltas: &[&str]) -> (String, Vec<ToolCall>) {
        let mut detector = StreamingToolCallDetector::default();
        let mut text = String::new();
        let mut calls = Vec::new();
        for d in deltas {
            let chunk = detector.push(d);
            text.push_str(&chunk.text);
            calls.extend(chunk.tool_calls);
        }
        text.push_str(&detector.finish().text);
        (text, calls)
    }

    #[test]
    fn test_plain_text_passes_through_immediately() {
        let mut detector = StreamingToolCallDetector::default();
        let chunk = detector.push("hello world");
        assert_eq!(chunk.text, "hello world");
        assert!(!detector.is_buffering());
    }

    #[test]
    fn test_partial_open_tag_is_held() {
        let mut detector = StreamingToolCallDetector::default();
        assert_eq!(detector.push("before <tool_").text, "before ");
        assert!(detector.is_buffering());
        assert_eq!(detector.push("box> after").text, "<tool_box> after");
    }

    #[test]
    fn test_tag_split_across_every_byte() {
        let call = ToolCall::new("call_9", "calculate", r#"{"expression":"2*3"}"#);
        let full = format!("Thinking…\n{}\nDone ✓", render_tool_call(&call));
        let pieces: Vec<String> = full.chars().map(|c| c.to_string()).collect();
        let refs: Vec<&str> = pieces.iter().map(String::as_str).collect();

        let (text, calls) = run(&refs);
        assert_eq!(calls, vec![call]);
        assert_eq!(text, strip_tool_call_tags(&full));
    }

    #[test]
    fn test_multiple_calls_in_one_delta() {
        let a = ToolCall::new("call_a", "get_weather", r#"{"location":"Oslo"}"#);
        let b = ToolCall::new("call_b", "search_web", r#"{"query":"rust"}"#);
        let full = format!("x{}y{}z", render_tool_call(&a), render_tool_call(&b));
        let (text, calls) = run(&[&full]);
        assert_eq!(text, "xyz");
        assert_eq!(calls, vec![a, b]);
    }

    #[test]
    fn test_unterminated_tag_flushed_on_finish() {
        let (text, calls) = run(&["a <tool_call>{\"id\":", " \"call_1\""]);
        assert!(calls.is_empty());
        assert_eq!(text, "a <tool_call>{\"id\": \"call_1\"");
    }

    #[test]
    fn test_malformed_block_is_dropped() {
        let (text, calls) = run(&["a<tool_call>nope</tool_call>b"]);
        assert!(calls.is_empty());
        assert_eq!(text, "ab");
    }
}
