use std::fmt;

use serde_json::{json, Map, Value};

/// Tool call arguments, keyed by parameter name in the order the backend sent them
pub type Arguments = Map<String, Value>;

const MAX_ARGUMENTS_DISPLAY: usize = 200;
const MAX_RESULT_DISPLAY: usize = 100;

/// The variant specific part of an [`AgentMessage`]
#[derive(Debug, Clone, PartialEq)]
pub enum MessageKind {
    /// Literal user text
    User,
    /// Natural language produced by the model
    Response,
    /// The model asking for a tool to be run
    ToolUse {
        tool_name: String,
        tool_call_id: String,
        arguments: Arguments,
    },
    /// The output of a tool, answering the [`MessageKind::ToolUse`] with the same id
    ToolResult {
        tool_name: String,
        tool_call_id: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
/// One entry of a conversation, either sent to or received from a backend
pub struct AgentMessage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub content: String,
    pub kind: MessageKind,
}

impl AgentMessage {
    fn new(kind: MessageKind, content: String) -> Self {
        AgentMessage {
            input_tokens: 0,
            output_tokens: 0,
            content,
            kind,
        }
    }

    /// Create a message carrying the user's text
    pub fn user<S: Into<String>>(text: S) -> Self {
        Self::new(MessageKind::User, text.into())
    }

    /// Create a natural language reply from the model
    pub fn response<S: Into<String>>(text: S) -> Self {
        Self::new(MessageKind::Response, text.into())
    }

    /// Create a tool request
    pub fn tool_use<N, I>(tool_name: N, tool_call_id: I, arguments: Arguments) -> Self
    where
        N: Into<String>,
        I: Into<String>,
    {
        Self::new(
            MessageKind::ToolUse {
                tool_name: tool_name.into(),
                tool_call_id: tool_call_id.into(),
                arguments,
            },
            String::new(),
        )
    }

    /// Create a tool result answering the request with `tool_call_id`
    pub fn tool_result<N, I, C>(tool_name: N, tool_call_id: I, content: C) -> Self
    where
        N: Into<String>,
        I: Into<String>,
        C: Into<String>,
    {
        Self::new(
            MessageKind::ToolResult {
                tool_name: tool_name.into(),
                tool_call_id: tool_call_id.into(),
            },
            content.into(),
        )
    }

    /// Attach the token usage of the backend round trip that produced this message
    pub fn with_usage(mut self, input_tokens: u32, output_tokens: u32) -> Self {
        self.input_tokens = input_tokens;
        self.output_tokens = output_tokens;
        self
    }

    /// True for model generated natural language
    pub fn is_text(&self) -> bool {
        matches!(self.kind, MessageKind::Response)
    }

    pub fn text(&self) -> Option<&str> {
        self.is_text().then_some(self.content.as_str())
    }

    pub fn tool_name(&self) -> Option<&str> {
        match &self.kind {
            MessageKind::ToolUse { tool_name, .. } | MessageKind::ToolResult { tool_name, .. } => {
                Some(tool_name)
            }
            _ => None,
        }
    }

    pub fn tool_call_id(&self) -> Option<&str> {
        match &self.kind {
            MessageKind::ToolUse { tool_call_id, .. }
            | MessageKind::ToolResult { tool_call_id, .. } => Some(tool_call_id),
            _ => None,
        }
    }

    pub fn arguments(&self) -> Option<&Arguments> {
        match &self.kind {
            MessageKind::ToolUse { arguments, .. } => Some(arguments),
            _ => None,
        }
    }

    /// A copy of this message with its correlation id rewritten, if it has one
    pub fn map_tool_call_id<F>(&self, remap: F) -> AgentMessage
    where
        F: Fn(&str) -> String,
    {
        let mut message = self.clone();
        match &mut message.kind {
            MessageKind::ToolUse { tool_call_id, .. }
            | MessageKind::ToolResult { tool_call_id, .. } => {
                *tool_call_id = remap(tool_call_id);
            }
            _ => {}
        }
        message
    }

    /// Wire shape for completions-style backends: tool requests are a top level
    /// `tool_calls` array and tool results use the `tool` role
    pub fn to_completions_value(&self) -> Value {
        match &self.kind {
            MessageKind::User => json!({"role": "user", "content": self.content}),
            MessageKind::Response => json!({"role": "assistant", "content": self.content}),
            MessageKind::ToolUse {
                tool_name,
                tool_call_id,
                arguments,
            } => json!({
                "role": "assistant",
                "tool_calls": [{
                    "id": tool_call_id,
                    "type": "function",
                    "function": {
                        "name": tool_name,
                        "arguments": Value::Object(arguments.clone()).to_string(),
                    }
                }]
            }),
            MessageKind::ToolResult { tool_call_id, .. } => json!({
                "role": "tool",
                "tool_call_id": tool_call_id,
                "content": self.content,
            }),
        }
    }

    /// Wire shape for content-block backends: tool requests and results are typed
    /// blocks inside the message content, results travel as a user message
    pub fn to_block_value(&self) -> Value {
        match &self.kind {
            MessageKind::User | MessageKind::Response => self.to_completions_value(),
            MessageKind::ToolUse {
                tool_name,
                tool_call_id,
                arguments,
            } => json!({
                "role": "assistant",
                "content": [{
                    "type": "tool_use",
                    "id": tool_call_id,
                    "name": tool_name,
                    "input": arguments,
                }]
            }),
            MessageKind::ToolResult { tool_call_id, .. } => json!({
                "role": "user",
                "content": [{
                    "type": "tool_result",
                    "tool_use_id": tool_call_id,
                    "content": self.content,
                }]
            }),
        }
    }

    /// One line description used when rendering a transcript
    pub fn summary(&self) -> String {
        match &self.kind {
            MessageKind::User | MessageKind::Response => self.content.clone(),
            MessageKind::ToolUse {
                tool_name,
                arguments,
                ..
            } => {
                let args = Value::Object(arguments.clone()).to_string();
                format!("{}({})", tool_name, truncate(&args, MAX_ARGUMENTS_DISPLAY))
            }
            MessageKind::ToolResult { .. } => {
                let cleaned = self.content.trim().replace('\n', "\\n");
                truncate(&cleaned, MAX_RESULT_DISPLAY)
            }
        }
    }
}

impl fmt::Display for AgentMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
