use anyhow::Result;
use async_trait::async_trait;

use crate::models::message::{AgentMessage, Arguments};
use crate::models::tool::ToolSignature;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Usage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }
}

/// A tool invocation the backend asked for, with its arguments already decoded
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: Arguments,
}

/// One backend reply, normalized out of the vendor wire format
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
    pub usage: Usage,
}

impl Completion {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Completion {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_tool_call<I, N>(mut self, id: I, name: N, arguments: Arguments) -> Self
    where
        I: Into<String>,
        N: Into<String>,
    {
        self.tool_calls.push(ToolCallRequest {
            id: id.into(),
            name: name.into(),
            arguments,
        });
        self
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }
}

/// Base trait for language model backends
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send the whole conversation plus the offered tools and return the next reply
    async fn complete(
        &self,
        model: &str,
        system: &str,
        history: &[AgentMessage],
        tools: &[ToolSignature],
    ) -> Result<Completion>;
}
