use std::collections::HashSet;

use anyhow::{anyhow, Result};
use base64::Engine;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use super::base::{Completion, ToolCallRequest, Usage};
use crate::errors::AgentError;
use crate::models::message::{AgentMessage, Arguments};
use crate::models::tool::ToolSignature;

/// Longest tool call id a completions-style backend accepts
pub const COMPLETIONS_MAX_ID_LEN: usize = 40;
const REMAPPED_ID_PREFIX: &str = "call_";
const REMAPPED_ID_HASH_LEN: usize = 35;

/// Fit a correlation id under the completions id ceiling.
///
/// Short ids pass through unchanged. Longer ones are replaced by a prefix plus
/// the alphanumeric characters of the base64 encoded sha256 of the id, so the
/// same id always maps to the same replacement.
pub fn completions_tool_call_id(id: &str) -> String {
    if id.len() < COMPLETIONS_MAX_ID_LEN {
        return id.to_string();
    }

    let digest = Sha256::digest(id.as_bytes());
    let encoded = base64::engine::general_purpose::STANDARD.encode(digest);
    let hashed: String = encoded
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(REMAPPED_ID_HASH_LEN)
        .collect();
    format!("{}{}", REMAPPED_ID_PREFIX, hashed)
}

/// Convert the history to completions messages, remapping ids that are too long
pub fn messages_to_completions_spec(history: &[AgentMessage]) -> Vec<Value> {
    history
        .iter()
        .map(|message| {
            message
                .map_tool_call_id(completions_tool_call_id)
                .to_completions_value()
        })
        .collect()
}

/// Convert the history to content-block messages
pub fn messages_to_block_spec(history: &[AgentMessage]) -> Vec<Value> {
    history.iter().map(AgentMessage::to_block_value).collect()
}

fn check_unique(tools: &[ToolSignature]) -> Result<()> {
    let mut names = HashSet::new();
    for tool in tools {
        if !names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }
    }
    Ok(())
}

/// Convert tool signatures to the completions function-schema array
pub fn tools_to_completions_spec(tools: &[ToolSignature]) -> Result<Vec<Value>> {
    check_unique(tools)?;
    Ok(tools.iter().map(ToolSignature::to_function_spec).collect())
}

/// Convert tool signatures to the content-block tool array
pub fn tools_to_block_spec(tools: &[ToolSignature]) -> Result<Vec<Value>> {
    check_unique(tools)?;
    Ok(tools.iter().map(ToolSignature::to_block_spec).collect())
}

fn token_count(usage: &Value, key: &str) -> u32 {
    usage
        .get(key)
        .and_then(Value::as_u64)
        .map(|v| v as u32)
        .unwrap_or(0)
}

fn decode_arguments(id: &str, raw: &Value) -> Result<Arguments, AgentError> {
    let value = match raw {
        Value::String(text) if text.trim().is_empty() => json!({}),
        Value::String(text) => serde_json::from_str::<Value>(text).map_err(|e| {
            AgentError::InvalidResponse(format!(
                "Could not interpret tool use parameters for id {}: {}",
                id, e
            ))
        })?,
        other => other.clone(),
    };

    match value {
        Value::Object(arguments) => Ok(arguments),
        other => Err(AgentError::InvalidResponse(format!(
            "Tool use parameters for id {} are not an object: {}",
            id, other
        ))),
    }
}

/// Normalize a completions response body
pub fn completions_response_to_completion(response: &Value) -> Result<Completion, AgentError> {
    let message = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| AgentError::InvalidResponse("No message in response".to_string()))?;

    let text = message
        .get("content")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(String::from);

    let mut tool_calls = Vec::new();
    if let Some(calls) = message.get("tool_calls").and_then(Value::as_array) {
        for call in calls {
            let id = call.get("id").and_then(Value::as_str).unwrap_or_default();
            let function = call.get("function").ok_or_else(|| {
                AgentError::InvalidResponse(format!("Tool call {} has no function", id))
            })?;
            let name = function
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let arguments = decode_arguments(id, function.get("arguments").unwrap_or(&Value::Null))?;
            tool_calls.push(ToolCallRequest {
                id: id.to_string(),
                name: name.to_string(),
                arguments,
            });
        }
    }

    let usage = response
        .get("usage")
        .map(|usage| {
            Usage::new(
                token_count(usage, "prompt_tokens"),
                token_count(usage, "completion_tokens"),
            )
        })
        .unwrap_or_default();

    Ok(Completion {
        text,
        tool_calls,
        usage,
    })
}

/// Normalize a content-block response body. Text blocks are joined with newlines.
pub fn block_response_to_completion(response: &Value) -> Result<Completion, AgentError> {
    let blocks = response
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| AgentError::InvalidResponse("No content blocks in response".to_string()))?;

    let mut texts = Vec::new();
    let mut tool_calls = Vec::new();
    for block in blocks {
        match block.get("type").and_then(Value::as_str) {
            Some("text") => {
                if let Some(text) = block.get("text").and_then(Value::as_str) {
                    texts.push(text.to_string());
                }
            }
            Some("tool_use") => {
                let id = block.get("id").and_then(Value::as_str).unwrap_or_default();
                let name = block.get("name").and_then(Value::as_str).unwrap_or_default();
                let input = block.get("input").cloned().unwrap_or_else(|| json!({}));
                tool_calls.push(ToolCallRequest {
                    id: id.to_string(),
                    name: name.to_string(),
                    arguments: decode_arguments(id, &input)?,
                });
            }
            _ => {}
        }
    }

    let text = Some(texts.join("\n")).filter(|text| !text.is_empty());
    let usage = response
        .get("usage")
        .map(|usage| {
            Usage::new(
                token_count(usage, "input_tokens"),
                token_count(usage, "output_tokens"),
            )
        })
        .unwrap_or_default();

    Ok(Completion {
        text,
        tool_calls,
        usage,
    })
}
