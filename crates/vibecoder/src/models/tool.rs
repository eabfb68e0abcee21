use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Describes a tool to the backend: its name, what it does and the JSON schema of its arguments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSignature {
    /// The name of the tool
    pub name: String,
    /// A description of what the tool does
    pub description: String,
    /// JSON schema of the parameters, always an object schema
    pub parameters: Value,
}

impl ToolSignature {
    /// Create a new signature with the given name, description and parameter schema
    pub fn new<N, D>(name: N, description: D, parameters: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        ToolSignature {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// The flat function-schema shape used by completions-style backends
    pub fn to_function_spec(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }

    /// The renamed shape used by content-block backends
    pub fn to_block_spec(&self) -> Value {
        let properties = self
            .parameters
            .get("properties")
            .cloned()
            .unwrap_or_else(|| json!({}));
        let required = self
            .parameters
            .get("required")
            .cloned()
            .unwrap_or_else(|| json!([]));

        json!({
            "name": self.name,
            "description": self.description,
            "input_schema": {
                "type": "object",
                "properties": properties,
                "required": required,
            }
        })
    }

    /// Human readable form used when listing tools in a system prompt,
    /// e.g. `read_file(path: string, start: integer = None)`
    pub fn display_signature(&self) -> String {
        let required: Vec<&str> = self
            .parameters
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let params: Vec<String> = self
            .parameters
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| {
                properties
                    .iter()
                    .map(|(name, info)| {
                        let kind = info.get("type").and_then(Value::as_str).unwrap_or("str");
                        if required.contains(&name.as_str()) {
                            format!("{}: {}", name, kind)
                        } else {
                            format!("{}: {} = None", name, kind)
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        format!("{}({})", self.name, params.join(", "))
    }
}
