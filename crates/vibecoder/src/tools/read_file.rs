use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::json;

use super::{optional_u64, report, require_str, resolve, Tool};
use crate::errors::ToolError;
use crate::models::message::Arguments;
use crate::models::tool::ToolSignature;

pub struct ReadFile {
    signature: ToolSignature,
    root: PathBuf,
}

impl ReadFile {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let signature = ToolSignature::new(
            "read_file",
            "Read the contents of a text file. Use start and end to read a range of lines \
            instead of the whole file when it is large.",
            json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "The path to the file to read"
                    },
                    "start": {
                        "type": "integer",
                        "description": "Start reading the file from this line number (inclusive)",
                        "minimum": 0
                    },
                    "end": {
                        "type": "integer",
                        "description": "Stop reading the file at this line number (exclusive)",
                        "minimum": 0
                    }
                },
                "required": ["path"]
            }),
        );
        Self {
            signature,
            root: root.as_ref().to_path_buf(),
        }
    }

    async fn read(&self, args: &Arguments) -> Result<String, ToolError> {
        let path = require_str(args, "path")?;
        let (start, end) = match (optional_u64(args, "start"), optional_u64(args, "end")) {
            (Ok(start), Ok(end)) => (start, end),
            _ => {
                return Err(ToolError::InvalidArgument(
                    "'start' and 'end' must be integers".to_string(),
                ))
            }
        };

        let text = tokio::fs::read_to_string(resolve(&self.root, path))
            .await
            .map_err(|e| ToolError::Io(format!("could not read file '{}': {}", path, e)))?;

        let lines: Vec<&str> = text.split_inclusive('\n').collect();
        let end = end.map_or(lines.len(), |end| (end as usize).min(lines.len()));
        let start = start.map_or(0, |start| start as usize).min(end);
        Ok(lines[start..end].concat())
    }
}

#[async_trait]
impl Tool for ReadFile {
    fn signature(&self) -> &ToolSignature {
        &self.signature
    }

    async fn run(&self, args: &Arguments) -> Result<String, ToolError> {
        report(self.read(args).await)
    }
}
