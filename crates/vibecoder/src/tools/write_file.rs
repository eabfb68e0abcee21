use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;

use super::{optional_bool, report, require_str, resolve, Tool};
use crate::errors::ToolError;
use crate::models::message::Arguments;
use crate::models::tool::ToolSignature;

pub struct WriteFile {
    signature: ToolSignature,
    root: PathBuf,
}

impl WriteFile {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let signature = ToolSignature::new(
            "write_file",
            "Write text to a file, creating it and any missing parent directories. \
            The file is overwritten unless append is set.",
            json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "The path to the file to write"
                    },
                    "content": {
                        "type": "string",
                        "description": "The new contents to write into the file"
                    },
                    "append": {
                        "type": "boolean",
                        "description": "If true, append the content instead of overwriting."
                    }
                },
                "required": ["path", "content"]
            }),
        );
        Self {
            signature,
            root: root.as_ref().to_path_buf(),
        }
    }

    async fn write(&self, args: &Arguments) -> Result<String, ToolError> {
        let path = require_str(args, "path")?;
        // empty content is a valid write
        let content = args
            .get("content")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::MissingArgument("content".to_string()))?;
        let append = optional_bool(args, "append");

        let target = resolve(&self.root, path);
        let failed = |e: std::io::Error| ToolError::Io(format!("could not write file '{}': {}", path, e));

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(failed)?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(&target)
            .await
            .map_err(failed)?;
        file.write_all(content.as_bytes()).await.map_err(failed)?;
        file.flush().await.map_err(failed)?;

        Ok(format!("[Successfully wrote to '{}']", path))
    }
}

#[async_trait]
impl Tool for WriteFile {
    fn signature(&self) -> &ToolSignature {
        &self.signature
    }

    async fn run(&self, args: &Arguments) -> Result<String, ToolError> {
        report(self.write(args).await)
    }
}
