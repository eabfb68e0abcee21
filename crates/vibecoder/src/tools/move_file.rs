use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::json;

use super::{confined, report, require_str, Tool};
use crate::errors::ToolError;
use crate::models::message::Arguments;
use crate::models::tool::ToolSignature;

pub struct MoveFile {
    signature: ToolSignature,
    root: PathBuf,
}

impl MoveFile {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let signature = ToolSignature::new(
            "move_file",
            "Use this tool to move or rename files within the workspace.",
            json!({
                "type": "object",
                "properties": {
                    "origin": {"type": "string", "description": "The path of the file or directory to be moved."},
                    "destination": {"type": "string", "description": "The target path for the file or directory."}
                },
                "required": ["origin", "destination"]
            }),
        );
        Self {
            signature,
            root: root.as_ref().to_path_buf(),
        }
    }

    async fn rename(&self, args: &Arguments) -> Result<String, ToolError> {
        let origin = confined(require_str(args, "origin")?)?;
        let destination = confined(require_str(args, "destination")?)?;

        match tokio::fs::rename(self.root.join(origin), self.root.join(destination)).await {
            Ok(()) => Ok(format!(
                "Successfully moved from {} to {}.",
                origin, destination
            )),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ToolError::Io(format!(
                "The file or directory '{}' was not found.",
                origin
            ))),
            Err(e) => Err(ToolError::Io(format!("could not move '{}': {}", origin, e))),
        }
    }
}

#[async_trait]
impl Tool for MoveFile {
    fn signature(&self) -> &ToolSignature {
        &self.signature
    }

    async fn run(&self, args: &Arguments) -> Result<String, ToolError> {
        report(self.rename(args).await)
    }
}
