use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::json;
use tokio::process::Command;

use super::{output_text, report, require_str, string_list, Tool};
use crate::errors::ToolError;
use crate::models::message::Arguments;
use crate::models::tool::ToolSignature;

const SUPPORTED_COMMANDS: [&str; 6] = ["status", "log", "diff", "show", "grep", "checkout"];

pub struct GitTool {
    signature: ToolSignature,
    root: PathBuf,
}

impl GitTool {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let signature = ToolSignature::new(
            "git_tool",
            "Run a read-mostly git command in the repository.",
            json!({
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "description": format!(
                            "The git command to execute. Available commands: {}.",
                            SUPPORTED_COMMANDS.join(", ")
                        )
                    },
                    "options": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Options to pass to the git command (e.g., ['--since=2.weeks'])."
                    },
                    "paths": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "File paths or patterns the command should consider."
                    }
                },
                "required": ["command"]
            }),
        );
        Self {
            signature,
            root: root.as_ref().to_path_buf(),
        }
    }

    async fn git(&self, args: &Arguments) -> Result<String, ToolError> {
        let command = require_str(args, "command")?;
        if !SUPPORTED_COMMANDS.contains(&command) {
            return Err(ToolError::InvalidArgument(format!(
                "Attempted to use unsupported git command '{}'. Only [{}] are supported",
                command,
                SUPPORTED_COMMANDS.join(", ")
            )));
        }
        let options = string_list(args, "options")?;
        let paths = string_list(args, "paths")?;

        let output = Command::new("git")
            .current_dir(&self.root)
            .arg(command)
            .args(&options)
            .args(&paths)
            .output()
            .await
            .map_err(|e| ToolError::Io(format!("could not run git: {}", e)))?;

        if output.status.success() {
            Ok(output_text(&output.stdout))
        } else {
            Err(ToolError::Io(output_text(&output.stderr)))
        }
    }
}

#[async_trait]
impl Tool for GitTool {
    fn signature(&self) -> &ToolSignature {
        &self.signature
    }

    async fn run(&self, args: &Arguments) -> Result<String, ToolError> {
        report(self.git(args).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::TempDir;

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_unsupported_command() {
        let dir = TempDir::new().unwrap();
        let tool = GitTool::new(dir.path());

        let output = tool
            .run(&args(json!({"command": "push", "options": ["--force"]})))
            .await
            .unwrap();
        assert_eq!(
            output,
            "[Error: Attempted to use unsupported git command 'push'. Only [status, log, diff, show, grep, checkout] are supported]"
        );
    }

    #[tokio::test]
    async fn test_failure_is_reported_as_text() {
        let dir = TempDir::new().unwrap();
        let tool = GitTool::new(dir.path());

        // not a repository
        let output = tool
            .run(&args(json!({"command": "log", "options": ["-1"]})))
            .await
            .unwrap();
        assert!(output.starts_with("[Error: "));
    }

    #[test]
    fn test_signature_lists_commands() {
        let tool = GitTool::new(".");
        let description = tool.signature().parameters["properties"]["command"]["description"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(description.ends_with("status, log, diff, show, grep, checkout."));
    }
}
