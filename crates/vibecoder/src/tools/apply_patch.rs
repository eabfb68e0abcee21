use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{output_text, report, require_str, Tool};
use crate::errors::ToolError;
use crate::models::message::Arguments;
use crate::models::tool::ToolSignature;

/// Applies unified diffs with the system `patch` program
pub struct ApplyPatch {
    signature: ToolSignature,
    root: PathBuf,
}

impl ApplyPatch {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let signature = ToolSignature::new(
            "apply_patch",
            "Apply a unified diff to files in the working directory. Paths in the diff \
            headers must be relative to the working directory (patch -p0).",
            json!({
                "type": "object",
                "properties": {
                    "patch_text": {
                        "type": "string",
                        "description": "The unified patch text to apply."
                    }
                },
                "required": ["patch_text"]
            }),
        );
        Self {
            signature,
            root: root.as_ref().to_path_buf(),
        }
    }

    async fn apply(&self, args: &Arguments) -> Result<String, ToolError> {
        let patch_text = require_str(args, "patch_text")?;

        let mut child = Command::new("patch")
            .current_dir(&self.root)
            .args(["-f", "-t", "-p0"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ToolError::Io(format!("could not run patch: {}", e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(patch_text.as_bytes())
                .await
                .map_err(|e| ToolError::Io(format!("could not send patch: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ToolError::Io(format!("patch did not finish: {}", e)))?;

        let summary = summarize(
            output.status.code().unwrap_or(-1),
            &output_text(&output.stdout),
            &output_text(&output.stderr),
        );

        if output.status.success() {
            Ok(format!("[Patch applied successfully]\n{}", summary))
        } else {
            Err(ToolError::PatchApplication(summary))
        }
    }
}

fn summarize(code: i32, stdout: &str, stderr: &str) -> String {
    let mut summary = format!("[Patch Command Exit Code: {}]", code);
    if !stdout.is_empty() {
        summary.push_str(&format!("\n\n[STDOUT]\n{}", stdout));
    }
    if !stderr.is_empty() {
        summary.push_str(&format!("\n\n[STDERR]\n{}", stderr));
    }
    summary
}

#[async_trait]
impl Tool for ApplyPatch {
    fn signature(&self) -> &ToolSignature {
        &self.signature
    }

    async fn run(&self, args: &Arguments) -> Result<String, ToolError> {
        report(self.apply(args).await)
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

    #[test]
    fn test_summary_sections() {
        assert_eq!(summarize(0, "", ""), "[Patch Command Exit Code: 0]");
        assert_eq!(
            summarize(1, "patching file a.txt", "Hunk #1 FAILED"),
            "[Patch Command Exit Code: 1]\n\n[STDOUT]\npatching file a.txt\n\n[STDERR]\nHunk #1 FAILED"
        );
    }

    #[tokio::test]
    async fn test_missing_patch_text() {
        let tool = ApplyPatch::new(".");
        let output = tool.run(&Arguments::new()).await.unwrap();
        assert_eq!(output, "[Error: 'patch_text' argument is required]");
    }

    #[tokio::test]
    async fn test_failed_patch_is_reported_as_text() {
        let dir = TempDir::new().unwrap();
        let tool = ApplyPatch::new(dir.path());
        let patch = "--- missing.txt\n+++ missing.txt\n@@ -1 +1 @@\n-old\n+new\n";

        let output = tool.run(&args(json!({"patch_text": patch}))).await.unwrap();
        assert!(output.starts_with("[Error: "));
    }
}
