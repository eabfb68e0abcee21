use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::json;
use tokio::process::Command;

use super::{confined, optional_bool, optional_str, output_text, report, require_str, string_list, Tool};
use crate::errors::ToolError;
use crate::models::message::Arguments;
use crate::models::tool::ToolSignature;

pub struct Grep {
    signature: ToolSignature,
    root: PathBuf,
}

impl Grep {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let signature = ToolSignature::new(
            "grep",
            "Search files recursively for a regular expression. Returns matching lines \
            prefixed with their file name and line number.",
            json!({
                "type": "object",
                "properties": {
                    "pattern": {"type": "string", "description": "The search pattern, supports regex."},
                    "paths": {"type": "array", "items": {"type": "string"}},
                    "ignore_patterns": {"type": "array", "items": {"type": "string"}, "default": []},
                    "include_pattern": {"type": "string", "default": null},
                    "ignore_case": {"type": "boolean", "default": false}
                },
                "required": ["pattern", "paths"]
            }),
        );
        Self {
            signature,
            root: root.as_ref().to_path_buf(),
        }
    }

    async fn search(&self, args: &Arguments) -> Result<String, ToolError> {
        let pattern = require_str(args, "pattern")?;
        let paths = string_list(args, "paths")?;
        if paths.is_empty() {
            return Err(ToolError::MissingArgument("paths".to_string()));
        }
        let paths = paths
            .iter()
            .map(|path| confined(path.trim_end_matches('/')).map(String::from))
            .collect::<Result<Vec<_>, _>>()?;

        let mut command = Command::new("grep");
        command.current_dir(&self.root).arg("-rn");
        if optional_bool(args, "ignore_case") {
            command.arg("-i");
        }
        if let Some(include) = optional_str(args, "include_pattern") {
            command.arg(format!("--include={}", include));
        }
        for exclude in string_list(args, "ignore_patterns")? {
            command.arg(format!("--exclude={}", exclude));
        }
        command.arg("-e").arg(pattern).arg("--").args(&paths);

        let output = command
            .output()
            .await
            .map_err(|e| ToolError::Io(format!("could not run grep: {}", e)))?;

        match output.status.code() {
            Some(0) => Ok(String::from_utf8_lossy(&output.stdout).into_owned()),
            Some(1) => Ok(format!("No matches for '{}'", pattern)),
            _ => Err(ToolError::Io(output_text(&output.stderr))),
        }
    }
}

#[async_trait]
impl Tool for Grep {
    fn signature(&self) -> &ToolSignature {
        &self.signature
    }

    async fn run(&self, args: &Arguments) -> Result<String, ToolError> {
        report(self.search(args).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::fs;
    use tempfile::TempDir;

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    fn setup() -> (TempDir, Grep) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/main.rs"), "fn main() {\n    run();\n}\n").unwrap();
        fs::write(dir.path().join("src/README.md"), "Run the binary\n").unwrap();
        let tool = Grep::new(dir.path());
        (dir, tool)
    }

    #[tokio::test]
    async fn test_finds_matches_with_line_numbers() {
        let (_dir, tool) = setup();
        let output = tool
            .run(&args(json!({"pattern": "run", "paths": ["src"]})))
            .await
            .unwrap();
        assert_eq!(output, "src/main.rs:2:    run();\n");
    }

    #[tokio::test]
    async fn test_ignore_case_and_include() {
        let (_dir, tool) = setup();
        let output = tool
            .run(&args(json!({
                "pattern": "run",
                "paths": ["src/"],
                "ignore_case": true,
                "include_pattern": "*.md"
            })))
            .await
            .unwrap();
        assert_eq!(output, "src/README.md:1:Run the binary\n");
    }

    #[tokio::test]
    async fn test_no_matches_and_bad_paths() {
        let (_dir, tool) = setup();
        let output = tool
            .run(&args(json!({"pattern": "absent_token", "paths": ["src"]})))
            .await
            .unwrap();
        assert_eq!(output, "No matches for 'absent_token'");

        let output = tool
            .run(&args(json!({"pattern": "x", "paths": ["../elsewhere"]})))
            .await
            .unwrap();
        assert_eq!(
            output,
            "[Error: Paths must be relative and confined to the working directory.]"
        );

        let output = tool.run(&args(json!({"pattern": "x"}))).await.unwrap();
        assert_eq!(output, "[Error: 'paths' argument is required]");
    }
}
