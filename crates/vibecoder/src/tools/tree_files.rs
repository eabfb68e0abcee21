use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ignore::overrides::{Override, OverrideBuilder};
use ignore::WalkBuilder;
use serde_json::json;

use super::{optional_bool, optional_str, optional_u64, report, Tool};
use crate::errors::ToolError;
use crate::models::message::Arguments;
use crate::models::tool::ToolSignature;

pub struct TreeFiles {
    signature: ToolSignature,
    root: PathBuf,
}

struct TreeOptions {
    start: PathBuf,
    label: String,
    max_depth: Option<usize>,
    respect_gitignore: bool,
    include: Option<Override>,
}

impl TreeFiles {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let signature = ToolSignature::new(
            "tree_files",
            "List the files under a directory as an indented tree. Hidden files are skipped.",
            json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Root directory to list (default is '.'). Only subdirectories allowed."
                    },
                    "max_depth": {
                        "type": "integer",
                        "description": "Limit depth of recursion."
                    },
                    "ignore_gitignore": {
                        "type": "boolean",
                        "description": "Respect .gitignore files when listing."
                    },
                    "include_pattern": {
                        "type": "string",
                        "description": "Include only files matching this glob pattern."
                    }
                },
                "required": []
            }),
        );
        Self {
            signature,
            root: root.as_ref().to_path_buf(),
        }
    }

    fn options(&self, args: &Arguments) -> Result<TreeOptions, ToolError> {
        // only subdirectories of the root can be listed
        let requested = optional_str(args, "path").unwrap_or(".").replace("..", "");
        let requested = requested.trim().trim_start_matches('/');
        let label = if requested.is_empty() { "." } else { requested };
        let start = self.root.join(label);

        let include = match optional_str(args, "include_pattern") {
            Some(pattern) => {
                let mut builder = OverrideBuilder::new(&start);
                builder
                    .add(pattern)
                    .map_err(|e| ToolError::InvalidArgument(format!("bad include_pattern: {}", e)))?;
                Some(
                    builder
                        .build()
                        .map_err(|e| ToolError::InvalidArgument(format!("bad include_pattern: {}", e)))?,
                )
            }
            None => None,
        };

        Ok(TreeOptions {
            start,
            label: label.to_string(),
            max_depth: optional_u64(args, "max_depth")?.map(|depth| depth as usize),
            respect_gitignore: optional_bool(args, "ignore_gitignore"),
            include,
        })
    }

    async fn list(&self, args: &Arguments) -> Result<String, ToolError> {
        let options = self.options(args)?;
        if !options.start.is_dir() {
            return Err(ToolError::Io(format!(
                "'{}' is not a directory",
                options.label
            )));
        }

        tokio::task::spawn_blocking(move || render_tree(&options))
            .await
            .map_err(|e| ToolError::Execution(format!("tree walk panicked: {}", e)))?
    }
}

fn render_tree(options: &TreeOptions) -> Result<String, ToolError> {
    let respect = options.respect_gitignore;
    let walker = WalkBuilder::new(&options.start)
        .max_depth(options.max_depth)
        .git_ignore(respect)
        .git_exclude(respect)
        .git_global(respect)
        .ignore(respect)
        .parents(respect)
        .require_git(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut lines = vec![options.label.clone()];
    let (mut directories, mut files) = (0usize, 0usize);

    for entry in walker {
        let entry = entry.map_err(|e| ToolError::Io(e.to_string()))?;
        let depth = entry.depth();
        if depth == 0 {
            continue;
        }

        let is_dir = entry.file_type().is_some_and(|kind| kind.is_dir());
        if !is_dir {
            if let Some(include) = &options.include {
                if !include.matched(entry.path(), false).is_whitelist() {
                    continue;
                }
            }
        }

        let name = entry.file_name().to_string_lossy();
        let indent = "    ".repeat(depth - 1);
        if is_dir {
            directories += 1;
            lines.push(format!("{}├── {}/", indent, name));
        } else {
            files += 1;
            lines.push(format!("{}├── {}", indent, name));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "{} {}, {} {}",
        directories,
        if directories == 1 { "directory" } else { "directories" },
        files,
        if files == 1 { "file" } else { "files" },
    ));
    Ok(lines.join("\n"))
}

#[async_trait]
impl Tool for TreeFiles {
    fn signature(&self) -> &ToolSignature {
        &self.signature
    }

    async fn run(&self, args: &Arguments) -> Result<String, ToolError> {
        report(self.list(args).await)
    }
}
