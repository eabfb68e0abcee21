//! Tools the model can call, and the registry the engine looks them up in.
//!
//! A tool reports every expected failure (missing or malformed arguments, a
//! file that does not exist, a command that exits non-zero) as text in its
//! output. Only [`ToolError::Execution`] is returned as an error, and the
//! engine lets that end the turn.

mod apply_patch;
mod fetch_url;
mod git;
mod grep;
mod move_file;
mod read_file;
mod tree_files;
mod web_search;
mod write_file;

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

pub use apply_patch::ApplyPatch;
pub use fetch_url::FetchUrl;
pub use git::GitTool;
pub use grep::Grep;
pub use move_file::MoveFile;
pub use read_file::ReadFile;
pub use run_tests::RunTests;
pub use tree_files::TreeFiles;
pub use web_search::WebSearch;
pub use write_file::WriteFile;

use crate::errors::ToolError;
use crate::models::message::Arguments;
use crate::models::tool::ToolSignature;
use crate::providers::configs::WebSearchConfig;

#[async_trait]
pub trait Tool: Send + Sync {
    /// The schema offered to the backend
    fn signature(&self) -> &ToolSignature;

    fn name(&self) -> &str {
        &self.signature().name
    }

    /// Run the tool. The returned text goes into the conversation as is.
    async fn run(&self, args: &Arguments) -> Result<String, ToolError>;
}

/// Turn expected failures into `[Error: ...]` output, letting only
/// [`ToolError::Execution`] through
pub fn report(result: Result<String, ToolError>) -> Result<String, ToolError> {
    match result {
        Err(err) if err.is_expected() => Ok(format!("[Error: {}]", err)),
        other => other,
    }
}

/// Name-unique, ordered collection of tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool, replacing any tool already registered under the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.retain(|existing| existing.name() != tool.name());
        self.tools.push(Box::new(tool));
    }

    pub fn with<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.register(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|tool| tool.name() == name)
            .map(|tool| tool.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    pub fn signatures(&self) -> Vec<ToolSignature> {
        self.tools
            .iter()
            .map(|tool| tool.signature().clone())
            .collect()
    }

    /// One `name(params)` line per tool, for system prompts
    pub fn display_signatures(&self) -> String {
        self.tools
            .iter()
            .map(|tool| format!("- {}", tool.signature().display_signature()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Everything the software engineering role gets
pub fn developer_tools<P: AsRef<Path>>(root: P) -> ToolRegistry {
    let root = root.as_ref();
    ToolRegistry::new()
        .with(ReadFile::new(root))
        .with(WriteFile::new(root))
        .with(TreeFiles::new(root))
        .with(ApplyPatch::new(root))
        .with(RunTests::new(root))
        .with(Grep::new(root))
        .with(GitTool::new(root))
        .with(MoveFile::new(root))
        .with(WebSearch::new(WebSearchConfig::from_env()))
        .with(FetchUrl::new())
}

/// Inspection oriented subset for the analyst role
pub fn analyst_tools<P: AsRef<Path>>(root: P) -> ToolRegistry {
    let root = root.as_ref();
    ToolRegistry::new()
        .with(Grep::new(root))
        .with(GitTool::new(root))
        .with(ReadFile::new(root))
        .with(WriteFile::new(root))
        .with(TreeFiles::new(root))
        .with(RunTests::new(root))
}

fn require_str<'a>(args: &'a Arguments, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ToolError::MissingArgument(key.to_string()))
}

fn optional_str<'a>(args: &'a Arguments, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

fn optional_bool(args: &Arguments, key: &str) -> bool {
    args.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn optional_u64(args: &Arguments, key: &str) -> Result<Option<u64>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| ToolError::InvalidArgument(format!("'{}' must be an integer", key))),
    }
}

/// A list of strings; a single string is accepted as a list of one
fn string_list(args: &Arguments, key: &str) -> Result<Vec<String>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(single)) => Ok(vec![single.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(String::from).ok_or_else(|| {
                    ToolError::InvalidArgument(format!("'{}' must be a list of strings", key))
                })
            })
            .collect(),
        Some(_) => Err(ToolError::InvalidArgument(format!(
            "'{}' must be a list of strings",
            key
        ))),
    }
}

/// Resolve `path` against the workspace root; absolute paths are used as given
fn resolve(root: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Reject absolute paths and any path that climbs out with `..`
fn confined(path: &str) -> Result<&str, ToolError> {
    let escapes = Path::new(path)
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
    if escapes {
        Err(ToolError::InvalidArgument(
            "Paths must be relative and confined to the working directory.".to_string(),
        ))
    } else {
        Ok(path)
    }
}

/// Decode subprocess output and trim it
fn output_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}
