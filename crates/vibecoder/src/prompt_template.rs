use include_dir::{include_dir, Dir};
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tera::{Context, Error as TeraError, Tera};

use crate::tools::ToolRegistry;

static PROMPTS: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/prompts");

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered.trim().to_string())
}

/// Render a template from disk, falling back to the prompts bundled in the binary
/// when no such file exists
pub fn load_prompt_file<T: Serialize>(
    template_file: impl Into<PathBuf>,
    context_data: &T,
) -> Result<String, TeraError> {
    let template_path = template_file.into();
    let template_content = if template_path.exists() {
        fs::read_to_string(&template_path)
            .map_err(|e| TeraError::chain("Failed to read template file", e))?
    } else {
        PROMPTS
            .get_file(&template_path)
            .and_then(|file| file.contents_utf8())
            .map(String::from)
            .ok_or_else(|| {
                TeraError::msg(format!("Unknown prompt template {}", template_path.display()))
            })?
    };
    load_prompt(&template_content, context_data)
}

/// Render one of the prompts bundled in the binary. Files in the working
/// directory are never consulted.
pub fn load_bundled_prompt<T: Serialize>(
    name: &str,
    context_data: &T,
) -> Result<String, TeraError> {
    let template = PROMPTS
        .get_file(name)
        .and_then(|file| file.contents_utf8())
        .ok_or_else(|| TeraError::msg(format!("Unknown prompt template {}", name)))?;
    load_prompt(template, context_data)
}

/// System prompt for the software engineering role
pub fn swe_prompt(tools: &ToolRegistry) -> Result<String, TeraError> {
    load_bundled_prompt("swe.md", &json!({"tools": tools.display_signatures()}))
}

/// System prompt for the read-only analyst role
pub fn analyst_prompt(tools: &ToolRegistry) -> Result<String, TeraError> {
    load_bundled_prompt("analyst.md", &json!({"tools": tools.display_signatures()}))
}

/// The summary request sent by the save command
pub fn save_context_prompt(instruction: Option<&str>) -> Result<String, TeraError> {
    let instruction = instruction.map(str::trim).filter(|text| !text.is_empty());
    load_bundled_prompt("save_context.md", &json!({"instruction": instruction}))
}

/// The message repeated on every autonomous work turn
pub fn continue_prompt() -> Result<String, TeraError> {
    load_bundled_prompt("continue.md", &json!({}))
}
