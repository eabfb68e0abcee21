use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const SESSION_DIR: &str = ".vibecoder";
pub const SESSION_FILE_NAME: &str = "swe_session.md";
const HISTORY_FILE_NAME: &str = ".vibecoder_history";

/// Session summary location under the working directory
pub fn session_file(root: &Path) -> PathBuf {
    root.join(SESSION_DIR).join(SESSION_FILE_NAME)
}

pub fn ensure_session_dir(session_file: &Path) -> Result<()> {
    if let Some(dir) = session_file.parent() {
        if !dir.exists() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
    }
    Ok(())
}

pub fn persist_summary(session_file: &Path, summary: &str) -> Result<()> {
    ensure_session_dir(session_file)?;
    fs::write(session_file, summary)
        .with_context(|| format!("Failed to write session file {}", session_file.display()))
}

/// The saved summary, or `None` when nothing has been saved yet
pub fn read_summary(session_file: &Path) -> Result<Option<String>> {
    if !session_file.exists() {
        return Ok(None);
    }
    let summary = fs::read_to_string(session_file)
        .with_context(|| format!("Failed to read session file {}", session_file.display()))?;
    Ok(Some(summary).filter(|text| !text.trim().is_empty()))
}

/// Readline history in the home directory
pub fn history_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(HISTORY_FILE_NAME))
}
