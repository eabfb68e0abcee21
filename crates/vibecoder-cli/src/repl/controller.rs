use std::env;
use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use futures::TryStreamExt;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};
use vibecoder::models::message::{AgentMessage, MessageKind};
use vibecoder::prompt_template::{continue_prompt, save_context_prompt};

use super::command::{Command, HELP};
use super::status::Status;
use crate::agents::roles::{Role, RoleRegistry};
use crate::prompt::Prompt;
use crate::session::session_file::persist_summary;

const EDIT_LEADING_BLANK_LINES: usize = 5;

/// Opens a file in an editor and blocks until the editor exits
pub type EditorLauncher = Arc<dyn Fn(&Path) -> Result<()> + Send + Sync>;

/// `$VISUAL`, then `$EDITOR`, then `vi`
pub fn system_editor() -> EditorLauncher {
    Arc::new(|path: &Path| -> Result<()> {
        let editor = env::var("VISUAL")
            .or_else(|_| env::var("EDITOR"))
            .unwrap_or_else(|_| "vi".to_string());
        let mut parts = editor.split_whitespace();
        let program = parts.next().unwrap_or("vi");

        let status = process::Command::new(program)
            .args(parts)
            .arg(path)
            .status()
            .with_context(|| format!("Failed to launch editor '{}'", editor))?;
        if !status.success() {
            return Err(anyhow!("Editor '{}' exited with {}", editor, status));
        }
        Ok(())
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Controller {
    roles: RoleRegistry,
    prompt: Box<dyn Prompt>,
    status: watch::Sender<Status>,
    interrupt: Arc<AtomicBool>,
    last_output: Vec<String>,
    session_file: PathBuf,
    editor: EditorLauncher,
}

impl Controller {
    pub fn new(
        roles: RoleRegistry,
        prompt: Box<dyn Prompt>,
        session_file: PathBuf,
        interrupt: Arc<AtomicBool>,
    ) -> Self {
        let (status, _) = watch::channel(Status::Waiting);
        Self {
            roles,
            prompt,
            status,
            interrupt,
            last_output: Vec::new(),
            session_file,
            editor: system_editor(),
        }
    }

    pub fn with_editor(mut self, editor: EditorLauncher) -> Self {
        self.editor = editor;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<Status> {
        self.status.subscribe()
    }

    pub fn status(&self) -> Status {
        *self.status.borrow()
    }

    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        self.interrupt.clone()
    }

    #[cfg(test)]
    pub fn last_output(&self) -> &[String] {
        &self.last_output
    }

    pub fn hint(&mut self, text: &str) {
        self.prompt.info(text);
    }

    pub fn close(&self) {
        self.prompt.close();
    }

    /// Handle one line of input. Failures are reported and the session goes on;
    /// only a quit command ends it.
    pub async fn handle_line(&mut self, line: &str) -> Flow {
        let command = Command::parse(line);
        if command == Command::Quit {
            return Flow::Quit;
        }

        if let Err(err) = self.dispatch(command).await {
            warn!("command failed: {:#}", err);
            self.prompt.warn(&format!("Error: {:#}", err));
        }
        self.status.send_replace(Status::Waiting);
        Flow::Continue
    }

    async fn dispatch(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Message(text) if text.is_empty() => Ok(()),
            Command::Message(text) => self.ask(&text).await,
            Command::Edit => self.edit().await,
            Command::Work(minutes) => {
                self.work_for(Duration::from_secs(minutes.saturating_mul(60)))
                    .await
            }
            Command::Save(note) => self.save_context(note.as_deref()).await,
            Command::Interrupt => {
                self.interrupt.store(true, Ordering::SeqCst);
                self.prompt.info("Interrupt requested.");
                Ok(())
            }
            Command::Role(name) => self.switch_role(name.as_deref()),
            Command::Model(name) => self.model(name.as_deref()),
            Command::Help => {
                self.prompt.info(HELP);
                Ok(())
            }
            Command::Unknown(name) => {
                self.prompt.warn(&format!(
                    "Unknown command '/{}'. Type /help for the list of commands.",
                    name
                ));
                Ok(())
            }
            Command::Quit => Ok(()),
        }
    }

    /// Run one agent turn, rendering each message as it arrives
    pub async fn ask(&mut self, input: &str) -> Result<()> {
        self.status.send_if_modified(|status| {
            let idle = *status == Status::Waiting;
            if idle {
                *status = Status::Responding;
            }
            idle
        });

        let speaker = self.roles.active().speaker();
        self.last_output.clear();

        let agent = self.roles.agent()?;
        let mut messages = agent.ask(input.to_string());
        while let Some(message) = messages.try_next().await? {
            self.prompt.render(&speaker, &message);
            if let Some(line) = transcript_line(&speaker, &message) {
                self.last_output.push(line);
            }
        }
        Ok(())
    }

    /// Keep sending the continuation prompt until `duration` has passed or an
    /// interrupt is requested. Both are checked only between turns.
    pub async fn work_for(&mut self, duration: Duration) -> Result<()> {
        let continuation = continue_prompt()?;
        let started = Instant::now();
        let deadline = started
            .checked_add(duration)
            .ok_or_else(|| anyhow!("Work duration of {} is too long", describe(duration)))?;
        self.interrupt.store(false, Ordering::SeqCst);

        self.status.send_replace(Status::Working { started, deadline });
        self.prompt.info(&format!(
            "Working autonomously for {}. Use /interrupt or Ctrl-C to stop.",
            describe(duration)
        ));

        let mut turns = 0;
        let outcome = loop {
            if Instant::now() >= deadline {
                break Ok(());
            }
            if self.interrupt.load(Ordering::SeqCst) {
                self.prompt.info("Work mode interrupted.");
                break Ok(());
            }

            self.prompt.echo(&continuation);
            if let Err(err) = self.ask(&continuation).await {
                break Err(err);
            }
            turns += 1;
        };

        let elapsed = self.status().elapsed(Instant::now());
        debug!(turns, ?elapsed, "work mode finished");
        self.interrupt.store(false, Ordering::SeqCst);
        self.status.send_replace(Status::Waiting);
        self.prompt.info("Finished autonomous work mode.");
        outcome
    }

    /// Ask the agent to summarize the session and write its answer to the session file
    pub async fn save_context(&mut self, note: Option<&str>) -> Result<()> {
        let request = save_context_prompt(note)?;
        self.status.send_replace(Status::Responding);

        let agent = self.roles.agent()?;
        let messages: Vec<AgentMessage> = agent.ask(request).try_collect().await?;
        let summary = messages
            .iter()
            .filter_map(AgentMessage::text)
            .collect::<Vec<_>>()
            .join("\n");

        persist_summary(&self.session_file, &summary)?;
        self.prompt.info(&format!(
            "Session context saved to {}",
            self.session_file.display()
        ));
        Ok(())
    }

    pub fn switch_role(&mut self, name: Option<&str>) -> Result<()> {
        let Some(name) = name else {
            self.prompt.info(&format!(
                "Current role: {}. Available roles: {}",
                self.roles.active(),
                Role::names()
            ));
            return Ok(());
        };

        let Ok(role) = Role::from_str(name) else {
            self.prompt.warn(&format!(
                "Unknown role '{}'. Available roles: {}",
                name,
                Role::names()
            ));
            return Ok(());
        };

        if role == self.roles.active() {
            self.prompt.info(&format!("Already using the {} role.", role));
            return Ok(());
        }

        self.roles.activate(role)?;
        let model = self.roles.agent()?.model().to_string();
        self.prompt
            .info(&format!("Switched to the {} role (model {}).", role, model));
        Ok(())
    }

    pub fn model(&mut self, name: Option<&str>) -> Result<()> {
        let agent = self.roles.agent()?;
        match name {
            None => {
                let current = agent.model().to_string();
                self.prompt.info(&format!("Current model: {}", current));
            }
            Some(model) => {
                agent.set_model(model);
                self.prompt.info(&format!("Model set to {}", model));
            }
        }
        Ok(())
    }

    /// Compose a message in an external editor, seeded with the last turn's output
    pub async fn edit(&mut self) -> Result<()> {
        let file = tempfile::Builder::new()
            .prefix("vibecoder-")
            .suffix(".md")
            .tempfile()?;
        tokio::fs::write(file.path(), edit_template(&self.last_output)).await?;

        let editor = self.editor.clone();
        let path = file.path().to_path_buf();
        tokio::task::spawn_blocking(move || editor(&path))
            .await
            .context("Editor task failed")??;

        let edited = tokio::fs::read_to_string(file.path()).await?;
        let message = strip_comments(&edited);
        if message.is_empty() {
            self.prompt.info("Nothing to send.");
            return Ok(());
        }

        self.prompt.echo(&message);
        self.ask(&message).await
    }
}

fn transcript_line(speaker: &str, message: &AgentMessage) -> Option<String> {
    match message.kind {
        MessageKind::Response => Some(format!("🤖 {}: {}", speaker, message.content)),
        MessageKind::ToolUse { .. } => Some(format!("🔧 Tool call: {}", message.summary())),
        _ => None,
    }
}

fn edit_template(last_output: &[String]) -> String {
    if last_output.is_empty() {
        return String::new();
    }

    let mut template = "\n".repeat(EDIT_LEADING_BLANK_LINES);
    for line in last_output.iter().flat_map(|output| output.lines()) {
        template.push_str("# ");
        template.push_str(line);
        template.push('\n');
    }
    template.push('\n');
    template
}

fn strip_comments(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn describe(duration: Duration) -> String {
    match duration.as_secs() {
        60 => "1 minute".to_string(),
        secs if secs % 60 == 0 => format!("{} minutes", secs / 60),
        secs => format!("{} seconds", secs),
    }
}
