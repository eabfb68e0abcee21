use std::io::{self, Write};

use bat::WrappingMode;
use cliclack::spinner;
use console::style;
use vibecoder::models::message::{AgentMessage, MessageKind};

use super::Prompt;
use crate::repl::status::StatusDisplay;

const THEME: &str = "zenburn";

/// Renders agent output to stdout, markdown through bat
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn new() -> Self {
        TerminalPrompt
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

fn print_markdown(content: &str) {
    let printed = bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(THEME)
        .language("Markdown")
        .wrapping_mode(WrappingMode::Character)
        .print();
    if printed.is_err() {
        println!("{}", content);
    }
}

impl Prompt for TerminalPrompt {
    fn render(&mut self, speaker: &str, message: &AgentMessage) {
        match &message.kind {
            MessageKind::Response => {
                println!("🤖 {}:", style(speaker).bold().cyan());
                print_markdown(&message.content);
            }
            MessageKind::ToolUse { .. } => {
                println!(
                    "🔧 {} {}",
                    style("Tool call:").dim(),
                    style(message.summary()).yellow()
                );
            }
            MessageKind::ToolResult { tool_name, .. } => {
                println!(
                    "   {}",
                    style(format!("ToolResult({}): {}", tool_name, message.summary())).dim()
                );
            }
            MessageKind::User => self.echo(&message.content),
        }
        let _ = io::stdout().flush();
    }

    fn echo(&mut self, text: &str) {
        println!("👤 {}", style(text).bold());
    }

    fn info(&mut self, text: &str) {
        println!("{}", style(text).dim());
    }

    fn warn(&mut self, text: &str) {
        println!("{}", style(text).yellow());
    }

    fn close(&self) {
        println!("{}", style("Goodbye.").dim());
    }
}

/// Busy indicator drawn with a cliclack spinner
pub struct SpinnerDisplay {
    spinner: Option<cliclack::ProgressBar>,
}

impl SpinnerDisplay {
    pub fn new() -> Self {
        Self { spinner: None }
    }
}

impl Default for SpinnerDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusDisplay for SpinnerDisplay {
    fn show(&mut self, text: &str) {
        match &self.spinner {
            Some(active) => active.set_message(text),
            None => {
                let started = spinner();
                started.start(text);
                self.spinner = Some(started);
            }
        }
    }

    fn hide(&mut self) {
        if let Some(active) = self.spinner.take() {
            active.stop("");
        }
    }
}
