use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::mpsc as std_mpsc;
use std::thread;

use anyhow::Result;
use console::style;
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::{Config, Editor};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::command::Command;
use super::controller::{Controller, Flow};

const PROMPT: &str = "\x1b[1m\x1b[38;5;30m> \x1b[0m";
const EVENT_BUFFER: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    /// Ctrl-C
    Interrupt,
    /// Ctrl-D or a closed terminal
    Eof,
}

/// Lines that hand the terminal to another program until they are handled
fn pauses_input(line: &str) -> bool {
    Command::parse(line) == Command::Edit
}

/// Start the reader thread. Returns the event stream and the sender used to
/// let the reader continue after a line that paused it.
pub fn spawn_reader(
    history_file: Option<PathBuf>,
) -> Result<(mpsc::Receiver<InputEvent>, std_mpsc::Sender<()>)> {
    let (events, receiver) = mpsc::channel(EVENT_BUFFER);
    let (resume, resumed) = std_mpsc::channel();
    thread::Builder::new()
        .name("input".to_string())
        .spawn(move || match line_editor(history_file.as_ref()) {
            Ok(editor) => read_lines(editor, history_file, events, resumed),
            Err(err) => {
                warn!("could not start line editor: {}", err);
                let _ = events.blocking_send(InputEvent::Eof);
            }
        })?;
    Ok((receiver, resume))
}

fn line_editor(history_file: Option<&PathBuf>) -> Result<Editor<(), FileHistory>> {
    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(false)
        .build();
    let mut editor = Editor::with_config(config)?;
    if let Some(path) = history_file.filter(|path| path.exists()) {
        if let Err(err) = editor.load_history(path) {
            warn!("could not load input history: {}", err);
        }
    }
    Ok(editor)
}

fn read_lines(
    mut editor: Editor<(), FileHistory>,
    history_file: Option<PathBuf>,
    events: mpsc::Sender<InputEvent>,
    resumed: std_mpsc::Receiver<()>,
) {
    loop {
        let event = match editor.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                    if let Some(path) = &history_file {
                        if let Err(err) = editor.save_history(path) {
                            debug!("could not save input history: {}", err);
                        }
                    }
                }
                InputEvent::Line(line)
            }
            Err(ReadlineError::Interrupted) => InputEvent::Interrupt,
            Err(ReadlineError::Eof) => InputEvent::Eof,
            Err(err) => {
                warn!("input error: {}", err);
                InputEvent::Eof
            }
        };

        let (pause, last) = match &event {
            InputEvent::Line(line) => (pauses_input(line), Command::parse(line) == Command::Quit),
            InputEvent::Interrupt => (false, false),
            InputEvent::Eof => (false, true),
        };
        if events.blocking_send(event).is_err() || last {
            break;
        }
        if pause && resumed.recv().is_err() {
            break;
        }
    }
}

/// Drive the controller from input events until quit or end of input.
///
/// While a line is being handled, `/interrupt` and Ctrl-C raise the interrupt
/// flag right away; any other line waits its turn.
pub async fn run(
    mut controller: Controller,
    mut events: mpsc::Receiver<InputEvent>,
    resume: std_mpsc::Sender<()>,
) -> Result<()> {
    let interrupt = controller.interrupt_flag();
    let mut queue: VecDeque<String> = VecDeque::new();
    let mut closed = false;

    loop {
        let line = match queue.pop_front() {
            Some(line) => line,
            None if closed => break,
            None => match events.recv().await {
                Some(InputEvent::Line(line)) => line,
                Some(InputEvent::Interrupt) => {
                    controller.hint("Nothing to interrupt. Use /quit to exit.");
                    continue;
                }
                Some(InputEvent::Eof) | None => break,
            },
        };

        let pause = pauses_input(&line);
        let flow = {
            let handling = controller.handle_line(&line);
            tokio::pin!(handling);
            loop {
                tokio::select! {
                    flow = &mut handling => break flow,
                    event = events.recv(), if !closed => match event {
                        Some(InputEvent::Interrupt) => interrupt.store(true, Ordering::SeqCst),
                        Some(InputEvent::Line(next)) if Command::parse(&next) == Command::Interrupt => {
                            interrupt.store(true, Ordering::SeqCst)
                        }
                        Some(InputEvent::Line(next)) => queue.push_back(next),
                        Some(InputEvent::Eof) | None => closed = true,
                    },
                }
            }
        };

        if pause {
            let _ = resume.send(());
        }
        if flow == Flow::Quit {
            break;
        }
    }

    controller.close();
    Ok(())
}

pub fn print_banner() {
    println!("{}", style("\nvibecoder").bold().cyan());
    println!(
        "Type {} to exit, {} for help\n",
        style("/quit").dim(),
        style("/help").dim()
    );
}
