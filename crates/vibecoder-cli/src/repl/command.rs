pub const COMMAND_MARKER: char = '/';
pub const DEFAULT_WORK_MINUTES: u64 = 1;

/// A parsed line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Edit,
    Work(u64),
    Save(Option<String>),
    Interrupt,
    Role(Option<String>),
    Model(Option<String>),
    Help,
    Unknown(String),
    Message(String),
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let trimmed = line.trim();
        let Some(body) = trimmed.strip_prefix(COMMAND_MARKER) else {
            return Command::Message(trimmed.to_string());
        };

        let (name, rest) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (body, ""),
        };
        let argument = (!rest.is_empty()).then(|| rest.to_string());

        match name.to_lowercase().as_str() {
            "quit" | "exit" => Command::Quit,
            "edit" => Command::Edit,
            "work" => Command::Work(
                argument
                    .and_then(|minutes| minutes.parse().ok())
                    .unwrap_or(DEFAULT_WORK_MINUTES),
            ),
            "save" => Command::Save(argument),
            "interrupt" => Command::Interrupt,
            "role" => Command::Role(argument),
            "model" => Command::Model(argument),
            "help" | "?" => Command::Help,
            _ => Command::Unknown(name.to_string()),
        }
    }
}

pub const HELP: &str = "\
Commands:
  /quit, /exit      End the session
  /edit             Compose a message in $EDITOR, seeded with the last output
  /work [minutes]   Let the agent keep going on its own (default 1 minute)
  /interrupt        Stop autonomous work after the current turn (also Ctrl-C)
  /save [note]      Summarize the session into the session file
  /role [name]      Switch agent role
  /model [name]     Show or set the model of the current agent
  /help             Show this message";
