mod agents;
mod prompt;
mod repl;
mod session;

use std::env;
use std::fs::{self, OpenOptions};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;
use vibecoder::models::message::AgentMessage;
use vibecoder::providers::configs::load_env;

use agents::roles::{build_agent, default_factory, Role, RoleRegistry};
use prompt::terminal::{SpinnerDisplay, TerminalPrompt};
use repl::controller::Controller;
use repl::engine::{print_banner, run, spawn_reader};
use repl::status::animate;
use session::session_file::{history_file, read_summary, session_file};

const LOG_FILTER_ENV: &str = "VIBECODER_LOG";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Role to start with (swe, anthropic, analyst or mock)
    #[arg(short, long, default_value = "swe")]
    role: Role,

    /// Model for the starting agent, instead of the backend default
    #[arg(short, long)]
    model: Option<String>,

    /// Start from the summary written by the last /save
    #[arg(long)]
    resume: bool,
}

/// Log to `~/.vibecoder/vibecoder.log` so nothing lands on the terminal.
/// Logging stays off if that file cannot be opened.
fn init_logging() {
    let Some(dir) = dirs::home_dir().map(|home| home.join(".vibecoder")) else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("vibecoder.log"))
    else {
        return;
    };

    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    if !load_env() {
        println!(
            "{}",
            style("No .env file found, using the process environment.").yellow()
        );
    }

    let root = env::current_dir()?;
    let session_path = session_file(&root);

    let mut seed = Vec::new();
    if cli.resume {
        match read_summary(&session_path)? {
            Some(summary) => seed.push(AgentMessage::user(summary)),
            None => println!(
                "{}",
                style(format!("No saved session at {}", session_path.display())).yellow()
            ),
        }
    }

    let mut agent = build_agent(cli.role, &root, seed)?;
    if let Some(model) = &cli.model {
        agent.set_model(model);
    }
    tracing::info!(role = %cli.role, model = agent.model(), "starting session");

    let roles = RoleRegistry::new(cli.role, agent, default_factory(root));
    let controller = Controller::new(
        roles,
        Box::new(TerminalPrompt::new()),
        session_path,
        Arc::new(AtomicBool::new(false)),
    );
    let status = controller.subscribe();

    print_banner();
    let (events, resume) = spawn_reader(history_file())?;
    let (result, ()) = tokio::join!(
        run(controller, events, resume),
        animate(status, SpinnerDisplay::new())
    );
    result
}
