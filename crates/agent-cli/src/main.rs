//! Interactive chat with the investment assistant

mod repl;
mod transcript;

use agent_suql::{Agent, DialogueHistory};
use agent_utils::{AppConfig, Verbosity, init_tracing_with_level};
use chrono::Local;
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "agent-cli")]
#[command(about = "Chat with the investment assistant", long_about = None)]
struct Args {
    /// Transcript log appended to when the session ends
    #[arg(long, default_value = "log.log")]
    output_file: PathBuf,

    /// Inputs that end the session
    #[arg(long, num_args = 1.., default_values_t = ["quit".to_string(), "q".to_string()])]
    quit_commands: Vec<String>,

    /// Only log errors and hide stage timings
    #[arg(long)]
    no_logging: bool,

    /// Ask the model whether a turn needs the database before querying
    #[arg(long)]
    enable_classifier: bool,

    /// TOML configuration file; environment variables otherwise
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let verbosity = if args.no_logging {
        Verbosity::Quiet
    } else {
        Verbosity::Verbose
    };
    init_tracing_with_level(verbosity);

    let mut app = match &args.config {
        Some(path) => AppConfig::from_toml_file(path)?,
        None => AppConfig::from_env()?,
    };
    if args.enable_classifier {
        app.enable_classifier = true;
    }
    let agent = Agent::from_app_config(&app)?;

    let session = Uuid::new_v4();
    info!(%session, "Starting chat session");

    let mut history = DialogueHistory::new();
    let result = repl::run(
        &agent,
        &mut history,
        io::stdin().lock(),
        io::stdout(),
        &args.quit_commands,
        verbosity == Verbosity::Verbose,
    )
    .instrument(info_span!("session", id = %session))
    .await;

    if let Err(e) = &result {
        error!("Session ended with an error: {}", e);
    }
    transcript::append(&args.output_file, &history, &Local::now())?;
    info!("Transcript appended to {}", args.output_file.display());
    result
}
