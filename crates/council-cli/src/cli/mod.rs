//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use council_core::config::{self, Config};
use council_core::conversation::ExecutionMode;
use council_core::logging;

mod commands;

#[derive(Parser)]
#[command(name = "council")]
#[command(version)]
#[command(about = "Ask a council of LLMs, have them rank each other, and get a chairman's verdict")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend URL (overrides config and COUNCIL_BASE_URL)
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Lists conversations
    List,
    /// Shows a conversation with all stages
    Show {
        #[arg(value_name = "CONVERSATION_ID")]
        id: String,
    },
    /// Creates an empty conversation
    New,
    /// Deletes a conversation
    Delete {
        #[arg(value_name = "CONVERSATION_ID")]
        id: String,
    },
    /// Sends a prompt to the council
    Ask {
        /// The prompt to send
        #[arg(value_name = "PROMPT")]
        prompt: String,

        /// Conversation to continue (a new one is created if omitted)
        #[arg(short, long, value_name = "ID")]
        conversation: Option<String>,

        /// Execution mode (auto runs all stages, step pauses after each)
        #[arg(short, long, value_name = "MODE")]
        mode: Option<ExecutionMode>,
    },
    /// Runs the next stage of a paused step-mode message
    Continue {
        #[arg(value_name = "CONVERSATION_ID")]
        id: String,
    },
    /// Reruns part of the last council answer
    Rerun {
        #[arg(value_name = "CONVERSATION_ID")]
        id: String,

        #[command(subcommand)]
        target: RerunCommands,
    },
    /// Replaces the last prompt and replays it in a new conversation
    Edit {
        #[arg(value_name = "CONVERSATION_ID")]
        id: String,

        /// The edited prompt
        #[arg(value_name = "PROMPT")]
        prompt: String,

        /// Execution mode for the replay
        #[arg(short, long, value_name = "MODE")]
        mode: Option<ExecutionMode>,
    },
    /// Renames a conversation
    Rename {
        #[arg(value_name = "CONVERSATION_ID")]
        id: String,
        #[arg(value_name = "TITLE")]
        title: String,
    },
    /// Updates the council members or chairman of a conversation
    Config {
        #[arg(value_name = "CONVERSATION_ID")]
        id: String,

        /// Council member model id (repeatable)
        #[arg(long = "model", value_name = "MODEL")]
        models: Vec<String>,

        /// Chairman model id
        #[arg(long, value_name = "MODEL")]
        chairman: Option<String>,
    },
    /// Lists the models the backend offers
    Models,
}

#[derive(clap::Subcommand)]
enum RerunCommands {
    /// Reruns one model's stage-1 answer
    Stage1 {
        #[arg(value_name = "MODEL")]
        model: String,
    },
    /// Reruns one model's stage-2 ranking
    Stage2 {
        #[arg(value_name = "MODEL")]
        model: String,
    },
    /// Reruns the chairman's synthesis
    Stage3,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().context("load config")?;
    if let Some(url) = cli.base_url.as_deref() {
        config.base_url = config::resolve_base_url(Some(url.to_string()), &config.base_url)
            .context("invalid --base-url")?;
    }

    // Logging is best effort; commands still work without a log file.
    let _log_guard = match logging::init(&config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: logging disabled: {e:#}");
            None
        }
    };

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli.command, &config).await })
}

async fn dispatch(command: Commands, config: &Config) -> Result<()> {
    tracing::debug!(base_url = %config.base_url, "dispatching command");
    match command {
        Commands::List => commands::conversations::list(config).await,
        Commands::Show { id } => commands::conversations::show(config, &id).await,
        Commands::New => commands::conversations::create(config).await,
        Commands::Delete { id } => commands::conversations::delete(config, &id).await,
        Commands::Ask {
            prompt,
            conversation,
            mode,
        } => commands::council::ask(config, &prompt, conversation, mode).await,
        Commands::Continue { id } => commands::council::continue_next(config, &id).await,
        Commands::Rerun { id, target } => {
            let command = match target {
                RerunCommands::Stage1 { model } => {
                    council_app::Command::RerunStage1Model { model }
                }
                RerunCommands::Stage2 { model } => {
                    council_app::Command::RerunStage2Model { model }
                }
                RerunCommands::Stage3 => council_app::Command::RerunStage3,
            };
            commands::council::rerun(config, &id, command).await
        }
        Commands::Edit { id, prompt, mode } => {
            commands::council::edit(config, &id, &prompt, mode).await
        }
        Commands::Rename { id, title } => {
            commands::conversations::rename(config, &id, &title).await
        }
        Commands::Config {
            id,
            models,
            chairman,
        } => commands::conversations::configure(config, &id, models, chairman).await,
        Commands::Models => commands::models::list(config).await,
    }
}
