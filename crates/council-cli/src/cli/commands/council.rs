//! Council pipeline command handlers: ask, continue, rerun, edit.

use anyhow::Result;
use council_app::{Command, Runtime};
use council_core::config::Config;
use council_core::conversation::ExecutionMode;

use super::{open, settle, transcript};

pub async fn ask(
    config: &Config,
    prompt: &str,
    conversation: Option<String>,
    mode: Option<ExecutionMode>,
) -> Result<()> {
    let mut runtime = match conversation {
        Some(id) => open(config, &id).await?,
        None => {
            let mut runtime = Runtime::new(config)?;
            runtime.command(Command::CreateConversation);
            settle(&mut runtime).await?;
            if let Some(id) = runtime.state.conversations.selected.as_deref() {
                println!("Created conversation {id}");
            }
            runtime
        }
    };
    if let Some(mode) = mode {
        runtime.command(Command::SetExecutionMode { mode });
    }

    runtime.command(Command::SendMessage {
        text: prompt.to_string(),
    });
    let outcome = settle(&mut runtime).await;
    // Partial stages are worth printing even when the run failed.
    print_last_answer(&runtime);
    outcome
}

pub async fn continue_next(config: &Config, id: &str) -> Result<()> {
    let mut runtime = open(config, id).await?;
    runtime.command(Command::ContinueNextStage);
    settle(&mut runtime).await?;
    print_last_answer(&runtime);
    Ok(())
}

pub async fn rerun(config: &Config, id: &str, command: Command) -> Result<()> {
    let mut runtime = open(config, id).await?;
    runtime.command(command);
    settle(&mut runtime).await?;
    print_last_answer(&runtime);
    Ok(())
}

pub async fn edit(
    config: &Config,
    id: &str,
    prompt: &str,
    mode: Option<ExecutionMode>,
) -> Result<()> {
    let mut runtime = open(config, id).await?;
    if let Some(mode) = mode {
        runtime.command(Command::SetExecutionMode { mode });
    }
    runtime.command(Command::EditLastPromptAndRestart {
        text: prompt.to_string(),
    });
    let outcome = settle(&mut runtime).await;
    if outcome.is_ok()
        && let Some(conversation) = runtime.state.active_conversation()
    {
        println!("Restarted in conversation {}", conversation.id);
    }
    print_last_answer(&runtime);
    outcome
}

fn print_last_answer(runtime: &Runtime) {
    let Some(conversation) = runtime.state.active_conversation() else {
        return;
    };
    let Some(message) = conversation.last_assistant() else {
        return;
    };
    print!("{}", transcript::format_assistant(message));
    if message.next_continuable_stage().is_some() && message.is_paused() {
        println!("Run `council continue {}` for the next stage.", conversation.id);
    }
}
