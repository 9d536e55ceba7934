//! CLI command handlers.
//!
//! Each handler drives a `Runtime` with view commands, waits until all
//! spawned work has reported back, and prints the reconciled state.

pub mod conversations;
pub mod council;
pub mod models;
pub mod transcript;

use anyhow::{Result, bail};
use council_app::{Command, Runtime};
use council_core::config::Config;

/// Runs outstanding work to completion and surfaces the final status.
///
/// An error status becomes the command's error.
pub async fn settle(runtime: &mut Runtime) -> Result<()> {
    runtime.run_until_idle().await;
    match runtime.state.take_status() {
        Some(status) if status.is_error() => bail!("{}", status.message),
        Some(status) => {
            println!("{}", status.message);
            Ok(())
        }
        None => Ok(()),
    }
}

/// Builds a runtime with the conversation list and `id` loaded.
pub async fn open(config: &Config, id: &str) -> Result<Runtime> {
    let mut runtime = Runtime::new(config)?;
    runtime.command(Command::RefreshConversations);
    runtime.command(Command::SelectConversation { id: id.to_string() });
    settle(&mut runtime).await?;
    if runtime.state.active_conversation().is_none() {
        bail!("Conversation {id} could not be loaded");
    }
    Ok(runtime)
}
