//! Conversation command handlers.

use anyhow::{Context, Result};
use comfy_table::{ContentArrangement, Table};
use council_app::{Command, Runtime};
use council_core::config::Config;

use super::{open, settle, transcript};

pub async fn list(config: &Config) -> Result<()> {
    let mut runtime = Runtime::new(config)?;
    runtime.command(Command::RefreshConversations);
    settle(&mut runtime).await?;

    let conversations = &runtime.state.conversations.list;
    if conversations.is_empty() {
        println!("No conversations found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Title", "Messages", "Created"]);
    for summary in conversations {
        table.add_row(vec![
            summary.id.clone(),
            summary.display_title().to_string(),
            summary.message_count.to_string(),
            summary.created_display().unwrap_or_default(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn show(config: &Config, id: &str) -> Result<()> {
    let runtime = open(config, id).await?;
    let conversation = runtime
        .state
        .active_conversation()
        .with_context(|| format!("load conversation '{id}'"))?;
    print!("{}", transcript::format_conversation(conversation));
    Ok(())
}

pub async fn create(config: &Config) -> Result<()> {
    let mut runtime = Runtime::new(config)?;
    runtime.command(Command::CreateConversation);
    settle(&mut runtime).await?;
    let id = runtime
        .state
        .conversations
        .selected
        .as_deref()
        .context("backend returned no conversation")?;
    println!("{id}");
    Ok(())
}

pub async fn delete(config: &Config, id: &str) -> Result<()> {
    let mut runtime = Runtime::new(config)?;
    runtime.command(Command::RefreshConversations);
    settle(&mut runtime).await?;

    runtime.command(Command::DeleteConversation { id: id.to_string() });
    settle(&mut runtime)
        .await
        .with_context(|| format!("delete conversation '{id}'"))?;
    println!("Deleted conversation {id}");
    Ok(())
}

pub async fn rename(config: &Config, id: &str, title: &str) -> Result<()> {
    let mut runtime = open(config, id).await?;
    runtime.command(Command::RenameConversation {
        id: id.to_string(),
        title: title.to_string(),
    });
    settle(&mut runtime).await
}

pub async fn configure(
    config: &Config,
    id: &str,
    models: Vec<String>,
    chairman: Option<String>,
) -> Result<()> {
    let mut runtime = open(config, id).await?;
    runtime.command(Command::UpdateCouncilConfig {
        council_models: (!models.is_empty()).then_some(models),
        chairman_model: chairman,
    });
    settle(&mut runtime).await?;

    let conversation = runtime
        .state
        .active_conversation()
        .with_context(|| format!("load conversation '{id}'"))?;
    if let Some(models) = &conversation.council_models {
        println!("council: {}", models.join(", "));
    }
    if let Some(chairman) = &conversation.chairman_model {
        println!("chairman: {chairman}");
    }
    Ok(())
}
