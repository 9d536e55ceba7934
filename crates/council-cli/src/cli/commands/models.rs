//! Models command handler.

use anyhow::{Context, Result};
use comfy_table::{ContentArrangement, Table};
use council_app::{Command, Runtime};
use council_core::config::Config;

use super::settle;

pub async fn list(config: &Config) -> Result<()> {
    let mut runtime = Runtime::new(config)?;
    runtime.command(Command::LoadModels);
    settle(&mut runtime).await?;

    let catalog = runtime.state.models.as_ref().context("no model catalog")?;
    if catalog.models.is_empty() {
        println!("The backend offers no models.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Model", "Name", "Context"]);
    for model in &catalog.models {
        table.add_row(vec![
            model.id.clone(),
            model.name.clone().unwrap_or_default(),
            model
                .context_length
                .map(|tokens| tokens.to_string())
                .unwrap_or_default(),
        ]);
    }
    println!("{table}");
    if catalog.cached {
        println!("(served from the backend's cache)");
    }
    Ok(())
}
