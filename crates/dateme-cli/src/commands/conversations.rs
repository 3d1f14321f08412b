//! The `dateme conversations` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = super::load(config_path.as_deref())?;
    let store = super::open_store(&config)?;

    let conversations = super::with_notice(store.list_conversations().await)?;
    if conversations.is_empty() {
        println!("No conversations yet. Run `dateme chat` to start one.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Preview", "Mood", "Updated"]);

    for conv in &conversations {
        let mood = conv.user_preferences.mood;
        table.add_row(vec![
            Cell::new(conv.id),
            Cell::new(&conv.title),
            Cell::new(&conv.preview),
            Cell::new(format!("{} {}", mood.emoji(), mood)),
            Cell::new(conv.updated_at.format("%Y-%m-%d %H:%M")),
        ]);
    }

    println!("{table}");
    Ok(())
}
