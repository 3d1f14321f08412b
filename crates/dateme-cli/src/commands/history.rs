//! The `dateme history` command.

use std::path::PathBuf;

use anyhow::Result;
use uuid::Uuid;

use dateme_core::model::Sender;

pub async fn execute(config_path: Option<PathBuf>, conversation: Uuid) -> Result<()> {
    let config = super::load(config_path.as_deref())?;
    let store = super::open_store(&config)?;

    let messages = super::with_notice(store.list_messages(conversation).await)?;
    if messages.is_empty() {
        println!("No messages in conversation {conversation}.");
        return Ok(());
    }

    for msg in &messages {
        let who = match msg.sender {
            Sender::User => "You",
            Sender::Assistant => "Dateme",
        };
        let mood = msg
            .mood
            .map(|m| format!(" {}", m.emoji()))
            .unwrap_or_default();
        println!(
            "[{}] {who}{mood}: {}",
            msg.timestamp.format("%Y-%m-%d %H:%M"),
            msg.text
        );
        if let Some(image) = &msg.image {
            println!("    [image] {image}");
        }
    }
    Ok(())
}
