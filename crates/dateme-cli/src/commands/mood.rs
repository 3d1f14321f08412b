//! The `dateme mood` command.

use std::path::PathBuf;

use anyhow::Result;
use uuid::Uuid;

use dateme_core::error::user_notice;
use dateme_core::model::Mood;

pub async fn execute(config_path: Option<PathBuf>, conversation: Uuid, mood: Mood) -> Result<()> {
    let config = super::load(config_path.as_deref())?;
    let mut session = super::open_conversation(&config, conversation).await?;

    if let Err(e) = session.set_mood(mood).await {
        eprintln!("{}", user_notice(&e));
        return Err(e);
    }
    println!("Mood set to {} {}", mood.emoji(), mood);
    Ok(())
}
