//! The `dateme models` command.

use std::path::PathBuf;

use anyhow::Result;

use dateme_providers::create_provider;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = super::load(config_path.as_deref())?;
    let settings = config.require_openai()?;
    let provider = create_provider(settings)?;

    println!("Provider: {}", provider.name());
    for model in provider.available_models() {
        let marker = if model.id == settings.model { "*" } else { " " };
        println!(
            "{marker} {} - {} ({}K context{})",
            model.id,
            model.name,
            model.max_context / 1000,
            if model.vision { ", images" } else { "" },
        );
    }
    Ok(())
}
