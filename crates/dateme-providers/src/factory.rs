//! Provider factory.

use std::sync::Arc;

use anyhow::Result;

use dateme_core::config::OpenAiSettings;
use dateme_core::traits::ChatProvider;

use crate::openai::OpenAiProvider;

/// Create the chat provider described by the settings.
pub fn create_provider(settings: &OpenAiSettings) -> Result<Arc<dyn ChatProvider>> {
    anyhow::ensure!(!settings.api_key.is_empty(), "OpenAI API key is empty");
    let provider = OpenAiProvider::new(
        &settings.api_key,
        settings.base_url.clone(),
        settings.org_id.clone(),
    )?;
    tracing::debug!(model = %settings.model, "created openai provider");
    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_key() {
        assert!(create_provider(&OpenAiSettings::default()).is_err());
    }

    #[test]
    fn builds_openai_provider() {
        let settings = OpenAiSettings {
            api_key: "sk-test".into(),
            ..Default::default()
        };
        let provider = create_provider(&settings).unwrap();
        assert_eq!(provider.name(), "openai");
    }
}
