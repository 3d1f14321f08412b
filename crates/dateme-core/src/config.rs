//! Configuration loading.
//!
//! Two secrets matter: the LLM API key and the persistence credentials.
//! Both are read once at startup from a TOML file, with `${VAR}` references
//! and `DATEME_*` environment overrides applied on top.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// OpenAI-compatible chat completion settings.
///
/// Note: Custom Debug impl masks the API key to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAiSettings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl std::fmt::Debug for OpenAiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiSettings")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("org_id", &self.org_id)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_max_tokens() -> u32 {
    500
}
fn default_temperature() -> f64 {
    0.8
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            org_id: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Hosted backend (Supabase / PostgREST) settings.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SupabaseSettings {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    #[serde(default)]
    pub url: String,
    /// Public anon key sent as the `apikey` header.
    #[serde(default)]
    pub anon_key: String,
    /// The signed-in user's session JWT.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl std::fmt::Debug for SupabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseSettings")
            .field("url", &self.url)
            .field("anon_key", &"***")
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Top-level dateme configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatemeConfig {
    #[serde(default)]
    pub openai: OpenAiSettings,
    #[serde(default)]
    pub supabase: SupabaseSettings,
}

impl DatemeConfig {
    /// Fail early with a readable message when the LLM key is missing.
    pub fn require_openai(&self) -> Result<&OpenAiSettings> {
        anyhow::ensure!(
            !self.openai.api_key.is_empty(),
            "no OpenAI API key configured (set openai.api_key or DATEME_OPENAI_KEY)"
        );
        Ok(&self.openai)
    }

    pub fn require_supabase(&self) -> Result<&SupabaseSettings> {
        anyhow::ensure!(
            !self.supabase.url.is_empty() && !self.supabase.anon_key.is_empty(),
            "persistence backend not configured (set supabase.url and supabase.anon_key)"
        );
        Ok(&self.supabase)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        // Substituted values are copied as-is, never expanded again.
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_config(config: &mut DatemeConfig) {
    let openai = &mut config.openai;
    openai.api_key = resolve_env_vars(&openai.api_key);
    openai.base_url = openai.base_url.as_deref().map(resolve_env_vars);
    openai.org_id = openai.org_id.as_deref().map(resolve_env_vars);

    let supabase = &mut config.supabase;
    supabase.url = resolve_env_vars(&supabase.url);
    supabase.anon_key = resolve_env_vars(&supabase.anon_key);
    supabase.access_token = supabase
        .access_token
        .as_deref()
        .map(resolve_env_vars)
        .filter(|t| !t.is_empty());
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `dateme.toml` in the current directory
/// 2. `~/.config/dateme/config.toml`
///
/// Environment variable overrides: `DATEME_OPENAI_KEY`, `DATEME_SUPABASE_URL`,
/// `DATEME_SUPABASE_KEY`, `DATEME_ACCESS_TOKEN`.
pub fn load_config() -> Result<DatemeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<DatemeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("dateme.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<DatemeConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => DatemeConfig::default(),
    };

    resolve_config(&mut config);

    if let Ok(key) = std::env::var("DATEME_OPENAI_KEY") {
        config.openai.api_key = key;
    }
    if let Ok(url) = std::env::var("DATEME_SUPABASE_URL") {
        config.supabase.url = url;
    }
    if let Ok(key) = std::env::var("DATEME_SUPABASE_KEY") {
        config.supabase.anon_key = key;
    }
    if let Ok(token) = std::env::var("DATEME_ACCESS_TOKEN") {
        config.supabase.access_token = Some(token);
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("dateme"))
}

/// Starter config written by `dateme init`.
pub const SAMPLE_CONFIG: &str = r#"# dateme configuration

[openai]
api_key = "${OPENAI_API_KEY}"
model = "gpt-4o-mini"
max_tokens = 500
temperature = 0.8

[supabase]
url = "https://your-project.supabase.co"
anon_key = "${SUPABASE_ANON_KEY}"
access_token = "${SUPABASE_ACCESS_TOKEN}"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_DATEME_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_DATEME_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_DATEME_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${unterminated"), "${unterminated");
        std::env::remove_var("_DATEME_TEST_VAR");
    }

    #[test]
    fn resolved_values_are_not_expanded_again() {
        std::env::set_var("_DATEME_SELF_REF", "${_DATEME_SELF_REF}");
        assert_eq!(
            resolve_env_vars("key=${_DATEME_SELF_REF}"),
            "key=${_DATEME_SELF_REF}"
        );
        std::env::set_var("_DATEME_NESTED", "${HOME}");
        assert_eq!(resolve_env_vars("${_DATEME_NESTED}/x"), "${HOME}/x");
        std::env::remove_var("_DATEME_SELF_REF");
        std::env::remove_var("_DATEME_NESTED");
    }

    #[test]
    fn default_config() {
        let config = DatemeConfig::default();
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.openai.max_tokens, 500);
        assert!((config.openai.temperature - 0.8).abs() < f64::EPSILON);
        assert!(config.require_openai().is_err());
        assert!(config.require_supabase().is_err());
    }

    #[test]
    fn parse_sample_config() {
        let config: DatemeConfig = toml::from_str(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.supabase.url, "https://your-project.supabase.co");
        assert_eq!(config.openai.api_key, "${OPENAI_API_KEY}");
    }

    #[test]
    fn debug_masks_secrets() {
        let config = DatemeConfig {
            openai: OpenAiSettings {
                api_key: "sk-secret".into(),
                ..Default::default()
            },
            supabase: SupabaseSettings {
                url: "https://x.supabase.co".into(),
                anon_key: "anon-secret".into(),
                access_token: Some("jwt-secret".into()),
            },
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(!debug.contains("anon-secret"));
        assert!(!debug.contains("jwt-secret"));
        assert!(debug.contains("x.supabase.co"));
    }

    #[test]
    fn load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dateme.toml");
        std::fs::write(
            &path,
            "[openai]\napi_key = \"sk-file\"\nmodel = \"gpt-4o\"\n\n[supabase]\nurl = \"https://a.supabase.co\"\nanon_key = \"anon\"\naccess_token = \"\"\n",
        )
        .unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.openai.max_tokens, 500);
        assert!(config.require_supabase().is_ok());

        assert!(load_config_from(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
