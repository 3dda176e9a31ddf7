use anyhow::{bail, Context, Result};

const DEFAULT_AI_MODEL: &str = "mistralai/mistral-small-3.2-24b-instruct:free";
const DEFAULT_AI_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const DEFAULT_SITE_URL: &str = "http://localhost:3000";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Which response contract the polish prompt asks the model for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// A single JSON object shaped like the resume model.
    Structured,
    /// Legacy plain-text resume with blank-line separated sections.
    FreeText,
}

impl PromptMode {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "structured" | "json" => Ok(PromptMode::Structured),
            "free_text" | "text" | "legacy" => Ok(PromptMode::FreeText),
            other => bail!("PROMPT_MODE must be 'structured' or 'free_text', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openrouter_api_key: String,
    pub ai_model: String,
    pub ai_api_url: String,
    pub site_url: String,
    pub prompt_mode: PromptMode,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openrouter_api_key: require_env("OPENROUTER_API_KEY")?,
            ai_model: env_or("AI_MODEL", DEFAULT_AI_MODEL),
            ai_api_url: env_or("AI_API_URL", DEFAULT_AI_API_URL),
            site_url: env_or("SITE_URL", DEFAULT_SITE_URL),
            prompt_mode: PromptMode::parse(&env_or("PROMPT_MODE", "structured"))?,
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", &DEFAULT_MAX_UPLOAD_BYTES.to_string())
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// Defaults for everything optional; used by router tests.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            openrouter_api_key: "test-key".to_string(),
            ai_model: DEFAULT_AI_MODEL.to_string(),
            ai_api_url: DEFAULT_AI_API_URL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            prompt_mode: PromptMode::Structured,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mode_parse() {
        assert_eq!(PromptMode::parse("structured").unwrap(), PromptMode::Structured);
        assert_eq!(PromptMode::parse(" FREE_TEXT ").unwrap(), PromptMode::FreeText);
        assert!(PromptMode::parse("yaml").is_err());
    }
}
