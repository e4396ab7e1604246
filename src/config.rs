//! Process configuration
//!
//! Credentials and model parameters are resolved once at startup (the
//! binaries load `.env` first) and passed into components explicitly.
//! Core logic never reads the environment.

use crate::error::AgentError;
use crate::Result;
use std::env;

pub const DEFAULT_OPENROUTER_BASE: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_GRAPH_BASE: &str = "http://localhost:8081";
pub const DEFAULT_MAX_HOPS: usize = 3;

#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// OpenRouter API key (OpenAI-compatible endpoint).
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Base URL of the graph query backend.
    pub graph_base_url: String,
    pub default_max_hops: usize,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OPEN_ROUTER_KEY").unwrap_or_default();
        validate_api_key(&api_key)?;

        Ok(Self {
            api_key,
            api_base: env::var("OPEN_ROUTER_API_BASE")
                .unwrap_or_else(|_| DEFAULT_OPENROUTER_BASE.to_string()),
            model: env::var("AGENT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            temperature: 0.1,
            max_tokens: 2000,
            graph_base_url: env::var("GRAPH_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GRAPH_BASE.to_string()),
            default_max_hops: DEFAULT_MAX_HOPS,
        })
    }
}

fn validate_api_key(key: &str) -> Result<()> {
    if key.is_empty() || key == "your_openrouter_api_key_here" {
        return Err(AgentError::Config(
            "OPEN_ROUTER_KEY is not set or still holds the placeholder value".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_missing_key() {
        assert!(validate_api_key("").is_err());
    }

    #[test]
    fn test_rejects_placeholder_key() {
        assert!(validate_api_key("your_openrouter_api_key_here").is_err());
    }

    #[test]
    fn test_accepts_real_key() {
        assert!(validate_api_key("sk-or-v1-abc123").is_ok());
    }
}
