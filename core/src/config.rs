use anyhow::{Context, Result};
use std::str::FromStr;

use crate::level::ValidationMode;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_STATIC_DIR: &str = "public";
pub const DEFAULT_MAX_TOKENS: u32 = 4000;
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Which hosted text-generation API the relay talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Provider {
    #[default]
    Anthropic,
    OpenAi,
}

impl Provider {
    pub fn key_var(self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }

    fn base_url_var(self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_BASE_URL",
            Self::OpenAi => "OPENAI_BASE_URL",
        }
    }

    fn default_model(self) -> &'static str {
        match self {
            Self::Anthropic => DEFAULT_ANTHROPIC_MODEL,
            Self::OpenAi => DEFAULT_OPENAI_MODEL,
        }
    }

    fn default_base_url(self) -> &'static str {
        match self {
            Self::Anthropic => ANTHROPIC_BASE_URL,
            Self::OpenAi => OPENAI_BASE_URL,
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            other => Err(format!(
                "unknown provider '{other}' (expected 'anthropic' or 'openai')"
            )),
        }
    }
}

/// Settings for the outbound model call.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: Provider,
    /// May be empty; a missing key only fails once a request is made.
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub base_url: String,
}

impl LlmSettings {
    pub fn anthropic(api_key: impl Into<String>) -> Self {
        Self {
            provider: Provider::Anthropic,
            api_key: api_key.into(),
            model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: ANTHROPIC_BASE_URL.to_string(),
        }
    }

    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            provider: Provider::OpenAi,
            api_key: api_key.into(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind_addr: String,
    pub port: u16,
    pub static_dir: String,
    pub validation: ValidationMode,
    pub llm: LlmSettings,
}

impl RelayConfig {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{raw}'"))?,
            None => DEFAULT_PORT,
        };

        let provider: Provider = match var("LLM_PROVIDER") {
            Some(raw) => raw.parse().map_err(anyhow::Error::msg)?,
            None => Provider::default(),
        };

        let max_tokens: u32 = match var("LLM_MAX_TOKENS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .with_context(|| format!("LLM_MAX_TOKENS must be a positive integer, got '{raw}'"))?,
            None => DEFAULT_MAX_TOKENS,
        };

        let validation: ValidationMode = match var("LEVEL_VALIDATION") {
            Some(raw) => raw.parse().map_err(anyhow::Error::msg)?,
            None => ValidationMode::default(),
        };

        Ok(Self {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            port,
            static_dir: var("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
            validation,
            llm: LlmSettings {
                provider,
                api_key: var(provider.key_var()).unwrap_or_default(),
                model: var("LLM_MODEL").unwrap_or_else(|| provider.default_model().to_string()),
                max_tokens,
                base_url: var(provider.base_url_var())
                    .unwrap_or_else(|| provider.default_base_url().to_string()),
            },
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<RelayConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RelayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn falls_back_to_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert_eq!(config.static_dir, "public");
        assert_eq!(config.validation, ValidationMode::Passthrough);
        assert_eq!(config.llm.provider, Provider::Anthropic);
        assert_eq!(config.llm.model, "claude-sonnet-4-20250514");
        assert_eq!(config.llm.max_tokens, 4000);
        assert_eq!(config.llm.base_url, "https://api.anthropic.com");
        assert!(config.llm.api_key.is_empty());
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("ANTHROPIC_API_KEY", "sk-ant-test"),
            ("LEVEL_VALIDATION", "strict"),
            ("LLM_MAX_TOKENS", "2048"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.llm.api_key, "sk-ant-test");
        assert_eq!(config.validation, ValidationMode::Strict);
        assert_eq!(config.llm.max_tokens, 2048);
    }

    #[test]
    fn openai_provider_uses_its_own_key_and_model() {
        let config = config_from(&[
            ("LLM_PROVIDER", "openai"),
            ("ANTHROPIC_API_KEY", "wrong"),
            ("OPENAI_API_KEY", "sk-openai"),
        ])
        .unwrap();
        assert_eq!(config.llm.provider, Provider::OpenAi);
        assert_eq!(config.llm.api_key, "sk-openai");
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn openai_base_url_is_overridable() {
        let config = config_from(&[
            ("LLM_PROVIDER", "openai"),
            ("ANTHROPIC_BASE_URL", "http://wrong"),
            ("OPENAI_BASE_URL", "http://localhost:11434/v1"),
        ])
        .unwrap();
        assert_eq!(config.llm.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn rejects_zero_or_garbage_max_tokens() {
        let err = config_from(&[("LLM_MAX_TOKENS", "0")]).unwrap_err();
        assert!(err.to_string().contains("positive integer"));
        assert!(config_from(&[("LLM_MAX_TOKENS", "-5")]).is_err());
        assert!(config_from(&[("LLM_MAX_TOKENS", "lots")]).is_err());
    }

    #[test]
    fn rejects_garbage_port() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn rejects_unknown_provider() {
        assert!(config_from(&[("LLM_PROVIDER", "mystery")]).is_err());
    }
}
