use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_OPENROUTER_MODEL: &str = "deepseek/deepseek-chat-v3-0324";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api";

/// Local development backend used by the `capture` binary when nothing else is set.
pub const DEFAULT_API_URL: &str = "http://localhost:3001";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenRouter,
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "openrouter" => Ok(ProviderKind::OpenRouter),
            other => Err(AppError::Config(format!("Unknown LLM provider: {}", other))),
        }
    }
}

/// Everything a generation provider needs, handed to it explicitly.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind, api_key: Option<String>) -> Self {
        let (model, base_url) = match kind {
            ProviderKind::Gemini => (DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_BASE_URL),
            ProviderKind::OpenRouter => (DEFAULT_OPENROUTER_MODEL, DEFAULT_OPENROUTER_BASE_URL),
        };
        Self {
            kind,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.to_string(),
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Name of the environment variable holding this provider's credential.
    pub fn key_var(&self) -> &'static str {
        match self.kind {
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::OpenRouter => "OPENROUTER_API_KEY",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub provider: ProviderConfig,
    pub request_timeout: Duration,
    /// Exact origins allowed in addition to extensions and localhost.
    pub allowed_origins: Vec<String>,
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
    pub data_file: Option<PathBuf>,
    pub recent_limit: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so tests never touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("PORT").unwrap_or_else(|| "3001".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::Config(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::Config(format!("Invalid host address: {}", e)))?;
        let server_addr = SocketAddr::new(ip, port);

        let kind = match lookup("LLM_PROVIDER") {
            Some(value) => value.parse()?,
            None => ProviderKind::Gemini,
        };
        let mut provider = ProviderConfig::new(kind, None);
        provider.api_key = lookup(provider.key_var()).filter(|k| !k.trim().is_empty());
        if let Some(model) = lookup("LLM_MODEL") {
            provider.model = model;
        }
        if let Some(base_url) = lookup("LLM_BASE_URL") {
            provider.base_url = base_url.trim_end_matches('/').to_string();
        }
        provider.timeout = Duration::from_secs(parse_or(&lookup, "LLM_TIMEOUT_SECS", 60)?);

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Config {
            server_addr,
            provider,
            request_timeout: Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 90)?),
            allowed_origins,
            rate_limit_max: parse_or(&lookup, "RATE_LIMIT_MAX", 100)?,
            rate_limit_window: Duration::from_secs(parse_or(&lookup, "RATE_LIMIT_WINDOW_SECS", 15 * 60)?),
            data_file: lookup("DATA_FILE").filter(|p| !p.is_empty()).map(PathBuf::from),
            recent_limit: parse_or(&lookup, "RECENT_LIMIT", 100)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid {}: {}", key, e))),
        None => Ok(default),
    }
}

/// Settings for the capture client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn load(api_override: Option<String>) -> Self {
        dotenv::dotenv().ok();
        let api_url = api_override
            .or_else(|| env::var("PAGE_DIGEST_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.server_addr.to_string(), "127.0.0.1:3001");
        assert_eq!(config.provider.kind, ProviderKind::Gemini);
        assert_eq!(config.provider.model, DEFAULT_GEMINI_MODEL);
        assert!(config.provider.api_key.is_none());
        assert_eq!(config.rate_limit_max, 100);
        assert_eq!(config.rate_limit_window, Duration::from_secs(900));
        assert_eq!(config.recent_limit, 100);
        assert_eq!(config.allowed_origins, vec!["http://localhost:3000".to_string()]);
    }

    #[test]
    fn reads_provider_specific_key() {
        let config = Config::from_lookup(lookup_from(&[
            ("LLM_PROVIDER", "openrouter"),
            ("OPENROUTER_API_KEY", "sk-test"),
            ("GEMINI_API_KEY", "ignored"),
        ]))
        .unwrap();
        assert_eq!(config.provider.kind, ProviderKind::OpenRouter);
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.provider.model, DEFAULT_OPENROUTER_MODEL);
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let config = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "  ")])).unwrap();
        assert!(config.provider.api_key.is_none());
    }

    #[test]
    fn rejects_invalid_numbers() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        let err = Config::from_lookup(lookup_from(&[("RATE_LIMIT_MAX", "-1")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn rejects_unknown_provider() {
        let err = Config::from_lookup(lookup_from(&[("LLM_PROVIDER", "mystery")])).unwrap_err();
        assert!(err.to_string().contains("mystery"));
    }
}
