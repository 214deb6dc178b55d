pub mod gemini;
pub mod openrouter;

use std::sync::Arc;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response};

use crate::config::{ProviderConfig, ProviderKind};
use crate::error::{AppError, Result};

pub use gemini::GeminiProvider;
pub use openrouter::OpenRouterProvider;

/// A text-generation service: prompt in, raw text out.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Model identifier recorded in summary metadata.
    fn model(&self) -> &str;

    /// Checked before any network access.
    fn ensure_credential(&self) -> Result<()>;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn GenerationProvider>> {
    let provider: Arc<dyn GenerationProvider> = match config.kind {
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(config.clone())?),
        ProviderKind::OpenRouter => Arc::new(OpenRouterProvider::new(config.clone())?),
    };
    Ok(provider)
}

fn http_client(config: &ProviderConfig) -> Result<Client> {
    ClientBuilder::new()
        .timeout(config.timeout)
        .build()
        .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))
}

fn require_key(config: &ProviderConfig) -> Result<&str> {
    config
        .api_key
        .as_deref()
        .ok_or_else(|| AppError::Config(format!("{} is not configured", config.key_var())))
}

/// Turns a non-success provider response into an error carrying the
/// provider's own message when it sent one.
async fn reject_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|json| json["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(body);
    Err(AppError::Llm(format!("Provider returned {}: {}", status, message.trim())))
}
