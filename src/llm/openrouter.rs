use serde::Serialize;
use reqwest::Client;
use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::error::{Result, AppError};
use super::{http_client, reject_status, require_key, GenerationProvider};

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
}

/// OpenAI-compatible chat completions through OpenRouter.
pub struct OpenRouterProvider {
    client: Client,
    config: ProviderConfig,
}

impl OpenRouterProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        Ok(Self { client: http_client(&config)?, config })
    }
}

#[async_trait]
impl GenerationProvider for OpenRouterProvider {
    fn model(&self) -> &str {
        &self.config.model
    }

    fn ensure_credential(&self) -> Result<()> {
        require_key(&self.config).map(|_| ())
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = require_key(&self.config)?;
        let body = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                Message {
                    role: "user".into(),
                    content: prompt.into(),
                }
            ],
        };

        let res = self
            .client
            .post(format!("{}/v1/chat/completions", self.config.base_url))
            .bearer_auth(api_key)
            .header("X-Title", "page-digest")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Llm(e.to_string()))?;
        let res = reject_status(res).await?;

        let json: serde_json::Value = res.json().await.map_err(|e| AppError::Llm(e.to_string()))?;
        let reply = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AppError::Llm("Invalid response format from LLM".to_string()))?
            .to_string();

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    fn config(server: &MockServer, key: Option<&str>) -> ProviderConfig {
        let mut config = ProviderConfig::new(ProviderKind::OpenRouter, key.map(str::to_string));
        config.base_url = server.uri();
        config
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": "{\"summary\": \"ok\"}" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenRouterProvider::new(config(&server, Some("sk-test"))).unwrap();
        let reply = provider.generate("prompt").await.unwrap();
        assert_eq!(reply, "{\"summary\": \"ok\"}");
    }

    #[tokio::test]
    async fn unexpected_body_is_an_llm_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
            .mount(&server)
            .await;

        let provider = OpenRouterProvider::new(config(&server, Some("sk-test"))).unwrap();
        let err = provider.generate("prompt").await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[tokio::test]
    async fn missing_key_is_reported() {
        let server = MockServer::start().await;
        let provider = OpenRouterProvider::new(config(&server, None)).unwrap();
        let err = provider.ensure_credential().unwrap_err();
        assert!(err.to_string().contains("OPENROUTER_API_KEY"));
    }
}
