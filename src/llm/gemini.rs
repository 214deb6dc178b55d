use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::config::ProviderConfig;
use crate::error::{AppError, Result};
use super::{http_client, reject_status, require_key, GenerationProvider};

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

/// Google Gemini `generateContent` over REST.
pub struct GeminiProvider {
    client: Client,
    config: ProviderConfig,
}

impl GeminiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        Ok(Self { client: http_client(&config)?, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    fn model(&self) -> &str {
        &self.config.model
    }

    fn ensure_credential(&self) -> Result<()> {
        require_key(&self.config).map(|_| ())
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = require_key(&self.config)?;
        let body = GenerateRequest {
            contents: vec![Content { parts: vec![Part { text: prompt }] }],
        };

        let res = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Llm(e.to_string()))?;
        let res = reject_status(res).await?;

        let json: serde_json::Value = res.json().await.map_err(|e| AppError::Llm(e.to_string()))?;
        let parts = json["candidates"][0]["content"]["parts"]
            .as_array()
            .ok_or_else(|| {
                let reason = json["promptFeedback"]["blockReason"].as_str().unwrap_or("no candidates");
                AppError::Llm(format!("Invalid response format from LLM: {}", reason))
            })?;

        let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
        if text.is_empty() {
            return Err(AppError::Llm("Empty response from LLM".to_string()));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path},
    };

    fn provider(server: &MockServer, key: Option<&str>) -> GeminiProvider {
        let mut config = ProviderConfig::new(ProviderKind::Gemini, key.map(str::to_string));
        config.base_url = server.uri();
        GeminiProvider::new(config).unwrap()
    }

    #[tokio::test]
    async fn joins_candidate_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-pro:generateContent"))
            .and(header("x-goog-api-key", "g-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{ "parts": [{ "text": "the prompt" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{ "content": { "parts": [{ "text": "{\"summary\":" }, { "text": " \"x\"}" }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = provider(&server, Some("g-key")).generate("the prompt").await.unwrap();
        assert_eq!(reply, "{\"summary\": \"x\"}");
    }

    #[tokio::test]
    async fn error_status_carries_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": { "code": 403, "message": "API key not valid" }
            })))
            .mount(&server)
            .await;

        let err = provider(&server, Some("bad")).generate("p").await.unwrap_err();
        match err {
            AppError::Llm(msg) => {
                assert!(msg.contains("403"));
                assert!(msg.contains("API key not valid"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn blocked_prompt_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let err = provider(&server, Some("k")).generate("p").await.unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn missing_key_never_sends() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = provider(&server, None);
        assert!(provider.ensure_credential().is_err());
        assert!(provider.generate("p").await.is_err());
    }
}
