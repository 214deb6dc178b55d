//! Submits extracted pages to a running backend.

use chrono::{DateTime, Utc};
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{AppError, Result};
use crate::extractor::ExtractedPage;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CapturePayload<'a> {
    url: &'a str,
    title: &'a str,
    content: &'a str,
    word_count: usize,
    content_length: usize,
    timestamp: DateTime<Utc>,
}

/// What the backend reports back for a stored capture.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureReceipt {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub word_count: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

pub struct CaptureClient {
    http: Client,
    api_url: String,
}

impl CaptureClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = ClientBuilder::new()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            api_url: config.api_url.clone(),
        })
    }

    /// Sends `page` to `POST /api/capture`. Pages with too little text are
    /// rejected before any request is made.
    pub async fn submit(&self, page: &ExtractedPage) -> Result<CaptureReceipt> {
        page.ensure_submittable()?;

        let payload = CapturePayload {
            url: &page.url,
            title: &page.title,
            content: &page.content,
            word_count: page.word_count,
            content_length: page.content_length,
            timestamp: Utc::now(),
        };
        let response = self
            .http
            .post(format!("{}/api/capture", self.api_url))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());
            return Err(AppError::Fetch(format!("API request failed: {} {}", status.as_u16(), message)));
        }

        let receipt = response
            .json::<Envelope<CaptureReceipt>>()
            .await?
            .data
            .ok_or_else(|| AppError::Fetch("API response carried no data".to_string()))?;
        info!(id = %receipt.id, words = receipt.word_count, "capture submitted");
        Ok(receipt)
    }
}
