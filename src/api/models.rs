use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use url::Url;
use uuid::Uuid;

use crate::capture::{CapturedPage, NewCapture};
use crate::error::{AppError, FieldError, Result};
use crate::summary::SummaryResult;
use crate::text::char_count;

const MIN_CONTENT_CHARS: usize = 10;
const MAX_TITLE_CHARS: usize = 200;

/// Body of `POST /api/capture`. `wordCount` and `contentLength` are checked
/// but the stored values are always recomputed from the content.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRequest {
    pub url: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub word_count: Option<i64>,
    pub content_length: Option<i64>,
    pub timestamp: Option<String>,
}

impl CaptureRequest {
    pub fn validate(self) -> Result<NewCapture> {
        let mut errors = Vec::new();

        let url = match self.url.as_deref().map(str::trim) {
            Some(url) if is_web_url(url) => url.to_string(),
            _ => {
                errors.push(FieldError::new("url", "Invalid or missing URL"));
                String::new()
            }
        };
        let content = check_content(self.content, &mut errors);
        check_title(self.title.as_deref(), &mut errors);
        for (field, value) in [("wordCount", self.word_count), ("contentLength", self.content_length)] {
            if matches!(value, Some(n) if n < 1) {
                errors.push(FieldError::new(field, "Must be a positive integer"));
            }
        }
        let captured_at = match self.timestamp.as_deref() {
            None => None,
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(ts) => Some(ts.with_timezone(&Utc)),
                Err(_) => {
                    errors.push(FieldError::new("timestamp", "Must be an ISO 8601 date"));
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        Ok(NewCapture {
            url,
            title: self.title,
            content,
            captured_at,
        })
    }
}

/// Body of `POST /api/summarize`.
#[derive(Deserialize)]
pub struct SummarizeRequest {
    pub content: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
}

/// Ad hoc content accepted for summarization.
#[derive(Debug)]
pub struct AdHocContent {
    pub content: String,
    pub url: String,
    pub title: String,
}

impl SummarizeRequest {
    pub fn validate(self) -> Result<AdHocContent> {
        let mut errors = Vec::new();
        let content = check_content(self.content, &mut errors);
        let url = self.url.map(|u| u.trim().to_string()).unwrap_or_default();
        if !url.is_empty() && !is_web_url(&url) {
            errors.push(FieldError::new("url", "Invalid URL"));
        }
        check_title(self.title.as_deref(), &mut errors);

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        Ok(AdHocContent {
            content,
            url,
            title: self.title.unwrap_or_default(),
        })
    }
}

fn check_content(content: Option<String>, errors: &mut Vec<FieldError>) -> String {
    match content {
        Some(content) if char_count(&content) >= MIN_CONTENT_CHARS => content,
        _ => {
            errors.push(FieldError::new("content", "Content is too short"));
            String::new()
        }
    }
}

fn check_title(title: Option<&str>, errors: &mut Vec<FieldError>) {
    if matches!(title, Some(t) if char_count(t) > MAX_TITLE_CHARS) {
        errors.push(FieldError::new("title", "Title must be at most 200 characters"));
    }
}

fn is_web_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

pub fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::invalid("id", "Invalid ID"))
}

#[derive(Deserialize, Default)]
pub struct ListQuery {
    pub url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureCreated {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub word_count: usize,
    pub timestamp: DateTime<Utc>,
}

impl From<&CapturedPage> for CaptureCreated {
    fn from(page: &CapturedPage) -> Self {
        Self {
            id: page.id,
            url: page.url.clone(),
            title: page.title.clone(),
            word_count: page.word_count,
            timestamp: page.captured_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureListItem {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub word_count: usize,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<CapturedPage> for CaptureListItem {
    fn from(page: CapturedPage) -> Self {
        Self {
            id: page.id,
            url: page.url,
            title: page.title,
            word_count: page.word_count,
            timestamp: page.captured_at,
            created_at: page.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct CaptureList {
    pub count: usize,
    pub captures: Vec<CaptureListItem>,
}

#[derive(Serialize)]
pub struct DeletedCapture {
    pub id: Uuid,
    pub url: String,
    pub title: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub summary: Option<SummaryResult>,
    pub summary_generated_at: Option<DateTime<Utc>>,
    pub cached: bool,
}

impl SummaryResponse {
    pub fn from_page(page: CapturedPage, cached: bool) -> Self {
        Self {
            id: page.id,
            url: page.url,
            title: page.title,
            summary: page.summary,
            summary_generated_at: page.summary_generated_at,
            cached,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdHocSummary {
    pub summary: SummaryResult,
    pub generated_at: DateTime<Utc>,
}
