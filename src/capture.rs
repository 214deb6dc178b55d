use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::summary::SummaryResult;
use crate::text::{char_count, truncate_chars, word_count, MAX_CONTENT_CHARS};

pub const DEFAULT_TITLE: &str = "Untitled";

/// A validated capture submission, before it is stored.
#[derive(Debug, Clone)]
pub struct NewCapture {
    pub url: String,
    pub title: Option<String>,
    pub content: String,
    pub captured_at: Option<DateTime<Utc>>,
}

/// One stored page capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedPage {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub content: String,
    pub word_count: usize,
    pub content_length: usize,
    pub captured_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub summary: Option<SummaryResult>,
    pub summary_generated_at: Option<DateTime<Utc>>,
}

impl CapturedPage {
    /// Builds a record from a submission. Content is cut to the storage
    /// bound and the derived counts are computed from what is kept, never
    /// taken from the caller.
    pub fn new(input: NewCapture) -> Self {
        let now = Utc::now();
        let content = truncate_chars(&input.content, MAX_CONTENT_CHARS).to_string();
        let title = input
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        Self {
            id: Uuid::new_v4(),
            url: input.url.trim().to_string(),
            title,
            word_count: word_count(&content),
            content_length: char_count(&content),
            content,
            captured_at: input.captured_at.unwrap_or(now),
            created_at: now,
            summary: None,
            summary_generated_at: None,
        }
    }
}
