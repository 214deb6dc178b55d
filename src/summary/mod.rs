pub mod adapter;
pub mod cache;
pub mod parse;
pub mod prompt;

pub use adapter::{Summarizer, SummaryOutcome};
pub use cache::{decide, CacheDecision};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Structured summary attached to a capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub summary: String,
    pub key_insights: Vec<String>,
    pub actionable_suggestions: Vec<String>,
    pub content_type: String,
    pub estimated_reading_time: String,
    pub word_count: usize,
    pub metadata: SummaryMetadata,
    /// Set when generation or parsing failed and the other fields are placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetadata {
    pub source_url: String,
    pub source_title: String,
    pub original_content_length: usize,
    pub generated_at: DateTime<Utc>,
    pub model: String,
}

impl SummaryMetadata {
    pub fn new(url: &str, title: &str, original_content_length: usize, model: &str) -> Self {
        Self {
            source_url: url.to_string(),
            source_title: title.to_string(),
            original_content_length,
            generated_at: Utc::now(),
            model: model.to_string(),
        }
    }
}

fn owned(items: [&str; 3]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl SummaryResult {
    /// Placeholder returned when the provider answered but no usable JSON came back.
    pub fn fallback(word_count: usize, metadata: SummaryMetadata) -> Self {
        Self {
            summary: "Unable to generate structured summary due to parsing error".to_string(),
            key_insights: owned([
                "Content analysis was attempted but failed",
                "Please try again or check the content format",
                "Consider using a different content source",
            ]),
            actionable_suggestions: owned([
                "Try with different content",
                "Check if the content is readable",
                "Consider manual review",
            ]),
            content_type: "unknown".to_string(),
            estimated_reading_time: "unknown".to_string(),
            word_count,
            metadata,
            error: Some("Failed to parse AI response".to_string()),
        }
    }

    /// Placeholder returned when the provider could not be used at all.
    pub fn failure(message: impl Into<String>, word_count: usize, metadata: SummaryMetadata) -> Self {
        Self {
            summary: "Failed to generate summary due to API error".to_string(),
            key_insights: owned([
                "API service unavailable",
                "Check API key configuration",
                "Try again later",
            ]),
            actionable_suggestions: owned([
                "Verify the provider API key is set correctly",
                "Check internet connection",
                "Contact support if issue persists",
            ]),
            content_type: "error".to_string(),
            estimated_reading_time: "unknown".to_string(),
            word_count,
            metadata,
            error: Some(message.into()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}
