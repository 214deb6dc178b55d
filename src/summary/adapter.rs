use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::llm::GenerationProvider;
use crate::text::{char_count, word_count};

use super::parse::parse_summary;
use super::prompt::build_prompt;
use super::{SummaryMetadata, SummaryResult};

/// Result of one summarization attempt. Every variant carries a complete,
/// serializable [`SummaryResult`].
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryOutcome {
    /// The provider returned a usable JSON summary.
    Success(SummaryResult),
    /// The provider answered but the answer could not be decoded.
    Fallback(SummaryResult),
    /// The provider was not configured or the call failed.
    Error(SummaryResult),
}

impl SummaryOutcome {
    pub fn result(&self) -> &SummaryResult {
        match self {
            SummaryOutcome::Success(r) | SummaryOutcome::Fallback(r) | SummaryOutcome::Error(r) => r,
        }
    }

    pub fn into_result(self) -> SummaryResult {
        match self {
            SummaryOutcome::Success(r) | SummaryOutcome::Fallback(r) | SummaryOutcome::Error(r) => r,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SummaryOutcome::Success(_) => "success",
            SummaryOutcome::Fallback(_) => "fallback",
            SummaryOutcome::Error(_) => "error",
        }
    }
}

/// Produces structured summaries through a generation provider.
#[derive(Clone)]
pub struct Summarizer {
    provider: Arc<dyn GenerationProvider>,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self { provider }
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Summarizes `content`; never fails, degraded outcomes carry `error`.
    pub async fn generate_summary(&self, content: &str, url: &str, title: &str) -> SummaryResult {
        self.summarize(content, url, title).await.into_result()
    }

    pub async fn summarize(&self, content: &str, url: &str, title: &str) -> SummaryOutcome {
        let original_length = char_count(content);
        let words = word_count(content);
        let metadata = || SummaryMetadata::new(url, title, original_length, self.provider.model());

        if let Err(err) = self.provider.ensure_credential() {
            warn!(url, error = %err, "summary provider is not configured");
            return SummaryOutcome::Error(SummaryResult::failure(err.to_string(), words, metadata()));
        }

        let prompt = build_prompt(content, url, title, original_length, words);
        let started = Instant::now();
        let raw = match self.provider.generate(&prompt).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(url, error = %err, "summary provider call failed");
                return SummaryOutcome::Error(SummaryResult::failure(err.to_string(), words, metadata()));
            }
        };
        debug!(url, elapsed = ?started.elapsed(), "summary provider responded");

        match parse_summary(&raw) {
            Some(parsed) => {
                info!(url, model = self.provider.model(), "summary generated");
                SummaryOutcome::Success(parsed.into_result(words, metadata()))
            }
            None => {
                warn!(url, "failed to parse summary provider response");
                debug!(raw = %raw, "raw provider response");
                SummaryOutcome::Fallback(SummaryResult::fallback(words, metadata()))
            }
        }
    }
}
