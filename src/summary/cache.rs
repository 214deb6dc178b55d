use chrono::{DateTime, Duration, Utc};

use crate::capture::CapturedPage;

/// How long a generated summary stays fresh.
pub fn summary_ttl() -> Duration {
    Duration::hours(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    Reuse,
    Regenerate,
}

/// Reuse the stored summary only if one exists and it was generated strictly
/// within the last hour.
pub fn decide(page: &CapturedPage, now: DateTime<Utc>) -> CacheDecision {
    match (&page.summary, page.summary_generated_at) {
        (Some(_), Some(generated_at)) if generated_at > now - summary_ttl() => CacheDecision::Reuse,
        _ => CacheDecision::Regenerate,
    }
}
