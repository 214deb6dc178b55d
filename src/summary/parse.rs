//! Best-effort decoding of provider output into the summary shape.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{SummaryMetadata, SummaryResult};

/// Fields as the provider returns them. String fields tolerate numbers and
/// anything missing is filled in by [`ProviderSummary::into_result`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSummary {
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub key_insights: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub actionable_suggestions: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub estimated_reading_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub word_count: Option<usize>,
}

impl ProviderSummary {
    pub fn into_result(self, computed_word_count: usize, metadata: SummaryMetadata) -> SummaryResult {
        SummaryResult {
            summary: self.summary.unwrap_or_default(),
            key_insights: self.key_insights,
            actionable_suggestions: self.actionable_suggestions,
            content_type: self.content_type.unwrap_or_else(|| "unknown".to_string()),
            estimated_reading_time: self
                .estimated_reading_time
                .unwrap_or_else(|| "unknown".to_string()),
            word_count: self.word_count.unwrap_or(computed_word_count),
            metadata,
            error: None,
        }
    }
}

/// Slice from the first `{` to the last `}`, if there is one.
pub fn json_candidate(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Decodes the JSON object embedded in `raw`.
///
/// Returns `None` when there is no object, it does not decode, or it lacks a
/// summary text; callers substitute the fallback result in that case.
pub fn parse_summary(raw: &str) -> Option<ProviderSummary> {
    let candidate = json_candidate(raw)?;
    let parsed: ProviderSummary = serde_json::from_str(candidate).ok()?;
    match parsed.summary.as_deref() {
        Some(text) if !text.trim().is_empty() => Some(parsed),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) => vec![s],
        _ => Vec::new(),
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .map(|n| n as usize),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
