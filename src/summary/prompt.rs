use crate::text::truncate_chars;

/// Content beyond this many characters is left out of the prompt.
pub const PROMPT_CONTENT_CHARS: usize = 30_000;

/// Builds the summarization prompt.
///
/// `original_length` and `word_count` describe the full content, not the
/// truncated excerpt that ends up in the prompt.
pub fn build_prompt(content: &str, url: &str, title: &str, original_length: usize, word_count: usize) -> String {
    let excerpt = truncate_chars(content, PROMPT_CONTENT_CHARS);

    let mut result = String::with_capacity(excerpt.len() + 1200);
    result.push_str("Summarize the following webpage content into a structured JSON response with 3 key insights and actionable suggestions.\n\n");
    result.push_str("Webpage Information:\n");
    result.push_str(&format!("- URL: {}\n", url));
    result.push_str(&format!("- Title: {}\n", title));
    result.push_str(&format!("- Content Length: {} characters\n\n", original_length));
    result.push_str("Content:\n");
    result.push_str(excerpt);
    result.push_str("\n\nPlease provide a JSON response in the following format:\n");
    result.push_str(&format!(
        r#"{{
  "summary": "A concise 2-3 sentence summary of the main content",
  "keyInsights": [
    "First key insight about the content",
    "Second key insight about the content",
    "Third key insight about the content"
  ],
  "actionableSuggestions": [
    "First actionable suggestion based on the content",
    "Second actionable suggestion based on the content",
    "Third actionable suggestion based on the content"
  ],
  "contentType": "The type of content (e.g., 'article', 'news', 'documentation', 'blog post')",
  "estimatedReadingTime": "Estimated reading time in minutes",
  "wordCount": {}
}}"#,
        word_count
    ));
    result.push_str("\n\nProvide exactly three key insights and exactly three actionable suggestions. Respond only with valid JSON, no additional text or formatting.\n");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_page_details_and_shape() {
        let prompt = build_prompt("Body text here", "https://ex.com/a", "A Title", 14, 3);
        assert!(prompt.contains("- URL: https://ex.com/a"));
        assert!(prompt.contains("- Title: A Title"));
        assert!(prompt.contains("- Content Length: 14 characters"));
        assert!(prompt.contains("Body text here"));
        assert!(prompt.contains("\"wordCount\": 3"));
        assert!(prompt.contains("\"keyInsights\""));
        assert!(prompt.contains("Respond only with valid JSON"));
    }

    #[test]
    fn prompt_excerpt_is_bounded() {
        let content = format!("{}TAIL", "x".repeat(PROMPT_CONTENT_CHARS));
        let prompt = build_prompt(&content, "", "", content.len(), 1);
        assert!(!prompt.contains("TAIL"));
        assert!(prompt.contains(&format!("Content Length: {} characters", PROMPT_CONTENT_CHARS + 4)));
    }
}
