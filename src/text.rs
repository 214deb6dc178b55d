/// Upper bound on stored capture content, in characters.
pub const MAX_CONTENT_CHARS: usize = 50_000;

/// Returns the first `max` characters of `text`.
///
/// Counts `char`s rather than bytes so the cut never lands inside a
/// multi-byte sequence. Applying it twice gives the same result.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Number of whitespace-delimited, non-empty tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn char_count(text: &str) -> usize {
    text.chars().count()
}
