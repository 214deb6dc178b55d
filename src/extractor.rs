//! Turns an HTML page into cleaned plain text suitable for summarization.
//!
//! The document is parsed into an owned tree, noise elements are detached
//! from it, and the main content is picked by trying a list of well-known
//! container selectors before falling back to the largest text block and
//! finally the whole body.

use reqwest::{Client, ClientBuilder};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::text::{char_count, truncate_chars, word_count, MAX_CONTENT_CHARS};

/// Anything shorter than this is not worth sending to the backend.
pub const MIN_SUBMIT_CHARS: usize = 50;
pub const TRUNCATION_MARKER: &str = "... [Content truncated]";

const MIN_SELECTOR_CHARS: usize = 200;
const MIN_BLOCK_CHARS: usize = 500;

const NOISE: &str = "script, style, noscript, iframe, img, video, audio, canvas, svg, \
    nav, header, footer, aside, .nav, .header, .footer, .sidebar, \
    .advertisement, .ads, .banner, .popup, .modal, .overlay, \
    .social-share, .share-buttons, .comments, .comment-section";

const CONTENT_CANDIDATES: [&str; 10] = [
    "main",
    "article",
    ".content",
    ".post-content",
    ".entry-content",
    "#content",
    ".main-content",
    ".article-content",
    ".post-body",
    ".entry-body",
];

// Create a static client to reuse connections
static CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .timeout(Duration::from_secs(10))
        .connect_timeout(Duration::from_secs(5))
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to build HTTP client")
});

// Create static selectors to avoid recompiling them each time
static NOISE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(NOISE).expect("Failed to parse noise selector")
});

static CONTENT_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    CONTENT_CANDIDATES
        .iter()
        .map(|s| Selector::parse(s).expect("Failed to parse content selector"))
        .collect()
});

static BLOCK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div, section, article, p").expect("Failed to parse block selector")
});

static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("body").expect("Failed to parse body selector")
});

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("title").expect("Failed to parse title selector")
});

/// Text captured from one page, in the shape the capture endpoint accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedPage {
    pub title: String,
    pub url: String,
    pub content: String,
    pub word_count: usize,
    pub content_length: usize,
}

impl ExtractedPage {
    /// Fails when the page did not yield enough text to be worth submitting.
    pub fn ensure_submittable(&self) -> Result<()> {
        let trimmed = self.content.trim();
        if trimmed.is_empty() {
            return Err(AppError::Extraction("No content captured from page".to_string()));
        }
        if char_count(trimmed) < MIN_SUBMIT_CHARS {
            return Err(AppError::Extraction(
                "Page appears to have very little text content".to_string(),
            ));
        }
        Ok(())
    }
}

/// A fetched document and the URL it was finally served from.
pub struct FetchedPage {
    pub url: String,
    pub html: String,
}

pub async fn fetch_html(url: &str) -> Result<FetchedPage> {
    let response = CLIENT.get(url).send().await?.error_for_status()?;
    let url = response.url().to_string();
    let html = response.text().await?;
    Ok(FetchedPage { url, html })
}

/// Fetches `url` and extracts it, refusing pages with too little text.
pub async fn capture_page(url: &str) -> Result<ExtractedPage> {
    let fetched = fetch_html(url).await?;
    let page = extract(&fetched.html, &fetched.url, &fetched.url);
    page.ensure_submittable()?;
    Ok(page)
}

/// Extracts the main text of `html`.
///
/// `page_url` and `fallback_title` stand in for what the hosting browser
/// knows about the page; the document's own `<title>` wins when present.
pub fn extract(html: &str, page_url: &str, fallback_title: &str) -> ExtractedPage {
    let mut document = Html::parse_document(html);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| fallback_title.to_string());

    strip_noise(&mut document);

    let raw: String = select_main(&document).text().collect();
    let content = limit_length(normalize_whitespace(&raw));
    debug!(url = page_url, chars = char_count(&content), "extracted page text");

    ExtractedPage {
        title,
        url: page_url.to_string(),
        word_count: word_count(&content),
        content_length: char_count(&content),
        content,
    }
}

fn strip_noise(document: &mut Html) {
    let ids: Vec<_> = document.select(&NOISE_SELECTOR).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn select_main(document: &Html) -> ElementRef<'_> {
    for selector in CONTENT_SELECTORS.iter() {
        if let Some(element) = document.select(selector).next() {
            if trimmed_len(element) > MIN_SELECTOR_CHARS {
                return element;
            }
        }
    }

    let mut best = None;
    let mut max_len = 0;
    for element in document.select(&BLOCK_SELECTOR) {
        let len = trimmed_len(element);
        if len > max_len && len > MIN_BLOCK_CHARS {
            max_len = len;
            best = Some(element);
        }
    }

    best.or_else(|| document.select(&BODY_SELECTOR).next())
        .unwrap_or_else(|| document.root_element())
}

fn trimmed_len(element: ElementRef<'_>) -> usize {
    char_count(element.text().collect::<String>().trim())
}

/// Collapses every whitespace run, line breaks included, to one space.
pub fn normalize_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for word in text.split_whitespace() {
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(word);
    }

    result
}

fn limit_length(content: String) -> String {
    if char_count(&content) <= MAX_CONTENT_CHARS {
        return content;
    }
    let mut cut = truncate_chars(&content, MAX_CONTENT_CHARS).to_string();
    cut.push_str(TRUNCATION_MARKER);
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lorem(chars: usize) -> String {
        "lorem ipsum dolor sit amet ".repeat(chars / 27 + 1)[..chars].trim().to_string()
    }

    #[test]
    fn main_element_wins_over_siblings() {
        let body = lorem(300);
        let html = format!(
            "<html><head><title> Main Page </title></head><body>\
             <nav>Home About Contact</nav>\
             <div class=\"menu\">Sibling menu links</div>\
             <main><p>{}</p></main>\
             <footer>Copyright</footer></body></html>",
            body
        );
        let page = extract(&html, "https://ex.com", "Tab title");
        assert_eq!(page.title, "Main Page");
        assert_eq!(page.content, body);
        assert!(!page.content.contains("Home About"));
        assert!(!page.content.contains("Sibling menu"));
        assert_eq!(page.word_count, body.split_whitespace().count());
        assert_eq!(page.content_length, body.chars().count());
    }

    #[test]
    fn short_main_falls_through_to_article() {
        let article = lorem(250);
        let html = format!(
            "<body><main>tiny</main><article>{}</article></body>",
            article
        );
        let page = extract(&html, "https://ex.com", "Tab");
        assert_eq!(page.content, article);
        assert_eq!(page.title, "Tab");
    }

    #[test]
    fn largest_block_used_without_known_containers() {
        let big = format!("alpha {}", lorem(600));
        let small = format!("beta {}", lorem(520));
        let html = format!(
            "<body><div id=\"a\">{}</div><div id=\"b\">{}</div><p>short</p></body>",
            big, small
        );
        let page = extract(&html, "https://ex.com", "Tab");
        assert!(page.content.starts_with("alpha"));
        assert!(!page.content.contains("beta"));
    }

    #[test]
    fn body_used_when_nothing_is_long_enough() {
        let html = "<body><div>first part</div><p>second part</p></body>";
        let page = extract(html, "https://ex.com", "Tab");
        assert_eq!(page.content, "first partsecond part");
    }

    #[test]
    fn noise_elements_are_removed() {
        let html = "<body><script>var x = 1;</script><style>p{}</style>\
                    <div class=\"ads\">Buy now</div><p>Real text</p>\
                    <section class=\"comments\">First!</section></body>";
        let page = extract(html, "https://ex.com", "Tab");
        assert_eq!(page.content, "Real text");
    }

    #[test]
    fn whitespace_is_normalized() {
        let text = "  first\t\tline  \n\n\n   second   line \r\n  \n";
        assert_eq!(normalize_whitespace(text), "first line second line");

        let html = "<body><main><p>alpha beta</p>\n\n   <p>gamma delta</p>\n<p>epsilon</p></main></body>";
        let page = extract(html, "https://ex.com", "Tab");
        assert_eq!(page.content, "alpha beta gamma delta epsilon");
    }

    #[test]
    fn long_content_is_truncated_with_marker() {
        let long = "word ".repeat(MAX_CONTENT_CHARS / 2);
        let html = format!("<body><article>{}</article></body>", long);
        let page = extract(&html, "https://ex.com", "Tab");
        assert!(page.content.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            page.content_length,
            MAX_CONTENT_CHARS + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn short_pages_are_not_submittable() {
        let page = extract("<body><p>Too short</p></body>", "https://ex.com", "Tab");
        assert!(matches!(page.ensure_submittable(), Err(AppError::Extraction(_))));

        let empty = extract("<body><script>x()</script></body>", "https://ex.com", "Tab");
        assert!(empty.content.is_empty());
        assert_eq!(empty.word_count, 0);
        assert!(matches!(empty.ensure_submittable(), Err(AppError::Extraction(_))));

        let ok = extract(&format!("<body><p>{}</p></body>", lorem(80)), "https://ex.com", "Tab");
        assert!(ok.ensure_submittable().is_ok());
    }
}
