//! Web page scraping interface and the portable HTTP backend.
//!
//! [`HttpScraper`] fetches a page over HTTP(S) and reduces it to plain text:
//! scheme validation, a Content-Type allowlist, a body size cap, `<title>`
//! extraction, and character-level HTML stripping (script and style blocks
//! removed, whitespace collapsed). No headless browser is involved; pages
//! that require JavaScript come back as whatever static markup they serve.

use std::io::Read as _;
use std::time::Duration;

use crate::{ToolkitError, ToolkitResult};

/// Request timeout for one fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum response body size (2 MB).
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Maximum allowed URL length in characters.
const MAX_URL_LENGTH: usize = 2048;

/// Content-Type prefixes accepted for extraction.
const ALLOWED_CONTENT_TYPES: &[&str] = &["text/html", "text/plain", "application/json"];

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PageContent {
    /// The canonical URL that was fetched.
    pub url: String,
    /// Page title from the `<title>` tag, if HTML.
    pub title: Option<String>,
    /// Extracted plain text.
    pub text: String,
    pub word_count: usize,
}

pub trait ScrapeProvider: Send + Sync {
    fn fetch(&self, url: &str) -> ToolkitResult<PageContent>;
}

/// Portable scrape backend over a blocking HTTP client.
pub struct HttpScraper;

/// Validate a URL for fetching: length capped, scheme http/https only.
pub fn validate_url(raw: &str) -> ToolkitResult<url::Url> {
    if raw.len() > MAX_URL_LENGTH {
        return Err(ToolkitError::InvalidRequest(format!(
            "url exceeds maximum length of {MAX_URL_LENGTH} characters ({} given)",
            raw.len()
        )));
    }
    let parsed = url::Url::parse(raw)
        .map_err(|e| ToolkitError::InvalidRequest(format!("invalid url: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ToolkitError::InvalidRequest(format!(
            "unsupported url scheme: {other} (only http and https are allowed)"
        ))),
    }
}

impl ScrapeProvider for HttpScraper {
    fn fetch(&self, url: &str) -> ToolkitResult<PageContent> {
        let validated = validate_url(url)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!("deskhand/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ToolkitError::Backend(format!("failed to build http client: {e}")))?;

        let resp = client
            .get(validated.as_str())
            .send()
            .map_err(|e| ToolkitError::Backend(format!("http request failed: {e}")))?;

        let content_type = resp
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_lowercase();

        if !ALLOWED_CONTENT_TYPES
            .iter()
            .any(|allowed| content_type.contains(allowed))
        {
            return Err(ToolkitError::InvalidRequest(format!(
                "content-type not supported for scraping: {content_type}"
            )));
        }

        let mut body = Vec::new();
        let mut reader = resp.take((MAX_BODY_BYTES as u64) + 1);
        reader
            .read_to_end(&mut body)
            .map_err(|e| ToolkitError::Backend(format!("failed to read response body: {e}")))?;
        body.truncate(MAX_BODY_BYTES);

        let raw = String::from_utf8_lossy(&body).into_owned();

        let (title, text) = if content_type.contains("text/html") {
            (extract_title(&raw), strip_html(&raw))
        } else {
            (None, raw)
        };

        let word_count = text.split_whitespace().count();

        Ok(PageContent {
            url: validated.to_string(),
            title,
            text,
            word_count,
        })
    }
}

/// Extract `<title>...</title>` (case-insensitive, attributes tolerated).
fn extract_title(html: &str) -> Option<String> {
    let lower = html.to_lowercase();
    let start = lower.find("<title")?;
    let content_start = html[start..].find('>')? + start + 1;
    let end = lower[content_start..].find("</title>")?;
    let title = html[content_start..content_start + end].trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Strip tags plus whole script/style blocks, then collapse whitespace.
fn strip_html(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut chars = html.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch == '<' {
            let lookahead: String = chars.clone().take(20).collect::<String>().to_lowercase();

            if lookahead.starts_with("<script") {
                skip_until_close_tag(&mut chars, "script");
                result.push(' ');
                continue;
            }
            if lookahead.starts_with("<style") {
                skip_until_close_tag(&mut chars, "style");
                result.push(' ');
                continue;
            }

            for c in chars.by_ref() {
                if c == '>' {
                    break;
                }
            }
            result.push(' ');
        } else {
            result.push(ch);
            chars.next();
        }
    }

    collapse_whitespace(&result)
}

fn skip_until_close_tag(chars: &mut std::iter::Peekable<std::str::Chars>, tag: &str) {
    let close = format!("</{tag}>");
    let mut buffer = String::new();
    for c in chars.by_ref() {
        buffer.push(c);
        if buffer.len() >= close.len() {
            let tail: String = buffer[buffer.len() - close.len()..].to_lowercase();
            if tail == close {
                return;
            }
        }
    }
}

fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_ws = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_ws {
                result.push(' ');
            }
            prev_ws = true;
        } else {
            result.push(ch);
            prev_ws = false;
        }
    }
    result.trim().to_string()
}

/// Stub for configurations where page scraping is disabled.
pub struct UnavailableScrape;

impl ScrapeProvider for UnavailableScrape {
    fn fetch(&self, _url: &str) -> ToolkitResult<PageContent> {
        Err(ToolkitError::Unavailable("page scraping not supported".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_validation_accepts_http_and_https() {
        assert!(validate_url("http://example.com/").is_ok());
        assert!(validate_url("https://example.com/a?b=c").is_ok());
    }

    #[test]
    fn url_validation_rejects_other_schemes() {
        for bad in ["file:///etc/passwd", "ftp://host/x", "data:text/html,hi"] {
            let err = validate_url(bad).unwrap_err();
            assert!(matches!(err, ToolkitError::InvalidRequest(_)), "{bad}");
        }
    }

    #[test]
    fn url_validation_rejects_oversized_urls() {
        let long = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));
        assert!(validate_url(&long).is_err());
    }

    #[test]
    fn title_extraction_handles_attributes_and_case() {
        assert_eq!(
            extract_title("<html><TITLE lang=\"en\"> Hello </TITLE></html>"),
            Some("Hello".to_string())
        );
        assert_eq!(extract_title("<html><body>no title</body></html>"), None);
        assert_eq!(extract_title("<title></title>"), None);
    }

    #[test]
    fn strip_html_removes_tags_and_scripts() {
        let html = "<html><head><script>var x = '<b>not text</b>';</script>\
                    <style>p { color: red; }</style></head>\
                    <body><p>First</p><p>Second</p></body></html>";
        assert_eq!(strip_html(html), "First Second");
    }

    #[test]
    fn strip_html_collapses_whitespace() {
        assert_eq!(strip_html("<p>a</p>\n\n\t  <p>b</p>"), "a b");
    }
}
