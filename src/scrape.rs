use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

/// Text pulled from a merchant page, or the reason it could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageText {
    Retrieved(String),
    Unavailable(String),
}

impl fmt::Display for PageText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageText::Retrieved(text) => f.write_str(text),
            PageText::Unavailable(reason) => write!(f, "[Page could not be retrieved: {}]", reason),
        }
    }
}

/// Fetches merchant pages as plain text.
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (compatible; deal-auditor/0.1)")
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    /// Fetch `url` and convert it to text, capped at `max_chars`.
    pub async fn fetch_text(&self, url: &str, max_chars: usize) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to fetch URL")?;

        if !resp.status().is_success() {
            anyhow::bail!("HTTP {}", resp.status());
        }

        let content_type = resp
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = resp.bytes().await.context("Failed to read response body")?;

        let text = truncate_chars(&body_to_text(&content_type, &body), max_chars);
        info!(url, size = text.len(), "Page fetched");
        Ok(text)
    }

    /// Like [`fetch_text`](Self::fetch_text), but a failure becomes
    /// [`PageText::Unavailable`] instead of an error.
    pub async fn fetch_page(&self, url: &str, max_chars: usize) -> PageText {
        match self.fetch_text(url, max_chars).await {
            Ok(text) => PageText::Retrieved(text),
            Err(e) => {
                warn!(url, error = %e, "Page fetch failed");
                PageText::Unavailable(format!("{:#}", e))
            }
        }
    }
}

/// Convert a response body to plain text. HTML is rendered at width 120;
/// anything else, or HTML that fails to render, is read as lossy UTF-8.
fn body_to_text(content_type: &str, body: &[u8]) -> String {
    if content_type.contains("html") {
        html2text::from_read(body, 120).unwrap_or_else(|_| String::from_utf8_lossy(body).into_owned())
    } else {
        String::from_utf8_lossy(body).into_owned()
    }
}

/// Keep at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

fn looks_like_pdf(bytes: &[u8], content_type: Option<&str>, filename: &str) -> bool {
    content_type.is_some_and(|ct| ct.starts_with("application/pdf"))
        || filename.to_lowercase().ends_with(".pdf")
        || bytes.starts_with(b"%PDF")
}

/// Extract text from an uploaded contract. PDFs go through `pdf-extract`;
/// anything else is read as UTF-8 text.
pub async fn extract_contract_text(
    bytes: Vec<u8>,
    content_type: Option<&str>,
    filename: &str,
    max_chars: usize,
) -> Result<String> {
    let text = if looks_like_pdf(&bytes, content_type, filename) {
        // PDF parsing is CPU-bound — run in spawn_blocking
        tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string())
        })
        .await
        .context("spawn_blocking join failed")?
        .map_err(|e| anyhow::anyhow!("Failed to extract text from PDF: {}", e))?
    } else {
        String::from_utf8_lossy(&bytes).into_owned()
    };

    info!(filename, size = text.len(), "Contract extracted");
    Ok(truncate_chars(text.trim(), max_chars))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("café crème", 4), "café");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_page_text_display() {
        assert_eq!(PageText::Retrieved("hello".to_string()).to_string(), "hello");
        assert_eq!(
            PageText::Unavailable("HTTP 404 Not Found".to_string()).to_string(),
            "[Page could not be retrieved: HTTP 404 Not Found]"
        );
    }

    #[test]
    fn test_body_to_text_renders_html() {
        let body = b"<html><head><title>t</title></head><body><h1>Menu</h1><p>Three courses for two</p></body></html>";
        let text = body_to_text("text/html; charset=utf-8", body);
        assert!(text.contains("Menu"));
        assert!(text.contains("Three courses for two"));
        assert!(!text.contains("<p>"));
        assert!(!text.contains("<h1>"));
    }

    #[test]
    fn test_body_to_text_keeps_plain_text() {
        let body = b"<p>not markup here</p>\nValid until June.";
        assert_eq!(
            body_to_text("text/plain", body),
            "<p>not markup here</p>\nValid until June."
        );
        // No content type is treated as plain text
        assert_eq!(body_to_text("", "caf\u{e9}".as_bytes()), "caf\u{e9}");
    }

    #[test]
    fn test_looks_like_pdf() {
        assert!(looks_like_pdf(b"", Some("application/pdf"), "contract"));
        assert!(looks_like_pdf(b"", None, "Contract.PDF"));
        assert!(looks_like_pdf(b"%PDF-1.7\n", None, "upload"));
        assert!(!looks_like_pdf(b"plain terms", Some("text/plain"), "terms.txt"));
    }

    #[tokio::test]
    async fn test_extract_plain_text_contract() {
        let text = extract_contract_text(
            b"  Valid Monday to Friday.\n".to_vec(),
            Some("text/plain"),
            "terms.txt",
            1000,
        )
        .await
        .unwrap();
        assert_eq!(text, "Valid Monday to Friday.");
    }
}
