//! Single-page content retrieval: fetch a URL, strip the HTML down to plain
//! text, and split it into retrievable chunks.

pub mod chunk;
pub mod extract;
pub mod fetch;

pub use chunk::split_into_chunks;
pub use extract::{extract_content, ExtractedContent};
pub use fetch::{build_page_client, fetch_page};

use crate::error::ScrapeError;
use reqwest::Client;
use url::Url;

/// Everything the analyze endpoint needs from one page fetch.
#[derive(Debug, Clone)]
pub struct PageAnalysis {
    pub title: String,
    pub content: String,
    pub chunks: Vec<String>,
}

/// Fetch `url`, extract its text, and chunk it.
///
/// The page title falls back to the hostname when the document has no
/// usable `<title>`.
pub async fn analyze_url(
    client: &Client,
    url: &str,
    chunk_size: usize,
) -> Result<PageAnalysis, ScrapeError> {
    let parsed = Url::parse(url).map_err(|_| ScrapeError::InvalidUrl(url.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScrapeError::InvalidUrl(url.to_string()));
    }

    let html = fetch_page(client, &parsed).await?;
    let extracted = extract_content(&html);

    let title = if extracted.title.is_empty() {
        parsed.host_str().unwrap_or("Unknown").to_string()
    } else {
        extracted.title
    };

    let chunks = split_into_chunks(&extracted.text, chunk_size);

    Ok(PageAnalysis {
        title,
        content: extracted.text,
        chunks,
    })
}
