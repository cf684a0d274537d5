use crate::error::ScrapeError;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Build the HTTP client used for page fetches.
pub fn build_page_client(timeout_secs: u64, user_agent: &str) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent.to_string())
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Fetch the raw HTML of a page.
///
/// A non-success status from the target website is surfaced as
/// [`ScrapeError::UpstreamStatus`] — the website's unavailability is the
/// caller's problem to resolve, so it is never retried.
pub async fn fetch_page(client: &Client, url: &Url) -> Result<String, ScrapeError> {
    let response = client
        .get(url.clone())
        .header(
            ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::UpstreamStatus {
            status: status.as_u16(),
        });
    }

    Ok(response.text().await?)
}
