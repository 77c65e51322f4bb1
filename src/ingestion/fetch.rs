//! HTTP fetching for source pages.

use reqwest::{Client, StatusCode};
use url::Url;

use crate::types::RagError;

/// Fixed User-Agent sent with every page request. Some sites refuse requests
/// without a browser-looking agent string.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0";

/// Builds the shared HTTP client used for page fetches.
///
/// Timeouts, redirects, and connection pooling are left at reqwest defaults.
pub fn http_client() -> Result<Client, RagError> {
    let client = Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .use_rustls_tls()
        .build()?;
    Ok(client)
}

/// Fetches the page behind `url` and returns its body text.
///
/// Any status strictly different from 200 OK yields [`RagError::Fetch`]
/// carrying the numeric code; transport failures map through
/// `From<reqwest::Error>`.
pub async fn fetch_page(client: &Client, url: &Url) -> Result<String, RagError> {
    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(RagError::Fetch {
            status: status.as_u16(),
        });
    }
    Ok(response.text().await?)
}
