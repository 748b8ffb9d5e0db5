//! HTTP fetching with per-call timeouts and bounded backoff.

use std::time::Duration;

use crate::errors::Result;

// The review site serves a reduced page to unknown clients.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Status codes worth a bounded retry. Everything else is terminal for the
/// current unit of work.
pub const RETRYABLE_STATUS: &[u16] = &[429, 500, 503];

pub struct HttpFetcher {
    client: reqwest::Client,
    max_retries: u32,
}

impl HttpFetcher {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(timeout: Duration, max_retries: u32) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).timeout(timeout).build()?;
        Ok(Self { client, max_retries })
    }

    /// Fetches the body of a URL as text. One shot, no retry.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, times out, or the response has
    /// a non-success status.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;
        Ok(response.text().await?)
    }

    /// Fetches the body of a URL as text, retrying on 429/5xx with
    /// exponential backoff (2^attempt seconds) up to `max_retries` attempts.
    ///
    /// # Errors
    ///
    /// Returns an error once the retry budget is exhausted or on any
    /// non-retryable failure.
    pub async fn get_text_with_retry(&self, url: &str) -> Result<String> {
        let mut attempt = 0u32;
        loop {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            if RETRYABLE_STATUS.contains(&status.as_u16()) && attempt < self.max_retries {
                let wait = Duration::from_secs(1u64 << attempt);
                tracing::warn!(%url, %status, attempt, "retryable HTTP status, backing off");
                tokio::time::sleep(wait).await;
                attempt += 1;
                continue;
            }
            let response = response.error_for_status()?;
            return Ok(response.text().await?);
        }
    }
}
