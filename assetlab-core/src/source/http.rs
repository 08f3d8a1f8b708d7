//! reqwest-backed [`HttpFetch`] implementation.
//!
//! No retries and no backoff: a failed request surfaces immediately so the
//! run halts on the dataset that broke.

use super::{HttpFetch, SourceError};
use std::time::Duration;
use tracing::debug;

/// Blocking HTTP client shared by all remote providers.
pub struct HttpClient {
    client: reqwest::blocking::Client,
}

impl HttpClient {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| SourceError::NetworkUnreachable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    fn send(&self, url: &str) -> Result<reqwest::blocking::Response, SourceError> {
        debug!(url, "GET");
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| SourceError::NetworkUnreachable(format!("{url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp)
    }
}

impl HttpFetch for HttpClient {
    fn get_text(&self, url: &str) -> Result<String, SourceError> {
        self.send(url)?.text().map_err(|e| {
            SourceError::ResponseFormatChanged(format!("failed to read body from {url}: {e}"))
        })
    }

    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        self.send(url)?
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| {
                SourceError::ResponseFormatChanged(format!("failed to read body from {url}: {e}"))
            })
    }
}
