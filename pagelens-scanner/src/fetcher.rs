use crate::error::{Result, ScanError};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Identifying header sent with every request.
pub const USER_AGENT: &str = "Mozilla/5.0";

/// Upper bound applied to every individual HTTP request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub body: String,
    pub content_type: Option<String>,
}

/// The single point through which all network reads pass. Every call
/// carries the fixed user agent and the 10 second request timeout.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// GET a page, returning its body text. Non-2xx responses are errors.
    pub async fn get(&self, url: &str) -> Result<FetchedPage> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::HttpStatus {
                code: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.text().await?;

        Ok(FetchedPage { body, content_type })
    }

    /// GET a binary resource, returning its raw bytes.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET (bytes) {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::HttpStatus {
                code: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// HEAD a resource. A non-2xx answer is an error that still carries
    /// the status code the server responded with.
    pub async fn head(&self, url: &str) -> Result<u16> {
        debug!("HEAD {}", url);
        let response = self.client.head(url).send().await?;
        let code = response.status().as_u16();
        if !response.status().is_success() {
            return Err(ScanError::HttpStatus { code });
        }

        Ok(code)
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}
