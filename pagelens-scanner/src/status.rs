use crate::error::ScanError;
use crate::fetcher::Fetcher;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome of one existence check. A server answering with any HTTP
/// status, 2xx or not, yields `Code`; only a missing response entirely
/// is `Unreachable`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusOutcome {
    Code(u16),
    Unreachable(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlStatus {
    pub url: String,
    pub status: StatusOutcome,
}

pub struct StatusChecker {
    fetcher: Fetcher,
}

impl StatusChecker {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    /// HEAD every address strictly in sequence; each check is awaited
    /// before the next begins, so output order equals input order.
    pub async fn check_all(&self, urls: &[String]) -> Vec<UrlStatus> {
        let mut statuses = Vec::with_capacity(urls.len());

        for url in urls {
            let status = match self.fetcher.head(url).await {
                Ok(code) => StatusOutcome::Code(code),
                Err(ScanError::HttpStatus { code }) => StatusOutcome::Code(code),
                Err(e) => StatusOutcome::Unreachable(e.to_string()),
            };
            debug!("Status for {}: {:?}", url, status);
            statuses.push(UrlStatus {
                url: url.clone(),
                status,
            });
        }

        statuses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_results_in_input_order() {
        let mock_server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let urls = vec![
            format!("{}/ok", mock_server.uri()),
            // Nothing listens here; the connection is refused.
            "http://127.0.0.1:1/".to_string(),
            format!("{}/missing", mock_server.uri()),
        ];

        let checker = StatusChecker::new(Fetcher::new());
        let statuses = checker.check_all(&urls).await;

        assert_eq!(statuses.len(), 3);
        assert_eq!(statuses[0].url, urls[0]);
        assert_eq!(statuses[0].status, StatusOutcome::Code(200));
        assert_eq!(statuses[1].url, urls[1]);
        assert!(matches!(statuses[1].status, StatusOutcome::Unreachable(_)));
        assert_eq!(statuses[2].url, urls[2]);
        assert_eq!(statuses[2].status, StatusOutcome::Code(404));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let checker = StatusChecker::new(Fetcher::new());
        assert!(checker.check_all(&[]).await.is_empty());
    }
}
