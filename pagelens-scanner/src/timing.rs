use crate::error::{Result, ScanError};
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Ceiling on one navigation, load event included.
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Navigation-timing metrics for one page, or the error that kept them
/// from being measured. Metric fields are set together on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadTiming {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcp_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttfb_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dom_content_loaded_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoadTiming {
    pub fn with_error(url: &str, error: String) -> Self {
        Self {
            url: url.to_string(),
            total_ms: None,
            dns_ms: None,
            tcp_ms: None,
            ttfb_ms: None,
            dom_content_loaded_ms: None,
            error: Some(error),
        }
    }
}

/// Raw `performance.timing` epoch-millisecond marks read out of the
/// browser after the load event.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNavigationTiming {
    pub navigation_start: u64,
    pub domain_lookup_start: u64,
    pub domain_lookup_end: u64,
    pub connect_start: u64,
    pub connect_end: u64,
    pub request_start: u64,
    pub response_start: u64,
    pub dom_content_loaded_event_end: u64,
    pub load_event_end: u64,
}

/// Derive the reported metrics from raw navigation-timing marks.
pub fn derive_metrics(url: &str, raw: &RawNavigationTiming) -> LoadTiming {
    LoadTiming {
        url: url.to_string(),
        total_ms: Some(raw.load_event_end.saturating_sub(raw.navigation_start)),
        dns_ms: Some(raw.domain_lookup_end.saturating_sub(raw.domain_lookup_start)),
        tcp_ms: Some(raw.connect_end.saturating_sub(raw.connect_start)),
        ttfb_ms: Some(raw.response_start.saturating_sub(raw.request_start)),
        dom_content_loaded_ms: Some(
            raw.dom_content_loaded_event_end
                .saturating_sub(raw.navigation_start),
        ),
        error: None,
    }
}

const TIMING_SNIPPET: &str = r#"(() => {
    const t = performance.timing;
    return {
        navigation_start: t.navigationStart,
        domain_lookup_start: t.domainLookupStart,
        domain_lookup_end: t.domainLookupEnd,
        connect_start: t.connectStart,
        connect_end: t.connectEnd,
        request_start: t.requestStart,
        response_start: t.responseStart,
        dom_content_loaded_event_end: t.domContentLoadedEventEnd,
        load_event_end: t.loadEventEnd,
    };
})()"#;

/// Drives a full browser-engine navigation to capture wall-clock and
/// resource-timing metrics a plain HTTP fetch cannot see. Each call
/// gets its own isolated browser session, torn down on every path.
pub struct LoadTimeProfiler;

impl LoadTimeProfiler {
    pub fn new() -> Self {
        Self
    }

    pub async fn measure(&self, url: &str) -> LoadTiming {
        let session = match BrowserSession::launch().await {
            Ok(session) => session,
            Err(e) => {
                warn!("Browser launch failed for {}: {}", url, e);
                return LoadTiming::with_error(url, e.to_string());
            }
        };

        let outcome = timeout(NAVIGATION_TIMEOUT, session.capture_timing(url)).await;
        // Teardown runs whether navigation succeeded, failed, or timed out.
        session.shutdown().await;

        match outcome {
            Ok(Ok(timing)) => timing,
            Ok(Err(e)) => {
                warn!("Load-time measurement failed for {}: {}", url, e);
                LoadTiming::with_error(url, e.to_string())
            }
            Err(_) => LoadTiming::with_error(
                url,
                format!(
                    "navigation did not complete within {}s",
                    NAVIGATION_TIMEOUT.as_secs()
                ),
            ),
        }
    }
}

impl Default for LoadTimeProfiler {
    fn default() -> Self {
        Self::new()
    }
}

/// One headless browser plus its CDP event-handler task.
struct BrowserSession {
    browser: Browser,
    handler_task: tokio::task::JoinHandle<()>,
}

impl BrowserSession {
    async fn launch() -> Result<Self> {
        let config = BrowserConfig::builder()
            .args(["--no-sandbox", "--disable-gpu", "--disable-dev-shm-usage"])
            .build()
            .map_err(ScanError::Navigation)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScanError::Navigation(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while handler.next().await.is_some() {}
        });

        Ok(Self {
            browser,
            handler_task,
        })
    }

    async fn capture_timing(&self, url: &str) -> Result<LoadTiming> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| ScanError::Navigation(e.to_string()))?;

        page.wait_for_navigation()
            .await
            .map_err(|e| ScanError::Navigation(e.to_string()))?;

        let raw: RawNavigationTiming = page
            .evaluate(TIMING_SNIPPET)
            .await
            .map_err(|e| ScanError::Navigation(e.to_string()))?
            .into_value()
            .map_err(|e| ScanError::Navigation(e.to_string()))?;

        Ok(derive_metrics(url, &raw))
    }

    async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            debug!("Browser close failed: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("Browser wait failed: {}", e);
        }
        self.handler_task.abort();
    }
}
