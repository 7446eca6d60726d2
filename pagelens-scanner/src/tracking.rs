use crate::error::Result;
use crate::fetcher::Fetcher;

/// Signature table: tool name to the literal substrings that betray it.
/// Detection reports tools in this declaration order.
pub const TRACKING_SIGNATURES: &[(&str, &[&str])] = &[
    ("Facebook Pixel", &["https://connect.facebook.net", "fbq("]),
    ("Hotjar", &["https://static.hotjar.com", "_hjSettings"]),
    (
        "Google Analytics",
        &["gtag('config'", "www.googletagmanager.com"],
    ),
    ("LinkedIn Insights", &["snap.licdn.com"]),
];

/// Scan raw HTML/script text for known tracking signatures. Pure; the
/// first matching substring settles a tool's check, and every tool
/// appears at most once. An empty result means nothing matched.
pub fn detect_in_html(html: &str) -> Vec<String> {
    let mut detected = Vec::new();
    for (tool, patterns) in TRACKING_SIGNATURES {
        if patterns.iter().any(|pattern| html.contains(pattern)) {
            detected.push((*tool).to_string());
        }
    }
    detected
}

pub struct TrackingDetector {
    fetcher: Fetcher,
}

impl TrackingDetector {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    /// Fetch a page once and match it against the signature table.
    /// `Ok(vec![])` means no tracking tools were detected; a fetch
    /// failure is an Err, never a value masquerading as a tool name.
    pub async fn detect(&self, url: &str) -> Result<Vec<String>> {
        let page = self.fetcher.get(url).await?;
        Ok(detect_in_html(&page.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_no_signatures_means_empty() {
        assert!(detect_in_html("<html><body>plain page</body></html>").is_empty());
    }

    #[test]
    fn test_any_one_substring_matches_a_tool() {
        // Second Hotjar pattern alone is enough.
        let html = "<script>window._hjSettings = {};</script>";
        assert_eq!(detect_in_html(html), vec!["Hotjar".to_string()]);
    }

    #[test]
    fn test_tools_reported_in_table_order_at_most_once() {
        let html = r#"
            <script src="https://snap.licdn.com/li.lms-analytics/insight.min.js"></script>
            <script>gtag('config', 'G-XXXX');</script>
            <script src="https://www.googletagmanager.com/gtag/js"></script>
            <script>fbq('init', '123');</script>
        "#;
        assert_eq!(
            detect_in_html(html),
            vec![
                "Facebook Pixel".to_string(),
                "Google Analytics".to_string(),
                "LinkedIn Insights".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_detect_fetches_the_page_once() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(
                        r#"<script src="https://static.hotjar.com/c.js"></script>"#,
                    ),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let detector = TrackingDetector::new(Fetcher::new());
        let tools = detector.detect(&mock_server.uri()).await.unwrap();
        assert_eq!(tools, vec!["Hotjar".to_string()]);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_an_err_not_a_tool_name() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let detector = TrackingDetector::new(Fetcher::new());
        let result = detector
            .detect(&format!("{}/down", mock_server.uri()))
            .await;
        assert!(result.is_err());
    }
}
