use crate::fetcher::Fetcher;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

pub const NO_TITLE: &str = "No title found";
pub const NO_DESCRIPTION: &str = "No description found";
pub const NO_CANONICAL: &str = "No canonical URL found";

/// Heading levels collected into the record, document order per level.
const HEADING_LEVELS: std::ops::RangeInclusive<u8> = 1..=3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoRecord {
    pub url: String,
    pub title: String,
    pub description: String,
    pub canonical: String,
    pub headings: BTreeMap<u8, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SeoRecord {
    pub fn with_error(url: String, error: String) -> Self {
        Self {
            url,
            title: NO_TITLE.to_string(),
            description: NO_DESCRIPTION.to_string(),
            canonical: NO_CANONICAL.to_string(),
            headings: BTreeMap::new(),
            error: Some(error),
        }
    }
}

pub struct SeoExtractor {
    fetcher: Fetcher,
}

impl SeoExtractor {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    /// Fetch and parse a page once. A fetch failure yields a record
    /// carrying the address and the error; absent markup elements just
    /// default, they never fail.
    pub async fn extract(&self, url: &str) -> SeoRecord {
        match self.fetcher.get(url).await {
            Ok(page) => extract_from_html(url, &page.body),
            Err(e) => {
                warn!("SEO extraction failed for {}: {}", url, e);
                SeoRecord::with_error(url.to_string(), e.to_string())
            }
        }
    }
}

pub fn extract_from_html(url: &str, html: &str) -> SeoRecord {
    let document = Html::parse_document(html);

    let title_selector = Selector::parse("title").unwrap();
    // Title text is kept verbatim, whitespace included.
    let title = document
        .select(&title_selector)
        .next()
        .map(|t| t.text().collect::<String>())
        .unwrap_or_else(|| NO_TITLE.to_string());

    let description_selector = Selector::parse(r#"meta[name="description"]"#).unwrap();
    let description = document
        .select(&description_selector)
        .next()
        .and_then(|m| m.value().attr("content"))
        .map(str::to_string)
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    let canonical_selector = Selector::parse(r#"link[rel="canonical"]"#).unwrap();
    let canonical = document
        .select(&canonical_selector)
        .next()
        .and_then(|l| l.value().attr("href"))
        .map(str::to_string)
        .unwrap_or_else(|| NO_CANONICAL.to_string());

    let mut headings = BTreeMap::new();
    for level in HEADING_LEVELS {
        let selector = Selector::parse(&format!("h{}", level)).unwrap();
        let texts: Vec<String> = document
            .select(&selector)
            .map(|h| h.text().collect::<String>().trim().to_string())
            .collect();
        headings.insert(level, texts);
    }

    SeoRecord {
        url: url.to_string(),
        title,
        description,
        canonical,
        headings,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_title_round_trips_verbatim() {
        let record = extract_from_html(
            "http://a.test/",
            "<html><head><title>  Spaced Title </title></head></html>",
        );
        assert_eq!(record.title, "  Spaced Title ");
    }

    #[test]
    fn test_absent_elements_default_to_placeholders() {
        let record = extract_from_html("http://a.test/", "<html><body></body></html>");
        assert_eq!(record.title, NO_TITLE);
        assert_eq!(record.description, NO_DESCRIPTION);
        assert_eq!(record.canonical, NO_CANONICAL);
        assert!(record.error.is_none());
    }

    #[test]
    fn test_headings_per_level_in_document_order_trimmed() {
        let html = r#"<html><body>
            <h1> First </h1>
            <h2>Alpha</h2>
            <h1>Second</h1>
            <h3>  Deep  </h3>
            <h4>Ignored</h4>
        </body></html>"#;

        let record = extract_from_html("http://a.test/", html);
        assert_eq!(
            record.headings.get(&1),
            Some(&vec!["First".to_string(), "Second".to_string()])
        );
        assert_eq!(record.headings.get(&2), Some(&vec!["Alpha".to_string()]));
        assert_eq!(record.headings.get(&3), Some(&vec!["Deep".to_string()]));
        assert_eq!(record.headings.get(&4), None);
    }

    #[tokio::test]
    async fn test_extract_over_http() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(
                        r#"<html><head>
                            <title>Landing</title>
                            <meta name="description" content="A fine page">
                            <link rel="canonical" href="http://canonical.test/">
                        </head><body><h1>Welcome</h1></body></html>"#,
                    ),
            )
            .mount(&mock_server)
            .await;

        let extractor = SeoExtractor::new(Fetcher::new());
        let record = extractor.extract(&mock_server.uri()).await;

        assert_eq!(record.title, "Landing");
        assert_eq!(record.description, "A fine page");
        assert_eq!(record.canonical, "http://canonical.test/");
        assert_eq!(record.headings.get(&1), Some(&vec!["Welcome".to_string()]));
    }

    #[tokio::test]
    async fn test_fetch_failure_yields_error_record() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let extractor = SeoExtractor::new(Fetcher::new());
        let url = format!("{}/gone", mock_server.uri());
        let record = extractor.extract(&url).await;

        assert_eq!(record.url, url);
        assert!(record.error.is_some());
        assert_eq!(record.title, NO_TITLE);
    }
}
