// Report assembly and rendering

use pagelens_scanner::graph::{PageEntry, SiteGraph};
use pagelens_scanner::{ImageRecord, LoadTiming, SeoRecord, StatusOutcome, UrlStatus};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Phrase rendered when a page's tracking scan came back empty.
pub const NO_TRACKING_DETECTED: &str = "No tracking tools detected";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Tracking-scan outcome for one page: the matched tool names in
/// signature-table order, or the fetch error that prevented the scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingFinding {
    pub url: String,
    pub tools: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TrackingFinding {
    pub fn detected(url: String, tools: Vec<String>) -> Self {
        Self {
            url,
            tools,
            error: None,
        }
    }

    pub fn failed(url: String, error: String) -> Self {
        Self {
            url,
            tools: Vec::new(),
            error: Some(error),
        }
    }
}

/// The join of every sub-analysis over one crawl, keyed by page
/// address where applicable. Created and consumed within one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub seed: String,
    pub generated_at: String,
    pub site_graph: SiteGraph,
    pub images: Vec<ImageRecord>,
    pub tracking: Vec<TrackingFinding>,
    pub seo: Vec<SeoRecord>,
    pub statuses: Vec<UrlStatus>,
    pub timings: Vec<LoadTiming>,
}

const BANNER: &str =
    "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";

fn section(report: &mut String, title: &str) {
    report.push_str(BANNER);
    report.push_str(title);
    report.push('\n');
    report.push_str(BANNER);
    report.push('\n');
}

pub fn generate_text_report(report: &Report) -> String {
    let mut out = String::new();

    out.push_str(BANNER);
    out.push_str("                        PAGELENS SITE ANALYSIS REPORT\n");
    out.push_str(BANNER);
    out.push('\n');
    out.push_str(&format!("Seed URL:       {}\n", report.seed));
    out.push_str(&format!("Generated:      {}\n", report.generated_at));
    out.push_str(&format!("Pages visited:  {}\n", report.site_graph.len()));
    out.push('\n');

    section(&mut out, "SITE MAP");
    if report.site_graph.is_empty() {
        out.push_str("  (empty)\n");
    }
    for (url, entry) in report.site_graph.pages() {
        match entry {
            PageEntry::Links(links) => {
                out.push_str(&format!("{}\n", url));
                for link in links {
                    out.push_str(&format!("  └── {}\n", link));
                }
            }
            PageEntry::FetchFailed(msg) => {
                out.push_str(&format!("{}  [fetch failed: {}]\n", url, msg));
            }
        }
    }
    out.push('\n');

    section(&mut out, "OVERSIZED IMAGES");
    if report.images.is_empty() {
        out.push_str("  (none over 1024 KiB)\n");
    }
    for image in &report.images {
        match &image.error {
            Some(error) => out.push_str(&format!("  {}  [error: {}]\n", image.url, error)),
            None => out.push_str(&format!(
                "  {}  {} KiB  format: {}  thumbnail: {}\n",
                image.url,
                image.size_kb.unwrap_or(0),
                image.format.as_deref().unwrap_or("?"),
                image.thumbnail.as_deref().unwrap_or("-"),
            )),
        }
    }
    out.push('\n');

    section(&mut out, "TRACKING TOOLS");
    for finding in &report.tracking {
        out.push_str(&format!("{}\n", finding.url));
        match &finding.error {
            Some(error) => out.push_str(&format!("  [error: {}]\n", error)),
            None if finding.tools.is_empty() => {
                out.push_str(&format!("  {}\n", NO_TRACKING_DETECTED))
            }
            None => {
                for tool in &finding.tools {
                    out.push_str(&format!("  • {}\n", tool));
                }
            }
        }
    }
    out.push('\n');

    section(&mut out, "SEO");
    for record in &report.seo {
        out.push_str(&format!("{}\n", record.url));
        if let Some(error) = &record.error {
            out.push_str(&format!("  [error: {}]\n", error));
            continue;
        }
        out.push_str(&format!("  Title:        {}\n", record.title));
        out.push_str(&format!("  Description:  {}\n", record.description));
        out.push_str(&format!("  Canonical:    {}\n", record.canonical));
        for (level, texts) in &record.headings {
            if !texts.is_empty() {
                out.push_str(&format!("  h{}: {}\n", level, texts.join(" | ")));
            }
        }
    }
    out.push('\n');

    if !report.statuses.is_empty() {
        section(&mut out, "URL STATUS");
        for status in &report.statuses {
            match &status.status {
                StatusOutcome::Code(code) => {
                    out.push_str(&format!("  {}  {}\n", code, status.url))
                }
                StatusOutcome::Unreachable(msg) => {
                    out.push_str(&format!("  Error  {}  ({})\n", status.url, msg))
                }
            }
        }
        out.push('\n');
    }

    if !report.timings.is_empty() {
        section(&mut out, "LOAD TIMES");
        for timing in &report.timings {
            match &timing.error {
                Some(error) => {
                    out.push_str(&format!("  {}  [error: {}]\n", timing.url, error))
                }
                None => out.push_str(&format!(
                    "  {}  total {} ms (dns {} ms, tcp {} ms, ttfb {} ms, dom {} ms)\n",
                    timing.url,
                    timing.total_ms.unwrap_or(0),
                    timing.dns_ms.unwrap_or(0),
                    timing.tcp_ms.unwrap_or(0),
                    timing.ttfb_ms.unwrap_or(0),
                    timing.dom_content_loaded_ms.unwrap_or(0),
                )),
            }
        }
        out.push('\n');
    }

    out.push_str(BANNER);
    out.push_str("                          End of Report\n");
    out.push_str(BANNER);
    out.push_str("\nGenerated by Pagelens\n");

    out
}

pub fn generate_json_report(report: &Report) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Pagelens",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json",
            },
            "analysis": report,
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> Report {
        let mut graph = SiteGraph::new();
        graph.insert(
            "http://example.test/".to_string(),
            PageEntry::Links(vec!["http://example.test/a".to_string()]),
        );
        graph.insert(
            "http://example.test/a".to_string(),
            PageEntry::FetchFailed("HTTP status 500".to_string()),
        );

        Report {
            seed: "http://example.test/".to_string(),
            generated_at: "2026-01-01T00:00:00+00:00".to_string(),
            site_graph: graph,
            images: vec![ImageRecord {
                url: "http://example.test/img/big.png".to_string(),
                size_kb: Some(2048),
                format: Some("png".to_string()),
                thumbnail: Some("abc.png".to_string()),
                error: None,
            }],
            tracking: vec![TrackingFinding::detected(
                "http://example.test/".to_string(),
                vec![],
            )],
            seo: vec![SeoRecord::with_error(
                "http://example.test/a".to_string(),
                "HTTP status 500".to_string(),
            )],
            statuses: vec![
                UrlStatus {
                    url: "http://example.test/".to_string(),
                    status: StatusOutcome::Code(200),
                },
                UrlStatus {
                    url: "http://offline.test/".to_string(),
                    status: StatusOutcome::Unreachable("connection refused".to_string()),
                },
            ],
            timings: vec![LoadTiming::with_error(
                "http://example.test/",
                "browser not found".to_string(),
            )],
        }
    }

    #[test]
    fn test_text_report_sections() {
        let text = generate_text_report(&sample_report());

        assert!(text.contains("SITE MAP"));
        assert!(text.contains("└── http://example.test/a"));
        assert!(text.contains("[fetch failed: HTTP status 500]"));
        assert!(text.contains("2048 KiB"));
        assert!(text.contains(NO_TRACKING_DETECTED));
        assert!(text.contains("  200  http://example.test/"));
        assert!(text.contains("  Error  http://offline.test/"));
        assert!(text.contains("browser not found"));
    }

    #[test]
    fn test_json_report_structure() {
        let json = generate_json_report(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["report"]["metadata"]["generator"], "Pagelens");
        assert_eq!(
            value["report"]["analysis"]["seed"],
            "http://example.test/"
        );
        assert_eq!(
            value["report"]["analysis"]["images"][0]["size_kb"],
            2048
        );
        // Tagged status outcome, not a sentinel string.
        assert_eq!(
            value["report"]["analysis"]["statuses"][1]["status"]["unreachable"],
            "connection refused"
        );
    }

    #[test]
    fn test_report_format_from_str() {
        assert!(matches!(
            ReportFormat::from_str("TEXT"),
            Some(ReportFormat::Text)
        ));
        assert!(matches!(
            ReportFormat::from_str("json"),
            Some(ReportFormat::Json)
        ));
        assert!(ReportFormat::from_str("yaml").is_none());
    }
}
