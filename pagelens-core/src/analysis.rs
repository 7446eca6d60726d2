use crate::report::{Report, TrackingFinding};
use pagelens_scanner::crawler::DEFAULT_MAX_DEPTH;
use pagelens_scanner::error::{Result, ScanError};
use pagelens_scanner::{
    Crawler, Fetcher, ImageAnalyzer, ImageRecord, LoadTimeProfiler, SeoExtractor, StatusChecker,
    ThumbnailStore, TrackingDetector,
};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub max_depth: usize,
    /// Minimal configuration runs the page analyzers against the seed
    /// only; extended runs them over every discovered page and adds
    /// the status and load-time passes over the full set.
    pub extended: bool,
    /// Load timings need a local browser install; this lets the rest
    /// of the extended pass run without one.
    pub profile_load_times: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            extended: false,
            profile_load_times: true,
        }
    }
}

/// Run the whole pipeline for one seed: crawl, fan the discovered page
/// set out to the analyzers, and join everything into one report.
/// Err only for a missing or unparseable seed; any single sub-analysis
/// failure degrades to a partial report section.
pub async fn run_analysis(
    seed: &str,
    options: &AnalysisOptions,
    store: Arc<dyn ThumbnailStore>,
) -> Result<Report> {
    let seed = seed.trim();
    if seed.is_empty() {
        return Err(ScanError::Validation("a seed URL is required".to_string()));
    }

    let fetcher = Fetcher::new();
    let crawler = Crawler::new(fetcher.clone()).with_max_depth(options.max_depth);
    let site_graph = crawler.crawl(seed).await?;
    let urls = site_graph.discovered_urls(seed);
    info!(
        "Crawl of {} found {} pages, {} addresses total",
        seed,
        site_graph.len(),
        urls.len()
    );

    let image_analyzer = ImageAnalyzer::new(fetcher.clone(), store);
    let tracking_detector = TrackingDetector::new(fetcher.clone());
    let seo_extractor = SeoExtractor::new(fetcher.clone());

    let seed_only = [seed.to_string()];
    let page_targets: &[String] = if options.extended { &urls } else { &seed_only };

    let mut images = Vec::new();
    let mut tracking = Vec::new();
    let mut seo = Vec::new();

    for url in page_targets {
        // The three page analyzers are independent; run them together
        // and join before moving on.
        let (image_result, tracking_result, seo_record) = tokio::join!(
            image_analyzer.analyze(url),
            tracking_detector.detect(url),
            seo_extractor.extract(url),
        );

        match image_result {
            Ok(mut records) => images.append(&mut records),
            Err(e) => {
                warn!("Image analysis failed for {}: {}", url, e);
                images.push(ImageRecord::with_error(url.clone(), e.to_string()));
            }
        }

        tracking.push(match tracking_result {
            Ok(tools) => TrackingFinding::detected(url.clone(), tools),
            Err(e) => TrackingFinding::failed(url.clone(), e.to_string()),
        });

        seo.push(seo_record);
    }

    let mut statuses = Vec::new();
    let mut timings = Vec::new();
    if options.extended {
        let checker = StatusChecker::new(fetcher.clone());
        statuses = checker.check_all(&urls).await;

        if options.profile_load_times {
            let profiler = LoadTimeProfiler::new();
            for url in &urls {
                timings.push(profiler.measure(url).await);
            }
        }
    }

    Ok(Report {
        seed: seed.to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        site_graph,
        images,
        tracking,
        seo,
        statuses,
        timings,
    })
}
