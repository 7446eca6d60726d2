pub mod crawler;
pub mod error;
pub mod fetcher;
pub mod graph;
pub mod images;
pub mod seo;
pub mod status;
pub mod timing;
pub mod tracking;

pub use crawler::Crawler;
pub use error::ScanError;
pub use fetcher::Fetcher;
pub use graph::{PageEntry, SiteGraph};
pub use images::{ImageAnalyzer, ImageRecord, ThumbnailStore};
pub use seo::{SeoExtractor, SeoRecord};
pub use status::{StatusChecker, StatusOutcome, UrlStatus};
pub use timing::{LoadTimeProfiler, LoadTiming};
pub use tracking::TrackingDetector;
