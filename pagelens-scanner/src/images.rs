use crate::error::{Result, ScanError};
use crate::fetcher::Fetcher;
use futures::future::join_all;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Images at or below this decoded byte size are dropped from the report.
pub const OVERSIZE_THRESHOLD_KIB: u64 = 1024;

/// Thumbnails fit inside this bounding box, preserving aspect ratio.
pub const THUMBNAIL_MAX_DIM: u32 = 150;

/// Where thumbnail bytes go once produced. Implementations must hand
/// out a unique opaque reference per call so concurrent image tasks
/// never collide on a write target.
pub trait ThumbnailStore: Send + Sync {
    fn store(&self, bytes: &[u8]) -> std::io::Result<String>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_kb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImageRecord {
    pub fn with_error(url: String, error: String) -> Self {
        Self {
            url,
            size_kb: None,
            format: None,
            thumbnail: None,
            error: Some(error),
        }
    }
}

/// Per-page image inventory. Fetches every `<img>` referenced by a
/// page, keeps only size offenders above the threshold, and produces a
/// bounded-fit thumbnail for each one kept.
pub struct ImageAnalyzer {
    fetcher: Fetcher,
    store: Arc<dyn ThumbnailStore>,
}

impl ImageAnalyzer {
    pub fn new(fetcher: Fetcher, store: Arc<dyn ThumbnailStore>) -> Self {
        Self { fetcher, store }
    }

    /// Analyze every image referenced by `page_url`. Err only when the
    /// page itself cannot be fetched; individual image failures become
    /// error records without cancelling sibling images.
    pub async fn analyze(&self, page_url: &str) -> Result<Vec<ImageRecord>> {
        let page = self.fetcher.get(page_url).await?;
        let image_urls = extract_image_urls(&page.body, page_url);
        debug!(
            "Found {} image references on {}",
            image_urls.len(),
            page_url
        );

        let tasks = image_urls.into_iter().map(|url| self.process_image(url));
        let records = join_all(tasks).await;

        Ok(records.into_iter().flatten().collect())
    }

    /// Returns None for images at or below the size threshold.
    async fn process_image(&self, url: String) -> Option<ImageRecord> {
        let bytes = match self.fetcher.get_bytes(&url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Image fetch failed for {}: {}", url, e);
                return Some(ImageRecord::with_error(url, e.to_string()));
            }
        };

        // Size from the actual byte length, never from a Content-Length
        // header the server may omit or misreport.
        let size_kb = bytes.len() as u64 / 1024;
        if size_kb <= OVERSIZE_THRESHOLD_KIB {
            return None;
        }

        match self.make_thumbnail(&bytes) {
            Ok(reference) => Some(ImageRecord {
                format: Some(extension_of(&url)),
                url,
                size_kb: Some(size_kb),
                thumbnail: Some(reference),
                error: None,
            }),
            Err(e) => {
                warn!("Thumbnailing failed for {}: {}", url, e);
                Some(ImageRecord::with_error(url, e.to_string()))
            }
        }
    }

    fn make_thumbnail(&self, bytes: &[u8]) -> Result<String> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| ScanError::ImageDecode(e.to_string()))?;
        let thumb = img.thumbnail(THUMBNAIL_MAX_DIM, THUMBNAIL_MAX_DIM);

        let mut out = Cursor::new(Vec::new());
        thumb
            .write_to(&mut out, image::ImageFormat::Png)
            .map_err(|e| ScanError::ImageDecode(e.to_string()))?;

        self.store
            .store(out.get_ref())
            .map_err(|e| ScanError::Store(e.to_string()))
    }
}

fn extract_image_urls(html: &str, page_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let img_selector = Selector::parse("img[src]").unwrap();

    let mut urls = Vec::new();
    for element in document.select(&img_selector) {
        if let Some(src) = element.value().attr("src") {
            if src.is_empty() {
                continue;
            }
            if let Ok(base) = Url::parse(page_url) {
                if let Ok(absolute) = base.join(src) {
                    urls.push(absolute.to_string());
                }
            }
        }
    }

    urls
}

/// Format label from the URL path's file extension. Extension-less or
/// mismatched-extension images get an incorrect or empty label; the
/// bytes are never sniffed.
fn extension_of(url: &str) -> String {
    let path = Url::parse(url).map(|u| u.path().to_string()).unwrap_or_default();
    let file_name = path.rsplit('/').next().unwrap_or("");
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => String::new(),
    }
}
