use crate::error::{Result, ScanError};
use crate::fetcher::Fetcher;
use crate::graph::{PageEntry, SiteGraph};
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_MAX_DEPTH: usize = 2;

/// Depth-bounded traversal engine. Owns its worklist and visited set
/// for the duration of one `crawl` call; pages are visited one at a
/// time, depth-first, which bounds outstanding connections to one.
pub struct Crawler {
    fetcher: Fetcher,
    max_depth: usize,
}

impl Crawler {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Crawl from `seed`, returning the site graph. Only an unparseable
    /// seed is a hard error; fetch failures during traversal are
    /// recorded in the graph and never abort the crawl.
    pub async fn crawl(&self, seed: &str) -> Result<SiteGraph> {
        Url::parse(seed).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", seed, e)))?;

        info!("Starting crawl of {} (max depth {})", seed, self.max_depth);

        let mut graph = SiteGraph::new();
        let mut visited: HashSet<String> = HashSet::new();
        // Explicit worklist instead of recursion: a stack of
        // (address, depth). Children are pushed in reverse so the
        // traversal stays depth-first in document order.
        let mut worklist: Vec<(String, usize)> = vec![(seed.to_string(), 0)];

        while let Some((url, depth)) = worklist.pop() {
            if depth > self.max_depth {
                // Depth-limited nodes get no graph entry.
                continue;
            }
            if !visited.insert(url.clone()) {
                continue;
            }

            debug!("Visiting {} at depth {}", url, depth);

            match self.fetcher.get(&url).await {
                Ok(page) => {
                    let links = extract_links(&page.body, &url, seed);
                    for link in links.iter().rev() {
                        worklist.push((link.clone(), depth + 1));
                    }
                    graph.insert(url, PageEntry::Links(links));
                }
                Err(e) => {
                    warn!("Fetch failed for {}: {}", url, e);
                    graph.insert(url, PageEntry::FetchFailed(e.to_string()));
                }
            }
        }

        info!("Crawl complete. Visited {} pages", graph.len());
        Ok(graph)
    }
}

/// Extract the in-scope outbound links of a page: every `a[href]`
/// resolved against the page's own URL, kept when the resolved text
/// starts with the seed's text, deduplicated preserving document order.
fn extract_links(html: &str, page_url: &str, seed: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let link_selector = Selector::parse("a[href]").unwrap();

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&link_selector) {
        if let Some(href) = element.value().attr("href") {
            if let Some(absolute) = resolve_href(page_url, href) {
                if absolute.starts_with(seed) && seen.insert(absolute.clone()) {
                    links.push(absolute);
                }
            }
        }
    }

    links
}

/// Resolve a raw href against the document's URL. Non-navigable
/// schemes and bare fragments yield nothing.
fn resolve_href(base: &str, href: &str) -> Option<String> {
    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with('#')
    {
        return None;
    }

    let base_url = Url::parse(base).ok()?;
    Some(base_url.join(href).ok()?.to_string())
}
