use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// What the crawler recorded for one visited page: either the ordered,
/// deduplicated list of in-scope outbound links, or the message of the
/// fetch failure that stopped expansion there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageEntry {
    Links(Vec<String>),
    FetchFailed(String),
}

/// The site graph built by one crawl invocation. Addresses are compared
/// by exact string match; textually different but equivalent URLs are
/// distinct pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteGraph {
    pages: HashMap<String, PageEntry>,
    visit_order: Vec<String>,
}

impl SiteGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: String, entry: PageEntry) {
        if self.pages.insert(url.clone(), entry).is_none() {
            self.visit_order.push(url);
        }
    }

    pub fn get(&self, url: &str) -> Option<&PageEntry> {
        self.pages.get(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.pages.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Visited pages with their entries, in traversal order.
    pub fn pages(&self) -> impl Iterator<Item = (&String, &PageEntry)> {
        self.visit_order
            .iter()
            .filter_map(|url| self.pages.get(url).map(|entry| (url, entry)))
    }

    /// Every address the crawl touched: graph keys plus every edge
    /// target, deduplicated, with the seed always first even when the
    /// graph is empty.
    pub fn discovered_urls(&self, seed: &str) -> Vec<String> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut urls = Vec::new();

        seen.insert(seed.to_string());
        urls.push(seed.to_string());

        for (url, entry) in self.pages() {
            if seen.insert(url.clone()) {
                urls.push(url.clone());
            }
            if let PageEntry::Links(links) = entry {
                for link in links {
                    if seen.insert(link.clone()) {
                        urls.push(link.clone());
                    }
                }
            }
        }

        urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovered_urls_includes_seed_for_empty_graph() {
        let graph = SiteGraph::new();
        assert_eq!(
            graph.discovered_urls("http://example.test/"),
            vec!["http://example.test/".to_string()]
        );
    }

    #[test]
    fn test_discovered_urls_union_of_keys_and_edges() {
        let mut graph = SiteGraph::new();
        graph.insert(
            "http://example.test/".to_string(),
            PageEntry::Links(vec![
                "http://example.test/a".to_string(),
                "http://example.test/b".to_string(),
            ]),
        );
        graph.insert(
            "http://example.test/a".to_string(),
            PageEntry::FetchFailed("HTTP status 500".to_string()),
        );

        let urls = graph.discovered_urls("http://example.test/");
        assert_eq!(
            urls,
            vec![
                "http://example.test/".to_string(),
                "http://example.test/a".to_string(),
                "http://example.test/b".to_string(),
            ]
        );
    }

    #[test]
    fn test_insert_is_idempotent_on_order() {
        let mut graph = SiteGraph::new();
        graph.insert("a".to_string(), PageEntry::Links(vec![]));
        graph.insert("a".to_string(), PageEntry::Links(vec!["b".to_string()]));

        assert_eq!(graph.len(), 1);
        assert_eq!(graph.pages().count(), 1);
    }
}
