use serde::{Deserialize, Serialize};

/// A discovered top-level sitemap and, when it is an index, the sitemaps it lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapNode {
    pub url: String,
    pub children: Vec<String>,
    pub is_index: bool,
}

impl SitemapNode {
    pub fn new(url: String, children: Vec<String>) -> Self {
        let is_index = !children.is_empty();
        Self {
            url,
            children,
            is_index,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedDiscoveryResult {
    pub sitemaps: Vec<SitemapNode>,
    pub rss_feeds: Vec<String>,
    pub robots_txt: Option<String>,
}

/// A possible login page and the page signal that pointed at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCandidate {
    pub url: String,
    pub source: String,
}

impl LoginCandidate {
    pub fn new(url: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source: source.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginDiscoveryResult {
    pub login_pages: Vec<LoginCandidate>,
}
