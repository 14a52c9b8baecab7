use crate::DiscoveryProgressCallback;
use crate::catalog::DiscoveryCatalog;
use sitescout_scanner::error::Result;
use sitescout_scanner::{
    FeedDiscoveryResult, Fetcher, Page, ProbeOptions, RobotsTxtReader, SitemapIndexParser,
    SitemapNode, UrlProber, scan_resource_links,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Finds the sitemaps and syndication feeds of the site a page belongs to.
///
/// Sources, in order: `<link>` declarations in the page, `Sitemap:` lines in
/// robots.txt, then existence probes over the catalog's sitemap and feed
/// paths. Every sitemap found is fetched once to list its children when it
/// turns out to be an index; children are not expanded further.
pub struct FeedSitemapDiscoverer {
    prober: UrlProber,
    robots: RobotsTxtReader,
    sitemap_parser: SitemapIndexParser,
    catalog: DiscoveryCatalog,
    progress_callback: Option<DiscoveryProgressCallback>,
}

impl FeedSitemapDiscoverer {
    pub fn new(fetcher: Arc<dyn Fetcher>, catalog: DiscoveryCatalog) -> Self {
        Self::with_options(fetcher, catalog, ProbeOptions::default())
    }

    pub fn with_options(
        fetcher: Arc<dyn Fetcher>,
        catalog: DiscoveryCatalog,
        options: ProbeOptions,
    ) -> Self {
        Self {
            prober: UrlProber::with_options(fetcher.clone(), options),
            robots: RobotsTxtReader::new(fetcher.clone()),
            sitemap_parser: SitemapIndexParser::new(fetcher),
            catalog,
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: DiscoveryProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn report(&self, message: String) {
        if let Some(ref callback) = self.progress_callback {
            callback(message);
        }
    }

    pub async fn discover(&self, page: &Page) -> Result<FeedDiscoveryResult> {
        let origin = page.origin()?;
        info!("Discovering sitemaps and feeds for {}", origin);

        let mut rss_feeds = scan_resource_links(page);
        let mut sitemaps = Vec::new();
        let mut robots_txt = None;

        self.report(format!("Reading {}/robots.txt", origin));
        match self.robots.read(&origin).await {
            Ok(robots) => {
                robots_txt = Some(robots.robots_url);
                sitemaps.extend(robots.sitemaps);
            }
            Err(e) => debug!("Could not fetch robots.txt: {}", e),
        }

        self.report(format!(
            "Probing {} sitemap paths",
            self.catalog.sitemap_paths.len()
        ));
        sitemaps.extend(
            self.prober
                .probe_paths(&origin, &self.catalog.sitemap_paths)
                .await,
        );

        self.report(format!(
            "Probing {} feed paths",
            self.catalog.feed_paths.len()
        ));
        rss_feeds.extend(
            self.prober
                .probe_paths(&origin, &self.catalog.feed_paths)
                .await,
        );

        let sitemaps = dedup_preserving_order(sitemaps);
        let rss_feeds = dedup_preserving_order(rss_feeds);

        let mut nodes = Vec::with_capacity(sitemaps.len());
        for sitemap_url in sitemaps {
            self.report(format!("Expanding {}", sitemap_url));
            let children = self.sitemap_parser.parse(&sitemap_url).await;
            nodes.push(SitemapNode::new(sitemap_url, children));
        }

        info!(
            "Found {} sitemaps and {} feeds for {}",
            nodes.len(),
            rss_feeds.len(),
            origin
        );

        Ok(FeedDiscoveryResult {
            sitemaps: nodes,
            rss_feeds,
            robots_txt,
        })
    }
}

/// Drops repeated strings, keeping the first occurrence of each.
pub fn dedup_preserving_order(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}
