use crate::DiscoveryProgressCallback;
use crate::catalog::DiscoveryCatalog;
use sitescout_scanner::error::Result;
use sitescout_scanner::{
    Fetcher, LoginCandidate, LoginDiscoveryResult, Page, ProbeOptions, UrlProber,
    scan_login_links,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

pub const COMMON_PATH_SOURCE: &str = "Common path";

/// Finds login page candidates from page signals and conventional paths.
pub struct LoginPageDiscoverer {
    prober: UrlProber,
    catalog: DiscoveryCatalog,
    progress_callback: Option<DiscoveryProgressCallback>,
}

impl LoginPageDiscoverer {
    pub fn new(fetcher: Arc<dyn Fetcher>, catalog: DiscoveryCatalog) -> Self {
        Self::with_options(fetcher, catalog, ProbeOptions::default())
    }

    pub fn with_options(
        fetcher: Arc<dyn Fetcher>,
        catalog: DiscoveryCatalog,
        options: ProbeOptions,
    ) -> Self {
        Self {
            prober: UrlProber::with_options(fetcher, options),
            catalog,
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: DiscoveryProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Page-derived candidates first, then probed paths tagged "Common path".
    ///
    /// Each URL appears once; the first provenance seen for it is kept, so a
    /// link or form on the page wins over a path probe hitting the same URL.
    pub async fn discover(&self, page: &Page) -> Result<LoginDiscoveryResult> {
        let origin = page.origin()?;
        info!("Discovering login pages for {}", origin);

        let mut candidates = scan_login_links(page, &self.catalog.login_keywords);

        if let Some(ref callback) = self.progress_callback {
            callback(format!(
                "Probing {} login paths",
                self.catalog.login_paths.len()
            ));
        }
        let probed = self
            .prober
            .probe_paths(&origin, &self.catalog.login_paths)
            .await;

        for url in probed {
            if !candidates.iter().any(|c| c.url == url) {
                candidates.push(LoginCandidate::new(url, COMMON_PATH_SOURCE));
            }
        }

        let login_pages = dedup_by_url(candidates);
        info!("Found {} login pages for {}", login_pages.len(), origin);

        Ok(LoginDiscoveryResult { login_pages })
    }
}

/// Keeps the first candidate for every URL, in order.
pub fn dedup_by_url(candidates: Vec<LoginCandidate>) -> Vec<LoginCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.url.clone()))
        .collect()
}
