use crate::fetch::{FetchMethod, Fetcher};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct ProbeOptions {
    /// Probes in flight at once against the host.
    pub batch_size: usize,
    /// Upper bound for a single existence check.
    pub timeout: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

/// Existence checks against candidate URLs.
///
/// Failures of any kind (transport error, timeout, non-2xx) read as "absent";
/// one missing candidate never aborts a batch.
#[derive(Clone)]
pub struct UrlProber {
    fetcher: Arc<dyn Fetcher>,
    options: ProbeOptions,
}

impl UrlProber {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self::with_options(fetcher, ProbeOptions::default())
    }

    pub fn with_options(fetcher: Arc<dyn Fetcher>, options: ProbeOptions) -> Self {
        Self {
            fetcher,
            options: ProbeOptions {
                batch_size: options.batch_size.max(1),
                timeout: options.timeout,
            },
        }
    }

    pub fn options(&self) -> ProbeOptions {
        self.options
    }

    /// Returns `url` back if a HEAD request to it succeeds.
    pub async fn probe(&self, url: &str) -> Option<String> {
        let request = self.fetcher.fetch(url, FetchMethod::Head);

        match tokio::time::timeout(self.options.timeout, request).await {
            Ok(Ok(response)) if response.ok() => {
                debug!("Probe hit: {} ({})", url, response.status);
                Some(url.to_string())
            }
            Ok(Ok(response)) => {
                debug!("Probe miss: {} ({})", url, response.status);
                None
            }
            Ok(Err(e)) => {
                debug!("Probe failed for {}: {}", url, e);
                None
            }
            Err(_) => {
                debug!("Probe timed out for {}", url);
                None
            }
        }
    }

    /// Probes every path joined onto `origin`, `batch_size` at a time.
    ///
    /// A batch is only issued once every probe of the previous batch has
    /// settled. Survivors are returned in catalog order, in the same
    /// normalized form as URLs resolved from page markup. Paths that would
    /// leave the origin are skipped.
    pub async fn probe_paths(&self, origin: &str, paths: &[String]) -> Vec<String> {
        let base = match Url::parse(origin) {
            Ok(base) => base,
            Err(e) => {
                debug!("Cannot probe under {}: {}", origin, e);
                return Vec::new();
            }
        };

        let mut found = Vec::new();

        for batch in paths.chunks(self.options.batch_size) {
            let urls: Vec<String> = batch
                .iter()
                .filter_map(|path| match base.join(path) {
                    Ok(url) if url.origin() == base.origin() => Some(url.to_string()),
                    _ => {
                        debug!("Skipping probe path {:?} under {}", path, origin);
                        None
                    }
                })
                .collect();
            let probes = urls.iter().map(|url| self.probe(url));

            found.extend(join_all(probes).await.into_iter().flatten());
        }

        found
    }
}
