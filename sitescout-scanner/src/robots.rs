use crate::document::resolve_http;
use crate::error::{Result, ScanError};
use crate::fetch::{FetchMethod, Fetcher};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::debug;
use url::Url;

static SITEMAP_DIRECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Sitemap:\s*(.+)$").unwrap());

/// Sitemap declarations found in a site's robots.txt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotsTxt {
    pub robots_url: String,
    /// Absolute, in file order, duplicates kept.
    pub sitemaps: Vec<String>,
}

pub struct RobotsTxtReader {
    fetcher: Arc<dyn Fetcher>,
}

impl RobotsTxtReader {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetches `origin/robots.txt` and collects its `Sitemap:` lines.
    ///
    /// Declared values are resolved against the origin; those that do not
    /// land on http(s) are dropped. A non-success status is reported as
    /// [`ScanError::NotFound`].
    pub async fn read(&self, origin: &str) -> Result<RobotsTxt> {
        let base = Url::parse(origin)
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", origin, e)))?;
        let robots_url = format!("{}/robots.txt", origin);
        let response = self.fetcher.fetch(&robots_url, FetchMethod::Get).await?;

        if !response.ok() {
            debug!("robots.txt returned {} at {}", response.status, robots_url);
            return Err(ScanError::NotFound(robots_url));
        }

        let sitemaps: Vec<String> = parse_sitemap_directives(&response.body)
            .into_iter()
            .filter_map(|declared| {
                let resolved = resolve_http(&base, &declared);
                if resolved.is_none() {
                    debug!("Ignoring sitemap declaration {:?} in {}", declared, robots_url);
                }
                resolved
            })
            .collect();
        debug!("{} sitemap(s) declared in {}", sitemaps.len(), robots_url);

        Ok(RobotsTxt {
            robots_url,
            sitemaps,
        })
    }
}

/// Extracts the value of every `Sitemap:` directive, case-insensitively.
pub fn parse_sitemap_directives(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| SITEMAP_DIRECTIVE_RE.captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|url| !url.is_empty())
        .collect()
}
