pub mod document;
pub mod error;
pub mod fetch;
pub mod html;
pub mod login;
pub mod probe;
pub mod result;
pub mod robots;
pub mod sitemap;

pub use document::{Page, resolve_http};
pub use error::{Result, ScanError};
pub use fetch::{FetchMethod, FetchResponse, Fetcher, HttpFetcher};
pub use html::scan_resource_links;
pub use login::scan_login_links;
pub use probe::{ProbeOptions, UrlProber};
pub use result::{FeedDiscoveryResult, LoginCandidate, LoginDiscoveryResult, SitemapNode};
pub use robots::{RobotsTxt, RobotsTxtReader};
pub use sitemap::SitemapIndexParser;
