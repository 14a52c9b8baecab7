pub mod catalog;
pub mod export;
pub mod feeds;
pub mod login;
pub mod report;
pub mod transport;

use std::sync::Arc;

pub use catalog::DiscoveryCatalog;
pub use feeds::FeedSitemapDiscoverer;
pub use login::LoginPageDiscoverer;
pub use transport::{
    DiscoveryClient, DiscoveryData, DiscoveryRequest, DiscoveryResponse, DiscoveryService,
    discovery_channel,
};

/// Callback for reporting discovery progress
pub type DiscoveryProgressCallback = Arc<dyn Fn(String) + Send + Sync>;
