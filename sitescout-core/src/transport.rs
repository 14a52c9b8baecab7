// Request/response channel between the page side and the UI side

use crate::feeds::FeedSitemapDiscoverer;
use crate::login::LoginPageDiscoverer;
use serde::{Deserialize, Serialize};
use sitescout_scanner::{FeedDiscoveryResult, LoginDiscoveryResult, Page};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DiscoveryRequest {
    DiscoverFeeds,
    DiscoverLogin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiscoveryData {
    Feeds(FeedDiscoveryResult),
    Login(LoginDiscoveryResult),
}

/// `{success: true, data}` or `{success: false, error}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DiscoveryData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DiscoveryResponse {
    pub fn ok(data: DiscoveryData) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn into_result(self) -> Result<DiscoveryData, String> {
        match (self.success, self.data, self.error) {
            (true, Some(data), _) => Ok(data),
            (_, _, Some(error)) => Err(error),
            _ => Err("Malformed discovery response".to_string()),
        }
    }
}

/// A request waiting for its deferred reply.
pub type DiscoveryEnvelope = (DiscoveryRequest, oneshot::Sender<DiscoveryResponse>);

/// Page-side endpoint answering discovery requests for one loaded page.
pub struct DiscoveryService {
    page: Page,
    feeds: FeedSitemapDiscoverer,
    login: LoginPageDiscoverer,
}

impl DiscoveryService {
    pub fn new(page: Page, feeds: FeedSitemapDiscoverer, login: LoginPageDiscoverer) -> Self {
        Self { page, feeds, login }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Runs the requested discovery; failures become `{success: false}`.
    pub async fn handle(&self, request: DiscoveryRequest) -> DiscoveryResponse {
        debug!("Handling {:?} for {}", request, self.page.location());

        let outcome = match request {
            DiscoveryRequest::DiscoverFeeds => self
                .feeds
                .discover(&self.page)
                .await
                .map(DiscoveryData::Feeds),
            DiscoveryRequest::DiscoverLogin => self
                .login
                .discover(&self.page)
                .await
                .map(DiscoveryData::Login),
        };

        match outcome {
            Ok(data) => DiscoveryResponse::ok(data),
            Err(e) => {
                warn!("{:?} failed: {}", request, e);
                DiscoveryResponse::failure(e.to_string())
            }
        }
    }

    /// Answers requests until every [`DiscoveryClient`] is dropped.
    pub async fn serve(&self, mut requests: mpsc::Receiver<DiscoveryEnvelope>) {
        while let Some((request, reply)) = requests.recv().await {
            let response = self.handle(request).await;
            if reply.send(response).is_err() {
                debug!("Requester for {:?} went away before the reply", request);
            }
        }
        debug!("Discovery service stopped");
    }
}

/// UI-side handle sending requests to a [`DiscoveryService`].
#[derive(Debug, Clone)]
pub struct DiscoveryClient {
    sender: mpsc::Sender<DiscoveryEnvelope>,
}

impl DiscoveryClient {
    pub async fn request(&self, request: DiscoveryRequest) -> DiscoveryResponse {
        let (reply_tx, reply_rx) = oneshot::channel();

        if self.sender.send((request, reply_tx)).await.is_err() {
            return DiscoveryResponse::failure("Discovery service is not running");
        }

        reply_rx
            .await
            .unwrap_or_else(|_| DiscoveryResponse::failure("Discovery service dropped the request"))
    }

    pub async fn discover_feeds(&self) -> DiscoveryResponse {
        self.request(DiscoveryRequest::DiscoverFeeds).await
    }

    pub async fn discover_login(&self) -> DiscoveryResponse {
        self.request(DiscoveryRequest::DiscoverLogin).await
    }
}

pub fn discovery_channel(buffer: usize) -> (DiscoveryClient, mpsc::Receiver<DiscoveryEnvelope>) {
    let (sender, receiver) = mpsc::channel(buffer.max(1));
    (DiscoveryClient { sender }, receiver)
}
