use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Request method understood by a [`Fetcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMethod {
    /// Full-body request.
    Get,
    /// Existence check, body is not downloaded.
    Head,
}

/// What came back from a fetch, whatever the status.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
    /// Where the response was served from once redirects were followed.
    pub final_url: Option<String>,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            final_url: None,
        }
    }

    pub fn with_final_url(mut self, url: impl Into<String>) -> Self {
        self.final_url = Some(url.into());
        self
    }

    /// 2xx-class status.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP capability the scanners are built on.
///
/// Implementations report transport failures as `Err`; a non-success status is
/// still an `Ok` response and left to the caller to interpret.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, method: FetchMethod) -> Result<FetchResponse>;
}

/// [`Fetcher`] backed by a pooled `reqwest` client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent("Sitescout/0.1 (https://github.com/trapdoorsec/sitescout)")
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, method: FetchMethod) -> Result<FetchResponse> {
        debug!("{:?} {}", method, url);

        let request = match method {
            FetchMethod::Get => self.client.get(url),
            FetchMethod::Head => self.client.head(url),
        };
        let response = request.send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        let body = match method {
            FetchMethod::Get => response.text().await?,
            FetchMethod::Head => String::new(),
        };

        Ok(FetchResponse::new(status, body).with_final_url(final_url))
    }
}
