use crate::error::{Result, ScanError};
use crate::fetch::{FetchMethod, Fetcher};
use scraper::Html;
use url::Url;

/// A loaded page: its markup and the location it was loaded from.
///
/// The markup is parsed on demand by [`Page::document`] so a `Page` can be
/// shared across tasks; the parsed tree itself is not `Send`.
#[derive(Debug, Clone)]
pub struct Page {
    location: Url,
    markup: String,
}

impl Page {
    pub fn new(location: Url, markup: impl Into<String>) -> Self {
        Self {
            location,
            markup: markup.into(),
        }
    }

    pub fn parse(location: &str, markup: impl Into<String>) -> Result<Self> {
        let location = Url::parse(location)
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", location, e)))?;
        Ok(Self::new(location, markup))
    }

    /// Downloads the page at `location` with a GET request.
    ///
    /// The page takes the location it was finally served from, so a redirect
    /// to another host moves the origin along with it.
    pub async fn load(fetcher: &dyn Fetcher, location: &Url) -> Result<Self> {
        let response = fetcher.fetch(location.as_str(), FetchMethod::Get).await?;
        if !response.ok() {
            return Err(ScanError::Other(format!(
                "{} returned status {}",
                location, response.status
            )));
        }

        let served_from = response
            .final_url
            .as_deref()
            .and_then(|url| Url::parse(url).ok())
            .unwrap_or_else(|| location.clone());
        Ok(Self::new(served_from, response.body))
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Serialized origin, e.g. `https://example.com:8443`.
    ///
    /// Fails for opaque origins (`data:`, `file:` and similar), which have
    /// no server to probe.
    pub fn origin(&self) -> Result<String> {
        let origin = self.location.origin();
        if !origin.is_tuple() {
            return Err(ScanError::InvalidUrl(format!(
                "{} has no network origin",
                self.location
            )));
        }
        Ok(origin.ascii_serialization())
    }

    pub fn document(&self) -> Html {
        Html::parse_document(&self.markup)
    }

    /// Resolves an attribute value against the page location.
    ///
    /// Returns `None` for empty or unparsable references and for anything
    /// that does not land on http(s).
    pub fn resolve(&self, href: &str) -> Option<String> {
        resolve_http(&self.location, href)
    }
}

/// Joins `reference` onto `base`, keeping the result only when it is http(s).
pub fn resolve_http(base: &Url, reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    let resolved = base.join(reference).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}
